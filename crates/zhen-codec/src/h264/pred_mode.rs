//! 帧内预测模式推导 (ITU-T H.264 条款 8.3.1.1 / 8.3.2.1).
//!
//! Intra_4x4 / Intra_8x8 的块预测模式由左/上邻居块的模式取最小值预测,
//! 邻居不可用或非帧内 MxM 编码时用 DC 代替. 码流侧用 prev 标志与 rem
//! 模式对预测值做修正. 邻居模式从按地址索引的宏块描述符缓存读出.

use super::error::MbResult;
use super::geometry::{
    NeighborCtx, derive_neighboring_4x4_luma_blocks, derive_neighboring_8x8_luma_blocks,
};
use super::macroblock::{ByAddressCache, MbFlags, MbRecord, MbType};

/// DC 模式编号
const MODE_DC: u8 = 2;

fn record_of<'a>(
    ctx: &NeighborCtx,
    cache: &'a ByAddressCache<MbRecord>,
    curr: &'a MbRecord,
    addr: i32,
) -> Option<&'a MbRecord> {
    if addr == ctx.curr_mb_addr {
        Some(curr)
    } else {
        cache.get(addr)
    }
}

/// 邻居块在其宏块内解出的 MxM 预测模式; 不可推导时为 DC
fn neighbor_mxm_mode(
    rec: Option<&MbRecord>,
    dc_predicted: bool,
    pick_4x4_idx: impl Fn(&MbRecord) -> usize,
    pick_8x8_idx: impl Fn(&MbRecord) -> usize,
) -> u8 {
    let Some(rec) = rec else {
        return MODE_DC;
    };
    if dc_predicted {
        return MODE_DC;
    }
    match rec.mb_type {
        MbType::I4x4 => rec.intra4x4_pred_modes[pick_4x4_idx(rec)],
        MbType::I8x8 => rec.intra8x8_pred_modes[pick_8x8_idx(rec)],
        _ => MODE_DC,
    }
}

/// 邻居宏块因受限帧内预测被排除
fn excluded(rec: Option<&MbRecord>, constrained: bool) -> bool {
    match rec {
        Some(rec) => constrained && !rec.mb_type.is_intra(),
        // 描述符缺失视为条带外
        None => true,
    }
}

/// 推导 Intra_4x4 块预测模式 (8.3.1.1)
///
/// `curr` 为解码中的当前宏块描述符, 同宏块内先解的块模式从其中读取.
pub fn predict_intra4x4_mode(
    ctx: &NeighborCtx,
    cache: &ByAddressCache<MbRecord>,
    curr: &MbRecord,
    constrained_intra_pred: bool,
    blk_idx: i32,
    prev_flag: bool,
    rem_mode: u8,
) -> MbResult<u8> {
    let (a, b) = derive_neighboring_4x4_luma_blocks(ctx, blk_idx)?;
    let rec_a = record_of(ctx, cache, curr, a.mb.addr).filter(|_| a.mb.available);
    let rec_b = record_of(ctx, cache, curr, b.mb.addr).filter(|_| b.mb.available);

    let dc_predicted = !a.mb.available
        || !b.mb.available
        || excluded(rec_a, constrained_intra_pred)
        || excluded(rec_b, constrained_intra_pred);

    let blk_a = a.blk_idx as usize;
    let blk_b = b.blk_idx as usize;
    let mode_a = neighbor_mxm_mode(rec_a, dc_predicted, |_| blk_a, |_| blk_a >> 2);
    let mode_b = neighbor_mxm_mode(rec_b, dc_predicted, |_| blk_b, |_| blk_b >> 2);

    Ok(resolve(mode_a.min(mode_b), prev_flag, rem_mode))
}

/// 推导 Intra_8x8 块预测模式 (8.3.2.1)
pub fn predict_intra8x8_mode(
    ctx: &NeighborCtx,
    cache: &ByAddressCache<MbRecord>,
    curr: &MbRecord,
    constrained_intra_pred: bool,
    blk_idx: i32,
    prev_flag: bool,
    rem_mode: u8,
) -> MbResult<u8> {
    let (a, b) = derive_neighboring_8x8_luma_blocks(ctx, blk_idx)?;
    let rec_a = record_of(ctx, cache, curr, a.mb.addr).filter(|_| a.mb.available);
    let rec_b = record_of(ctx, cache, curr, b.mb.addr).filter(|_| b.mb.available);

    let dc_predicted = !a.mb.available
        || !b.mb.available
        || excluded(rec_a, constrained_intra_pred)
        || excluded(rec_b, constrained_intra_pred);

    let blk_a = a.blk_idx as usize;
    let blk_b = b.blk_idx as usize;
    // 邻居为 Intra_4x4 时取其 8x8 区域内代表 4x4 块: 左邻居取右列
    // (MBAFF 帧宏块对场邻居的下半区取块 3), 上邻居取下行
    let n_a = move |rec: &MbRecord| -> usize {
        let n = if ctx.mbaff
            && ctx.curr_mb_frame_flag
            && rec.flags.contains(MbFlags::FIELD)
            && blk_idx == 2
        {
            3
        } else {
            1
        };
        blk_a * 4 + n
    };
    let n_b = move |_rec: &MbRecord| blk_b * 4 + 2;
    let mode_a = neighbor_mxm_mode(rec_a, dc_predicted, n_a, |_| blk_a);
    let mode_b = neighbor_mxm_mode(rec_b, dc_predicted, n_b, |_| blk_b);

    Ok(resolve(mode_a.min(mode_b), prev_flag, rem_mode))
}

/// prev/rem 修正: rem 小于预测值时直接采用, 否则加一跳过预测值
fn resolve(predicted: u8, prev_flag: bool, rem_mode: u8) -> u8 {
    if prev_flag {
        predicted
    } else if rem_mode < predicted {
        rem_mode
    } else {
        rem_mode + 1
    }
}
