//! 几何推导与邻居定位 (ITU-T H.264 条款 6.4).
//!
//! 包含反光栅扫描, 宏块/分区/块扫描及其精确逆映射, 以及宏块邻居寻址与
//! 邻居位置推导 (含 MBAFF 场对寻址). 所有推导均为纯函数, 以值结构返回.

use super::error::{BlockKind, MbError, MbResult};
use super::macroblock::{MbType, SubMbType};

// ============================================================
// 反光栅扫描 (6.4.1)
// ============================================================

/// 反光栅扫描 InverseRasterScan(a, b, c, d, e)
///
/// `b`/`c` 为单元宽/高, `d` 为行宽, `e` 选择返回 x (0) 或 y (1) 分量.
pub fn inverse_raster_scan(a: i32, b: i32, c: i32, d: i32, e: i32) -> i32 {
    if e == 0 { a % (d / b) * b } else { a / (d / b) * c }
}

/// 宏块地址 → 亮度平面左上角样本坐标 (6.4.1)
///
/// MBAFF 帧中地址以场对为单位: 帧宏块对内垂直偏移 16 行, 场宏块对内偏移 1 行.
pub fn inverse_macroblock_scan(
    mb_addr: i32,
    mbaff: bool,
    mb_is_field: bool,
    pic_width_in_samples: i32,
) -> (i32, i32) {
    if mbaff {
        let xo = inverse_raster_scan(mb_addr / 2, 16, 32, pic_width_in_samples, 0);
        let yo = inverse_raster_scan(mb_addr / 2, 16, 32, pic_width_in_samples, 1);
        if mb_is_field {
            (xo, yo + mb_addr % 2)
        } else {
            (xo, yo + mb_addr % 2 * 16)
        }
    } else {
        (
            inverse_raster_scan(mb_addr, 16, 16, pic_width_in_samples, 0),
            inverse_raster_scan(mb_addr, 16, 16, pic_width_in_samples, 1),
        )
    }
}

/// 宏块分区索引 → 分区左上角坐标 (6.4.2.1)
pub fn inverse_macroblock_partition_scan(mb_type: MbType, mb_part_idx: i32) -> (i32, i32) {
    let w = mb_type.mb_part_width();
    let h = mb_type.mb_part_height();
    (
        inverse_raster_scan(mb_part_idx, w, h, 16, 0),
        inverse_raster_scan(mb_part_idx, w, h, 16, 1),
    )
}

/// 子宏块分区索引 → 分区左上角坐标 (6.4.2.2)
///
/// 仅 8x8 族宏块使用子宏块类型的分区尺寸, 其余按 4x4 处理.
pub fn inverse_sub_macroblock_partition_scan(
    mb_type: MbType,
    sub_mb_type: SubMbType,
    sub_mb_part_idx: i32,
) -> (i32, i32) {
    if mb_type.has_sub_mb_parts() {
        let w = sub_mb_type.sub_mb_part_width();
        let h = sub_mb_type.sub_mb_part_height();
        (
            inverse_raster_scan(sub_mb_part_idx, w, h, 8, 0),
            inverse_raster_scan(sub_mb_part_idx, w, h, 8, 1),
        )
    } else {
        (
            inverse_raster_scan(sub_mb_part_idx, 4, 4, 8, 0),
            inverse_raster_scan(sub_mb_part_idx, 4, 4, 8, 1),
        )
    }
}

/// 亮度 4x4 块索引 → 宏块内坐标 (6.4.3)
pub fn inverse_4x4_luma_scan(blk_idx: i32) -> (i32, i32) {
    (
        inverse_raster_scan(blk_idx / 4, 8, 8, 16, 0) + inverse_raster_scan(blk_idx % 4, 4, 4, 8, 0),
        inverse_raster_scan(blk_idx / 4, 8, 8, 16, 1) + inverse_raster_scan(blk_idx % 4, 4, 4, 8, 1),
    )
}

/// 亮度 8x8 块索引 → 宏块内坐标 (6.4.5)
pub fn inverse_8x8_luma_scan(blk_idx: i32) -> (i32, i32) {
    (
        inverse_raster_scan(blk_idx, 8, 8, 16, 0),
        inverse_raster_scan(blk_idx, 8, 8, 16, 1),
    )
}

/// 色度 4x4 块索引 → 宏块内坐标 (6.4.7)
pub fn inverse_4x4_chroma_scan(blk_idx: i32) -> (i32, i32) {
    (
        inverse_raster_scan(blk_idx, 4, 4, 8, 0),
        inverse_raster_scan(blk_idx, 4, 4, 8, 1),
    )
}

// ============================================================
// 块索引推导 (扫描的精确逆映射, 6.4.13)
// ============================================================

/// 宏块内坐标 → 亮度 4x4 块索引 (6.4.13.1)
pub fn derive_4x4_luma_block_indices(xp: i32, yp: i32) -> i32 {
    8 * (yp / 8) + 4 * (xp / 8) + 2 * (yp % 8 / 4) + xp % 8 / 4
}

/// 宏块内坐标 → 色度 4x4 块索引 (6.4.13.2)
pub fn derive_4x4_chroma_block_indices(xp: i32, yp: i32) -> i32 {
    2 * (yp / 4) + xp / 4
}

/// 宏块内坐标 → 亮度 8x8 块索引 (6.4.13.3)
pub fn derive_8x8_luma_block_indices(xp: i32, yp: i32) -> i32 {
    2 * (yp / 8) + xp / 8
}

/// 宏块内坐标 → (宏块分区索引, 子宏块分区索引) (6.4.13.4)
pub fn derive_partition_indices(
    mb_type: MbType,
    sub_mb_type: Option<SubMbType>,
    xp: i32,
    yp: i32,
) -> (i32, i32) {
    let mb_part_idx = if mb_type.is_intra() {
        0
    } else {
        let w = mb_type.mb_part_width();
        let h = mb_type.mb_part_height();
        16 / w * (yp / h) + xp / w
    };

    let sub_mb_part_idx = match (mb_type, sub_mb_type) {
        (_, Some(sub)) if mb_type.has_sub_mb_parts() => {
            let w = sub.sub_mb_part_width();
            let h = sub.sub_mb_part_height();
            8 / w * (yp % 8 / h) + xp % 8 / w
        }
        (MbType::BSkip | MbType::BDirect16x16, _) => 2 * (yp % 8 / 4) + xp % 8 / 4,
        _ => 0,
    };

    (mb_part_idx, sub_mb_part_idx)
}

// ============================================================
// 邻居宏块寻址 (6.4.9 / 6.4.10)
// ============================================================

/// 邻居宏块 (地址 + 可用性)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbNeighbor {
    pub addr: i32,
    pub available: bool,
}

impl MbNeighbor {
    pub const NONE: MbNeighbor = MbNeighbor {
        addr: -1,
        available: false,
    };
}

/// A/B/C/D 四个邻居宏块
#[derive(Debug, Clone, Copy)]
pub struct MbNeighbors {
    /// 左邻居
    pub a: MbNeighbor,
    /// 上邻居
    pub b: MbNeighbor,
    /// 右上邻居
    pub c: MbNeighbor,
    /// 左上邻居
    pub d: MbNeighbor,
}

/// 邻居推导上下文
///
/// `curr_mb_frame_flag` 与 `mb_addr_x_frame_flag` 仅在 MBAFF 下有意义,
/// 后者指被查询的邻居宏块对是否为帧宏块对, 由调用方从已解码状态提供.
#[derive(Debug, Clone, Copy)]
pub struct NeighborCtx {
    pub curr_mb_addr: i32,
    pub pic_width_in_mbs: i32,
    pub mbaff: bool,
    pub curr_mb_frame_flag: bool,
    pub mb_addr_x_frame_flag: bool,
    /// 色度宏块尺寸 MbWidthC / MbHeightC
    pub mb_width_c: i32,
    pub mb_height_c: i32,
}

impl NeighborCtx {
    /// 非 MBAFF 帧图像的简单上下文
    pub fn frame(curr_mb_addr: i32, pic_width_in_mbs: i32) -> Self {
        Self {
            curr_mb_addr,
            pic_width_in_mbs,
            mbaff: false,
            curr_mb_frame_flag: true,
            mb_addr_x_frame_flag: true,
            mb_width_c: 8,
            mb_height_c: 8,
        }
    }
}

/// 推导 A/B/C/D 邻居宏块地址及可用性 (6.4.9 / 6.4.10)
///
/// 边缘约束: 第 0 列无 A/D, 末列无 C, 首行无 B/C/D.
pub fn neighbor_mb_addresses(ctx: &NeighborCtx) -> MbNeighbors {
    let w = ctx.pic_width_in_mbs;
    if ctx.mbaff {
        let pair = ctx.curr_mb_addr / 2;
        MbNeighbors {
            a: MbNeighbor {
                addr: 2 * (pair - 1),
                available: pair % w != 0,
            },
            b: MbNeighbor {
                addr: 2 * (pair - w),
                available: pair >= w,
            },
            c: MbNeighbor {
                addr: 2 * (pair - w + 1),
                available: pair >= w && (pair + 1) % w != 0,
            },
            d: MbNeighbor {
                addr: 2 * (pair - w - 1),
                available: pair >= w && pair % w != 0,
            },
        }
    } else {
        let curr = ctx.curr_mb_addr;
        MbNeighbors {
            a: MbNeighbor {
                addr: curr - 1,
                available: curr % w != 0,
            },
            b: MbNeighbor {
                addr: curr - w,
                available: curr >= w,
            },
            c: MbNeighbor {
                addr: curr - w + 1,
                available: curr >= w && (curr + 1) % w != 0,
            },
            d: MbNeighbor {
                addr: curr - w - 1,
                available: curr >= w && curr % w != 0,
            },
        }
    }
}

// ============================================================
// 邻居位置推导 (6.4.12)
// ============================================================

/// 邻居位置推导结果: 邻居宏块与该宏块内的环绕坐标
#[derive(Debug, Clone, Copy)]
pub struct NeighborLocation {
    pub mb: MbNeighbor,
    pub xw: i32,
    pub yw: i32,
}

/// 邻居位置推导 (6.4.12)
///
/// 给定相对当前宏块的坐标 `(xn, yn)`, 返回其所在的邻居宏块与宏块内坐标.
/// 请求右侧或下方 (未解码区域) 的位置是结构错误.
pub fn derive_neighboring_locations(
    ctx: &NeighborCtx,
    is_luma: bool,
    xn: i32,
    yn: i32,
) -> MbResult<NeighborLocation> {
    let max_w = if is_luma { 16 } else { ctx.mb_width_c };
    let max_h = if is_luma { 16 } else { ctx.mb_height_c };
    let neighbors = neighbor_mb_addresses(ctx);

    if ctx.mbaff {
        return derive_neighboring_locations_mbaff(ctx, &neighbors, xn, yn, max_w, max_h);
    }

    let mb = if xn < 0 && yn < 0 {
        neighbors.d
    } else if xn < 0 && (0..max_h).contains(&yn) {
        neighbors.a
    } else if (0..max_w).contains(&xn) && yn < 0 {
        neighbors.b
    } else if (0..max_w).contains(&xn) && (0..max_h).contains(&yn) {
        MbNeighbor {
            addr: ctx.curr_mb_addr,
            available: true,
        }
    } else if xn >= max_w && yn < 0 {
        neighbors.c
    } else {
        // 右侧 (xn >= max_w, yn >= 0) 或下方 (yn >= max_h) 尚未解码
        return Err(MbError::Structural {
            mb_addr: ctx.curr_mb_addr,
            block: BlockKind::Macroblock,
            step: "邻居位置推导: 请求右侧/下方位置",
        });
    };

    Ok(NeighborLocation {
        mb,
        xw: (xn + max_w) % max_w,
        yw: (yn + max_h) % max_h,
    })
}

/// MBAFF 邻居位置推导 (6.4.12.2)
///
/// 左列 (xn < 0) 按 yn 区域 x 当前/邻居宏块对的帧场组合逐支推导;
/// xn >= 0 的上方区域按场对寻址选择 B/C 对或同对的顶宏块.
fn derive_neighboring_locations_mbaff(
    ctx: &NeighborCtx,
    neighbors: &MbNeighbors,
    xn: i32,
    yn: i32,
    max_w: i32,
    max_h: i32,
) -> MbResult<NeighborLocation> {
    let curr_frame = ctx.curr_mb_frame_flag;
    let top_mb = ctx.curr_mb_addr % 2 == 0;
    let x_frame = ctx.mb_addr_x_frame_flag;
    let (a, b, c, d) = (neighbors.a, neighbors.b, neighbors.c, neighbors.d);

    let pick = |base: MbNeighbor, offset: i32, ym: i32| -> (MbNeighbor, i32) {
        (
            MbNeighbor {
                addr: base.addr + offset,
                available: base.available,
            },
            ym,
        )
    };

    let (mb, ym) = if xn < 0 {
        if yn < 0 {
            match (curr_frame, top_mb) {
                (true, true) => pick(d, 1, yn),
                (true, false) => {
                    if x_frame {
                        pick(a, 0, yn)
                    } else {
                        pick(a, 1, (yn + max_h) >> 1)
                    }
                }
                (false, true) => {
                    if x_frame {
                        pick(d, 1, 2 * yn)
                    } else {
                        pick(d, 0, yn)
                    }
                }
                (false, false) => pick(d, 0, yn),
            }
        } else if yn <= max_h - 1 {
            match (curr_frame, top_mb) {
                (true, true) => {
                    if x_frame {
                        pick(a, 0, yn)
                    } else {
                        pick(a, yn % 2, yn >> 1)
                    }
                }
                (true, false) => {
                    if x_frame {
                        pick(a, 1, yn)
                    } else {
                        pick(a, yn % 2, yn >> 1)
                    }
                }
                (false, true) => {
                    if x_frame {
                        pick(a, 0, yn)
                    } else if yn < max_h / 2 {
                        pick(a, 0, yn << 1)
                    } else {
                        pick(a, 1, (yn << 1) - max_h)
                    }
                }
                (false, false) => {
                    if x_frame {
                        pick(a, 1, yn)
                    } else if yn < max_h / 2 {
                        pick(a, 0, (yn << 1) + 1)
                    } else {
                        pick(a, 1, (yn << 1) + 1 - max_h)
                    }
                }
            }
        } else {
            let yb = yn - max_h;
            match (curr_frame, top_mb) {
                (true, true) => {
                    if x_frame {
                        pick(b, 0, yb)
                    } else {
                        pick(b, yb % 2, yb >> 1)
                    }
                }
                (true, false) => {
                    if x_frame {
                        pick(b, 1, yb)
                    } else {
                        pick(b, yb % 2, yb >> 1)
                    }
                }
                (false, true) => {
                    if x_frame {
                        pick(b, 1, 2 * yb)
                    } else {
                        pick(b, 0, yb)
                    }
                }
                (false, false) => {
                    if x_frame {
                        pick(b, 1, yb)
                    } else if yb < max_h / 2 {
                        pick(b, 0, (yb << 1) + 1)
                    } else {
                        pick(b, 1, (yb << 1) + 1 - max_h)
                    }
                }
            }
        }
    } else if (0..max_w).contains(&xn) && (0..max_h).contains(&yn) {
        (
            MbNeighbor {
                addr: ctx.curr_mb_addr,
                available: true,
            },
            yn,
        )
    } else if yn < 0 && xn <= max_w - 1 {
        // 正上方: 帧对底宏块的上邻居是同对顶宏块, 其余取 B 对
        match (curr_frame, top_mb) {
            (true, true) => pick(b, 1, yn),
            (true, false) => (
                MbNeighbor {
                    addr: ctx.curr_mb_addr - 1,
                    available: true,
                },
                yn,
            ),
            (false, true) => {
                if x_frame {
                    pick(b, 1, 2 * yn)
                } else {
                    pick(b, 0, yn)
                }
            }
            // 场对底宏块取 B 对中同场序的底宏块
            (false, false) => pick(b, 1, yn),
        }
    } else if yn < 0 && xn > max_w - 1 {
        // 右上方: 帧对底宏块的右上在未解码的右侧对中, 视为不可用
        match (curr_frame, top_mb) {
            (true, true) => pick(c, 1, yn),
            (true, false) => (MbNeighbor::NONE, yn),
            (false, true) => {
                if x_frame {
                    pick(c, 1, 2 * yn)
                } else {
                    pick(c, 0, yn)
                }
            }
            (false, false) => pick(c, 1, yn),
        }
    } else {
        return Err(MbError::Structural {
            mb_addr: ctx.curr_mb_addr,
            block: BlockKind::Macroblock,
            step: "MBAFF 邻居位置推导: 请求右侧/下方位置",
        });
    };

    Ok(NeighborLocation {
        mb,
        xw: (xn + max_w) % max_w,
        yw: (ym + max_h) % max_h,
    })
}

// ============================================================
// 邻居块推导 (6.4.11.4 - 6.4.11.6)
// ============================================================

/// 邻居块: 所在宏块与该宏块内的块索引
#[derive(Debug, Clone, Copy)]
pub struct NeighborBlock {
    pub mb: MbNeighbor,
    pub blk_idx: i32,
}

/// 左 (A) / 上 (B) 邻居偏移
const LOC_A: (i32, i32) = (-1, 0);
const LOC_B: (i32, i32) = (0, -1);
const LOC_D: (i32, i32) = (-1, -1);

fn neighbor_block(
    ctx: &NeighborCtx,
    is_luma: bool,
    x: i32,
    y: i32,
    offset: (i32, i32),
    index: fn(i32, i32) -> i32,
) -> MbResult<NeighborBlock> {
    let loc = derive_neighboring_locations(ctx, is_luma, x + offset.0, y + offset.1)?;
    if !loc.mb.available {
        return Ok(NeighborBlock {
            mb: loc.mb,
            blk_idx: 0,
        });
    }
    Ok(NeighborBlock {
        mb: loc.mb,
        blk_idx: index(loc.xw, loc.yw),
    })
}

/// 邻居亮度 4x4 块推导 (6.4.11.4), 返回 (A, B)
pub fn derive_neighboring_4x4_luma_blocks(
    ctx: &NeighborCtx,
    luma4x4_blk_idx: i32,
) -> MbResult<(NeighborBlock, NeighborBlock)> {
    let (x, y) = inverse_4x4_luma_scan(luma4x4_blk_idx);
    let a = neighbor_block(ctx, true, x, y, LOC_A, derive_4x4_luma_block_indices)?;
    let b = neighbor_block(ctx, true, x, y, LOC_B, derive_4x4_luma_block_indices)?;
    Ok((a, b))
}

/// 邻居色度 4x4 块推导 (6.4.11.5, ChromaArrayType 1/2), 返回 (A, B)
pub fn derive_neighboring_4x4_chroma_blocks(
    ctx: &NeighborCtx,
    chroma4x4_blk_idx: i32,
) -> MbResult<(NeighborBlock, NeighborBlock)> {
    let (x, y) = inverse_4x4_chroma_scan(chroma4x4_blk_idx);
    let a = neighbor_block(ctx, false, x, y, LOC_A, derive_4x4_chroma_block_indices)?;
    let b = neighbor_block(ctx, false, x, y, LOC_B, derive_4x4_chroma_block_indices)?;
    Ok((a, b))
}

/// 邻居亮度 8x8 块推导 (6.4.11.2), 返回 (A, B)
pub fn derive_neighboring_8x8_luma_blocks(
    ctx: &NeighborCtx,
    luma8x8_blk_idx: i32,
) -> MbResult<(NeighborBlock, NeighborBlock)> {
    let x = luma8x8_blk_idx % 2 * 8;
    let y = luma8x8_blk_idx / 2 * 8;
    let a = neighbor_block(ctx, true, x, y, LOC_A, derive_8x8_luma_block_indices)?;
    let b = neighbor_block(ctx, true, x, y, LOC_B, derive_8x8_luma_block_indices)?;
    Ok((a, b))
}

// ============================================================
// 邻居分区推导 (6.4.11.7)
// ============================================================

/// 邻居分区: 所在宏块与分区/子分区索引
#[derive(Debug, Clone, Copy)]
pub struct NeighborPartition {
    pub mb: MbNeighbor,
    pub mb_part_idx: i32,
    pub sub_mb_part_idx: i32,
}

/// 邻居分区推导 (6.4.11.7), 返回 [A, B, C, D]
///
/// C 邻居的水平偏移为预测分区宽度 predPartWidth, 对 Skip/Direct 取 16.
pub fn derive_neighboring_partitions(
    ctx: &NeighborCtx,
    mb_type: MbType,
    sub_mb_types: &[SubMbType; 4],
    curr_sub_mb_type: Option<SubMbType>,
    mb_part_idx: i32,
    sub_mb_part_idx: i32,
) -> MbResult<[NeighborPartition; 4]> {
    let (x, y) = inverse_macroblock_partition_scan(mb_type, mb_part_idx);
    let part = mb_part_idx.clamp(0, 3) as usize;

    let (xs, ys) = if mb_type.has_sub_mb_parts() {
        inverse_sub_macroblock_partition_scan(mb_type, sub_mb_types[part], sub_mb_part_idx)
    } else {
        (0, 0)
    };

    let pred_part_width = match mb_type {
        MbType::PSkip | MbType::BSkip | MbType::BDirect16x16 => 16,
        MbType::B8x8 => {
            if curr_sub_mb_type == Some(SubMbType::BDirect8x8) {
                16
            } else {
                sub_mb_types[part].sub_mb_part_width()
            }
        }
        MbType::P8x8 | MbType::P8x8Ref0 => sub_mb_types[part].sub_mb_part_width(),
        _ => mb_type.mb_part_width(),
    };

    let offsets = [LOC_A, LOC_B, (pred_part_width, -1), LOC_D];
    let mut result = [NeighborPartition {
        mb: MbNeighbor::NONE,
        mb_part_idx: 0,
        sub_mb_part_idx: 0,
    }; 4];

    for (slot, offset) in result.iter_mut().zip(offsets) {
        let loc = derive_neighboring_locations(ctx, true, x + xs + offset.0, y + ys + offset.1)?;
        *slot = if loc.mb.available {
            let (mb_part, sub_part) =
                derive_partition_indices(mb_type, Some(sub_mb_types[part]), loc.xw, loc.yw);
            NeighborPartition {
                mb: loc.mb,
                mb_part_idx: mb_part,
                sub_mb_part_idx: sub_part,
            }
        } else {
            NeighborPartition {
                mb: loc.mb,
                mb_part_idx: 0,
                sub_mb_part_idx: 0,
            }
        };
    }

    Ok(result)
}
