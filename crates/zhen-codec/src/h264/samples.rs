//! 帧内预测参考样本 (ITU-T H.264 条款 8.3).
//!
//! 预测块上方与左侧的参考样本带 (含左上角) 以值结构表示, 每个样本附带
//! 可用性标记. 采集时通过邻居位置推导定位样本来源, 不可用的位置保持
//! 未标记, 由各预测模式自行决定回退或报错.

use super::error::MbResult;
use super::geometry::{
    MbNeighbor, NeighborCtx, derive_4x4_luma_block_indices, derive_neighboring_locations,
};

/// 预测块的参考样本带.
///
/// 坐标约定与标准一致: `p[x, -1]` 为上方行 (x 从 -1 到 2*宽-1, 对角模式
/// 需要右上延伸), `p[-1, y]` 为左侧列 (y 从 0 到 高-1).
#[derive(Debug, Clone)]
pub struct RefSamples {
    width: usize,
    height: usize,
    /// p[-1..=2w-1, -1], 索引偏移 +1
    top: Vec<i32>,
    top_avail: Vec<bool>,
    /// p[-1, 0..=h-1]
    left: Vec<i32>,
    left_avail: Vec<bool>,
}

impl RefSamples {
    /// 创建全部不可用的参考样本带
    pub fn new(width: usize, height: usize) -> Self {
        let top_len = 2 * width + 1;
        Self {
            width,
            height,
            top: vec![0; top_len],
            top_avail: vec![false; top_len],
            left: vec![0; height],
            left_avail: vec![false; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 写入样本并标记可用
    pub fn set(&mut self, x: i32, y: i32, value: i32) {
        if y == -1 {
            let idx = (x + 1) as usize;
            if idx < self.top.len() {
                self.top[idx] = value;
                self.top_avail[idx] = true;
            }
        } else if x == -1 {
            let idx = y as usize;
            if idx < self.left.len() {
                self.left[idx] = value;
                self.left_avail[idx] = true;
            }
        }
    }

    /// 读取样本 (不可用位置返回 0, 调用方需先检查可用性)
    pub fn get(&self, x: i32, y: i32) -> i32 {
        if y == -1 {
            self.top.get((x + 1) as usize).copied().unwrap_or(0)
        } else if x == -1 {
            self.left.get(y as usize).copied().unwrap_or(0)
        } else {
            0
        }
    }

    pub fn available(&self, x: i32, y: i32) -> bool {
        if y == -1 {
            self.top_avail.get((x + 1) as usize).copied().unwrap_or(false)
        } else if x == -1 {
            self.left_avail.get(y as usize).copied().unwrap_or(false)
        } else {
            false
        }
    }

    /// 上方 x 在 [0, n) 内全部可用
    pub fn top_available(&self, n: usize) -> bool {
        self.top_avail[1..].iter().take(n).all(|&a| a)
    }

    /// 左侧 y 在 [0, n) 内全部可用
    pub fn left_available(&self, n: usize) -> bool {
        self.left_avail.iter().take(n).all(|&a| a)
    }

    /// 左上角 p[-1, -1] 可用
    pub fn corner_available(&self) -> bool {
        self.top_avail[0]
    }
}

// ============================================================
// 参考样本采集
// ============================================================

/// 采集一个预测块的参考样本带.
///
/// `(x0, y0)` 为块在宏块内的左上角, `extend_top` 对 4x4/8x8 对角模式
/// 延伸右上行到 2*宽 (仅亮度). `source` 负责提供邻居宏块 (或当前宏块
/// 已解码部分) 的重建样本, 受限帧内预测排除的邻居返回 `None`.
///
/// 右上延伸带中落在宏块右侧图像区域或解码序尚未重建的块内的位置按
/// 不可用处理, 并按 8.3.1.2 / 8.3.2.2.1 由 `p[宽-1, -1]` 替代.
pub fn gather_refs<S>(
    ctx: &NeighborCtx,
    source: &S,
    is_luma: bool,
    x0: i32,
    y0: i32,
    width: usize,
    height: usize,
    extend_top: bool,
) -> MbResult<RefSamples>
where
    S: Fn(MbNeighbor, i32, i32) -> Option<i32>,
{
    let mut refs = RefSamples::new(width, height);
    let w = width as i32;

    for x in -1..w {
        fetch(ctx, source, is_luma, x0, y0, x, -1, &mut refs)?;
    }
    for y in 0..height as i32 {
        fetch(ctx, source, is_luma, x0, y0, -1, y, &mut refs)?;
    }

    if extend_top {
        for x in w..2 * w {
            let (xn, yn) = (x0 + x, y0 - 1);
            // 宏块右侧 (永不可用) 或宏块内按 4x4 解码序未重建的右上位置
            if yn >= 0
                && (xn > 15
                    || derive_4x4_luma_block_indices(xn, yn)
                        > derive_4x4_luma_block_indices(x0, y0))
            {
                continue;
            }
            fetch(ctx, source, is_luma, x0, y0, x, -1, &mut refs)?;
        }
        if refs.available(w - 1, -1) {
            let fill = refs.get(w - 1, -1);
            for x in w..2 * w {
                if !refs.available(x, -1) {
                    refs.set(x, -1, fill);
                }
            }
        }
    }
    Ok(refs)
}

fn fetch<S>(
    ctx: &NeighborCtx,
    source: &S,
    is_luma: bool,
    x0: i32,
    y0: i32,
    x: i32,
    y: i32,
    refs: &mut RefSamples,
) -> MbResult<()>
where
    S: Fn(MbNeighbor, i32, i32) -> Option<i32>,
{
    let loc = derive_neighboring_locations(ctx, is_luma, x0 + x, y0 + y)?;
    if !loc.mb.available {
        return Ok(());
    }
    if let Some(value) = source(loc.mb, loc.xw, loc.yw) {
        refs.set(x, y, value);
    }
    Ok(())
}

// ============================================================
// 8x8 参考样本过滤 (8.3.2.2.1)
// ============================================================

/// Intra_8x8 参考样本低通过滤.
///
/// 仅对可用的样本段过滤, 不可用段在输出中保持不可用.
pub fn filter_8x8_refs(p: &RefSamples) -> RefSamples {
    let mut out = RefSamples::new(p.width(), p.height());
    let corner = p.corner_available();

    if p.top_available(16) {
        if corner {
            out.set(0, -1, (p.get(-1, -1) + 2 * p.get(0, -1) + p.get(1, -1) + 2) >> 2);
        } else {
            out.set(0, -1, (3 * p.get(0, -1) + p.get(1, -1) + 2) >> 2);
        }
        for x in 1..15 {
            out.set(x, -1, (p.get(x - 1, -1) + 2 * p.get(x, -1) + p.get(x + 1, -1) + 2) >> 2);
        }
        out.set(15, -1, (p.get(14, -1) + 3 * p.get(15, -1) + 2) >> 2);
    }

    if corner {
        let top0 = p.available(0, -1);
        let left0 = p.available(-1, 0);
        let v = if top0 && left0 {
            (p.get(0, -1) + 2 * p.get(-1, -1) + p.get(-1, 0) + 2) >> 2
        } else if top0 {
            (3 * p.get(-1, -1) + p.get(0, -1) + 2) >> 2
        } else if left0 {
            (3 * p.get(-1, -1) + p.get(-1, 0) + 2) >> 2
        } else {
            p.get(-1, -1)
        };
        out.set(-1, -1, v);
    }

    if p.left_available(8) {
        if corner {
            out.set(-1, 0, (p.get(-1, -1) + 2 * p.get(-1, 0) + p.get(-1, 1) + 2) >> 2);
        } else {
            out.set(-1, 0, (3 * p.get(-1, 0) + p.get(-1, 1) + 2) >> 2);
        }
        for y in 1..7 {
            out.set(-1, y, (p.get(-1, y - 1) + 2 * p.get(-1, y) + p.get(-1, y + 1) + 2) >> 2);
        }
        out.set(-1, 7, (p.get(-1, 6) + 3 * p.get(-1, 7) + 2) >> 2);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_set_get() {
        let mut refs = RefSamples::new(4, 4);
        assert!(!refs.available(0, -1));
        refs.set(0, -1, 100);
        refs.set(-1, -1, 50);
        refs.set(-1, 2, 70);
        assert!(refs.available(0, -1));
        assert!(refs.corner_available());
        assert_eq!(refs.get(0, -1), 100);
        assert_eq!(refs.get(-1, -1), 50);
        assert_eq!(refs.get(-1, 2), 70);
        assert!(!refs.available(-1, 0));
    }

    #[test]
    fn test_refs_range_predicates() {
        let mut refs = RefSamples::new(4, 4);
        for x in 0..8 {
            refs.set(x, -1, 10);
        }
        assert!(refs.top_available(8));
        assert!(!refs.left_available(1));
        for y in 0..4 {
            refs.set(-1, y, 10);
        }
        assert!(refs.left_available(4));
    }

    #[test]
    fn test_gather_refs_left_edge() {
        // 第 0 列宏块: 左侧邻居不可用, 上方可用
        let ctx = NeighborCtx::frame(11, 11);
        let source = |mb: MbNeighbor, _xw: i32, _yw: i32| -> Option<i32> {
            if mb.available { Some(128) } else { None }
        };
        let refs = gather_refs(&ctx, &source, true, 0, 0, 4, 4, true).unwrap();
        assert!(refs.top_available(8), "上方样本应可用");
        assert!(!refs.left_available(1), "第 0 列左侧样本不应可用");
        assert!(!refs.corner_available());
        assert_eq!(refs.get(0, -1), 128);
    }

    #[test]
    fn test_gather_refs_interior() {
        let ctx = NeighborCtx::frame(12, 11);
        let source = |_mb: MbNeighbor, xw: i32, yw: i32| Some(xw + 100 * yw);
        let refs = gather_refs(&ctx, &source, true, 4, 4, 4, 4, true).unwrap();
        // 上方行来自当前宏块 y=3
        assert_eq!(refs.get(0, -1), 4 + 300);
        // 左侧列来自当前宏块 x=3
        assert_eq!(refs.get(-1, 0), 3 + 400);
        assert!(refs.corner_available());
    }

    #[test]
    fn test_gather_refs_right_edge_block_extension() {
        // 块 7 (12,4): 右上延伸落在宏块右侧, 不可用但不报错, 由 p[3,-1] 替代
        let ctx = NeighborCtx::frame(12, 11);
        let source = |_mb: MbNeighbor, xw: i32, yw: i32| Some(xw + 100 * yw);
        let refs = gather_refs(&ctx, &source, true, 12, 4, 4, 4, true).unwrap();
        assert_eq!(refs.get(3, -1), 15 + 300);
        for x in 4..8 {
            assert!(refs.available(x, -1), "替代后右上样本 {x} 应可用");
            assert_eq!(refs.get(x, -1), 15 + 300, "右上样本 {x} 应为 p[3,-1] 的替代值");
        }
    }

    #[test]
    fn test_gather_refs_block3_top_right_substitution() {
        // 块 3 (4,4): 右上位置在块 4 区域, 解码序尚未重建, 由 p[3,-1] 替代
        let ctx = NeighborCtx::frame(12, 11);
        let source = |_mb: MbNeighbor, xw: i32, yw: i32| Some(xw + 100 * yw);
        let refs = gather_refs(&ctx, &source, true, 4, 4, 4, 4, true).unwrap();
        for x in 4..8 {
            assert_eq!(refs.get(x, -1), 7 + 300, "未重建的右上样本 {x} 应被替代");
        }
    }

    #[test]
    fn test_gather_refs_block9_top_right_decoded() {
        // 块 9 (4,8): 右上位置在块 6 区域, 解码序已重建, 按实际样本取值
        let ctx = NeighborCtx::frame(12, 11);
        let source = |_mb: MbNeighbor, xw: i32, yw: i32| Some(xw + 100 * yw);
        let refs = gather_refs(&ctx, &source, true, 4, 8, 4, 4, true).unwrap();
        for x in 4..8 {
            assert_eq!(refs.get(x, -1), (4 + x) + 700);
        }
    }

    #[test]
    fn test_filter_8x8_flat_is_identity() {
        // 平坦样本带经低通过滤后不变
        let mut p = RefSamples::new(8, 8);
        p.set(-1, -1, 60);
        for x in 0..16 {
            p.set(x, -1, 60);
        }
        for y in 0..8 {
            p.set(-1, y, 60);
        }
        let f = filter_8x8_refs(&p);
        for x in -1..16 {
            assert_eq!(f.get(x, -1), 60, "上方样本 {x} 过滤后应保持 60");
        }
        for y in 0..8 {
            assert_eq!(f.get(-1, y), 60);
        }
    }

    #[test]
    fn test_filter_8x8_three_tap() {
        let mut p = RefSamples::new(8, 8);
        p.set(-1, -1, 40);
        for x in 0..16 {
            p.set(x, -1, if x == 4 { 80 } else { 40 });
        }
        for y in 0..8 {
            p.set(-1, y, 40);
        }
        let f = filter_8x8_refs(&p);
        // (40 + 2*80 + 40 + 2) >> 2 = 60
        assert_eq!(f.get(4, -1), 60);
        // 相邻样本 (40 + 2*40 + 80 + 2) >> 2 = 50
        assert_eq!(f.get(3, -1), 50);
        assert_eq!(f.get(5, -1), 50);
        assert_eq!(f.get(0, -1), 40);
    }

    #[test]
    fn test_filter_8x8_unavailable_stays_unavailable() {
        let mut p = RefSamples::new(8, 8);
        for x in 0..16 {
            p.set(x, -1, 90);
        }
        // 左侧与角不可用
        let f = filter_8x8_refs(&p);
        assert!(f.top_available(16));
        assert!(!f.corner_available());
        assert!(!f.left_available(1));
        // 无角时首样本用 3 抽头退化式
        assert_eq!(f.get(0, -1), (3 * 90 + 90 + 2) >> 2);
    }
}
