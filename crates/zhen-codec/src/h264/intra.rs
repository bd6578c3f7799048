//! 帧内样本预测 (ITU-T H.264 条款 8.3).
//!
//! Intra_4x4 与 Intra_8x8 共享 9 种方向模式, Intra_16x16 与色度各 4 种.
//! 所有预测函数都是参考样本带上的纯函数, 按值返回预测块. DC 模式按标准
//! 在邻居缺失时逐级回退到 `1 << (位深 - 1)`, 其余模式在所需参考样本
//! 不可用时报 [`MbError::SamplesUnavailable`].

use log::warn;
use zhen_core::BitReader;

use super::config::{ChromaFormat, CoreConfig};
use super::error::{MbError, MbResult};
use super::samples::{RefSamples, filter_8x8_refs};

// ============================================================
// 预测模式
// ============================================================

/// Intra_4x4 / Intra_8x8 共用的 9 种方向预测模式 (Table 8-2 / 8-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntraLumaMxMMode {
    Vertical,
    Horizontal,
    Dc,
    DiagDownLeft,
    DiagDownRight,
    VerticalRight,
    HorizontalDown,
    VerticalLeft,
    HorizontalUp,
}

impl IntraLumaMxMMode {
    /// 由语法元素数值构造
    pub fn from_index(idx: u8) -> Option<Self> {
        Some(match idx {
            0 => IntraLumaMxMMode::Vertical,
            1 => IntraLumaMxMMode::Horizontal,
            2 => IntraLumaMxMMode::Dc,
            3 => IntraLumaMxMMode::DiagDownLeft,
            4 => IntraLumaMxMMode::DiagDownRight,
            5 => IntraLumaMxMMode::VerticalRight,
            6 => IntraLumaMxMMode::HorizontalDown,
            7 => IntraLumaMxMMode::VerticalLeft,
            8 => IntraLumaMxMMode::HorizontalUp,
            _ => return None,
        })
    }

    pub fn index(self) -> u8 {
        match self {
            IntraLumaMxMMode::Vertical => 0,
            IntraLumaMxMMode::Horizontal => 1,
            IntraLumaMxMMode::Dc => 2,
            IntraLumaMxMMode::DiagDownLeft => 3,
            IntraLumaMxMMode::DiagDownRight => 4,
            IntraLumaMxMMode::VerticalRight => 5,
            IntraLumaMxMMode::HorizontalDown => 6,
            IntraLumaMxMMode::VerticalLeft => 7,
            IntraLumaMxMMode::HorizontalUp => 8,
        }
    }

    fn name(self) -> &'static str {
        match self {
            IntraLumaMxMMode::Vertical => "Vertical",
            IntraLumaMxMMode::Horizontal => "Horizontal",
            IntraLumaMxMMode::Dc => "DC",
            IntraLumaMxMMode::DiagDownLeft => "Diagonal_Down_Left",
            IntraLumaMxMMode::DiagDownRight => "Diagonal_Down_Right",
            IntraLumaMxMMode::VerticalRight => "Vertical_Right",
            IntraLumaMxMMode::HorizontalDown => "Horizontal_Down",
            IntraLumaMxMMode::VerticalLeft => "Vertical_Left",
            IntraLumaMxMMode::HorizontalUp => "Horizontal_Up",
        }
    }
}

/// Intra_16x16 预测模式 (Table 7-16 的 Intra16x16PredMode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intra16x16Mode {
    Vertical,
    Horizontal,
    Dc,
    Plane,
}

impl Intra16x16Mode {
    pub fn from_index(idx: u8) -> Option<Self> {
        Some(match idx {
            0 => Intra16x16Mode::Vertical,
            1 => Intra16x16Mode::Horizontal,
            2 => Intra16x16Mode::Dc,
            3 => Intra16x16Mode::Plane,
            _ => return None,
        })
    }
}

/// 色度帧内预测模式 (intra_chroma_pred_mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntraChromaMode {
    Dc,
    Horizontal,
    Vertical,
    Plane,
}

impl IntraChromaMode {
    pub fn from_index(idx: u8) -> Option<Self> {
        Some(match idx {
            0 => IntraChromaMode::Dc,
            1 => IntraChromaMode::Horizontal,
            2 => IntraChromaMode::Vertical,
            3 => IntraChromaMode::Plane,
            _ => return None,
        })
    }
}

fn clip1(x: i32, bit_depth: u8) -> i32 {
    super::common::clip1(x, bit_depth)
}

fn unavailable(mb_addr: i32, mode: &'static str) -> MbError {
    MbError::SamplesUnavailable { mb_addr, mode }
}

// ============================================================
// Intra_4x4 / Intra_8x8 (8.3.1.2 / 8.3.2.2)
// ============================================================

/// Intra_4x4 样本预测, 返回 pred\[y\]\[x\]
pub fn predict_4x4(
    mb_addr: i32,
    mode: IntraLumaMxMMode,
    p: &RefSamples,
    bit_depth: u8,
) -> MbResult<[[i32; 4]; 4]> {
    let full = predict_mxm(mb_addr, 4, mode, p, bit_depth)?;
    let mut out = [[0i32; 4]; 4];
    for y in 0..4 {
        out[y].copy_from_slice(&full[y][..4]);
    }
    Ok(out)
}

/// Intra_8x8 样本预测 (内部先做参考样本过滤), 返回 pred\[y\]\[x\]
pub fn predict_8x8(
    mb_addr: i32,
    mode: IntraLumaMxMMode,
    p: &RefSamples,
    bit_depth: u8,
) -> MbResult<[[i32; 8]; 8]> {
    let filtered = filter_8x8_refs(p);
    predict_mxm(mb_addr, 8, mode, &filtered, bit_depth)
}

/// 4x4 与 8x8 共用的方向预测核心, n 为块边长
fn predict_mxm(
    mb_addr: i32,
    n: i32,
    mode: IntraLumaMxMMode,
    p: &RefSamples,
    bit_depth: u8,
) -> MbResult<[[i32; 8]; 8]> {
    let nu = n as usize;
    let shift = n.trailing_zeros();
    let mut out = [[0i32; 8]; 8];
    let top = p.top_available(nu);
    let top_ext = p.top_available(2 * nu);
    let left = p.left_available(nu);
    let corner = p.corner_available();

    match mode {
        IntraLumaMxMMode::Vertical => {
            if !top {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..nu {
                for x in 0..nu {
                    out[y][x] = p.get(x as i32, -1);
                }
            }
        }
        IntraLumaMxMMode::Horizontal => {
            if !left {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..nu {
                for x in 0..nu {
                    out[y][x] = p.get(-1, y as i32);
                }
            }
        }
        IntraLumaMxMMode::Dc => {
            let sum_top: i32 = (0..n).map(|x| p.get(x, -1)).sum();
            let sum_left: i32 = (0..n).map(|y| p.get(-1, y)).sum();
            let dc = if top && left {
                (sum_top + sum_left + n) >> (shift + 1)
            } else if left {
                (sum_left + n / 2) >> shift
            } else if top {
                (sum_top + n / 2) >> shift
            } else {
                1 << (bit_depth - 1)
            };
            for row in out.iter_mut().take(nu) {
                row[..nu].fill(dc);
            }
        }
        IntraLumaMxMMode::DiagDownLeft => {
            if !top_ext {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    out[y as usize][x as usize] = if x == n - 1 && y == n - 1 {
                        (p.get(2 * n - 2, -1) + 3 * p.get(2 * n - 1, -1) + 2) >> 2
                    } else {
                        (p.get(x + y, -1) + 2 * p.get(x + y + 1, -1) + p.get(x + y + 2, -1) + 2)
                            >> 2
                    };
                }
            }
        }
        IntraLumaMxMMode::DiagDownRight => {
            if !(top && left && corner) {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    out[y as usize][x as usize] = if x > y {
                        (p.get(x - y - 2, -1) + 2 * p.get(x - y - 1, -1) + p.get(x - y, -1) + 2)
                            >> 2
                    } else if x < y {
                        (p.get(-1, y - x - 2) + 2 * p.get(-1, y - x - 1) + p.get(-1, y - x) + 2)
                            >> 2
                    } else {
                        (p.get(0, -1) + 2 * p.get(-1, -1) + p.get(-1, 0) + 2) >> 2
                    };
                }
            }
        }
        IntraLumaMxMMode::VerticalRight => {
            if !(top && left && corner) {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    let z = 2 * x - y;
                    out[y as usize][x as usize] = if z >= 0 && z % 2 == 0 {
                        (p.get(x - (y >> 1) - 1, -1) + p.get(x - (y >> 1), -1) + 1) >> 1
                    } else if z >= 1 {
                        (p.get(x - (y >> 1) - 2, -1)
                            + 2 * p.get(x - (y >> 1) - 1, -1)
                            + p.get(x - (y >> 1), -1)
                            + 2)
                            >> 2
                    } else if z == -1 {
                        (p.get(-1, 0) + 2 * p.get(-1, -1) + p.get(0, -1) + 2) >> 2
                    } else {
                        (p.get(-1, y - 2 * x - 1)
                            + 2 * p.get(-1, y - 2 * x - 2)
                            + p.get(-1, y - 2 * x - 3)
                            + 2)
                            >> 2
                    };
                }
            }
        }
        IntraLumaMxMMode::HorizontalDown => {
            if !(top && left && corner) {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    let z = 2 * y - x;
                    out[y as usize][x as usize] = if z >= 0 && z % 2 == 0 {
                        (p.get(-1, y - (x >> 1) - 1) + p.get(-1, y - (x >> 1)) + 1) >> 1
                    } else if z >= 1 {
                        (p.get(-1, y - (x >> 1) - 2)
                            + 2 * p.get(-1, y - (x >> 1) - 1)
                            + p.get(-1, y - (x >> 1))
                            + 2)
                            >> 2
                    } else if z == -1 {
                        (p.get(-1, 0) + 2 * p.get(-1, -1) + p.get(0, -1) + 2) >> 2
                    } else {
                        (p.get(x - 2 * y - 1, -1)
                            + 2 * p.get(x - 2 * y - 2, -1)
                            + p.get(x - 2 * y - 3, -1)
                            + 2)
                            >> 2
                    };
                }
            }
        }
        IntraLumaMxMMode::VerticalLeft => {
            if !top_ext {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    out[y as usize][x as usize] = if y % 2 == 0 {
                        (p.get(x + (y >> 1), -1) + p.get(x + (y >> 1) + 1, -1) + 1) >> 1
                    } else {
                        (p.get(x + (y >> 1), -1)
                            + 2 * p.get(x + (y >> 1) + 1, -1)
                            + p.get(x + (y >> 1) + 2, -1)
                            + 2)
                            >> 2
                    };
                }
            }
        }
        IntraLumaMxMMode::HorizontalUp => {
            if !left {
                return Err(unavailable(mb_addr, mode.name()));
            }
            for y in 0..n {
                for x in 0..n {
                    let z = x + 2 * y;
                    out[y as usize][x as usize] = if z % 2 == 0 && z <= 2 * n - 4 {
                        (p.get(-1, y + (x >> 1)) + p.get(-1, y + (x >> 1) + 1) + 1) >> 1
                    } else if z % 2 == 1 && z <= 2 * n - 5 {
                        (p.get(-1, y + (x >> 1))
                            + 2 * p.get(-1, y + (x >> 1) + 1)
                            + p.get(-1, y + (x >> 1) + 2)
                            + 2)
                            >> 2
                    } else if z == 2 * n - 3 {
                        (p.get(-1, n - 2) + 3 * p.get(-1, n - 1) + 2) >> 2
                    } else {
                        p.get(-1, n - 1)
                    };
                }
            }
        }
    }

    Ok(out)
}

// ============================================================
// Intra_16x16 (8.3.3)
// ============================================================

/// Intra_16x16 样本预测, 返回 pred\[y\]\[x\]
pub fn predict_16x16(
    mb_addr: i32,
    mode: Intra16x16Mode,
    p: &RefSamples,
    bit_depth: u8,
) -> MbResult<[[i32; 16]; 16]> {
    let top = p.top_available(16);
    let left = p.left_available(16);
    let mut out = [[0i32; 16]; 16];

    match mode {
        Intra16x16Mode::Vertical => {
            if !top {
                return Err(unavailable(mb_addr, "Intra_16x16_Vertical"));
            }
            for row in &mut out {
                for (x, v) in row.iter_mut().enumerate() {
                    *v = p.get(x as i32, -1);
                }
            }
        }
        Intra16x16Mode::Horizontal => {
            if !left {
                return Err(unavailable(mb_addr, "Intra_16x16_Horizontal"));
            }
            for (y, row) in out.iter_mut().enumerate() {
                row.fill(p.get(-1, y as i32));
            }
        }
        Intra16x16Mode::Dc => {
            let sum_top: i32 = (0..16).map(|x| p.get(x, -1)).sum();
            let sum_left: i32 = (0..16).map(|y| p.get(-1, y)).sum();
            let dc = if top && left {
                (sum_top + sum_left + 16) >> 5
            } else if left {
                (sum_left + 8) >> 4
            } else if top {
                (sum_top + 8) >> 4
            } else {
                1 << (bit_depth - 1)
            };
            for row in &mut out {
                row.fill(dc);
            }
        }
        Intra16x16Mode::Plane => {
            if !(top && left && p.corner_available()) {
                return Err(unavailable(mb_addr, "Intra_16x16_Plane"));
            }
            let mut h = 0;
            let mut v = 0;
            for i in 0..8 {
                h += (i + 1) * (p.get(8 + i, -1) - p.get(6 - i, -1));
                v += (i + 1) * (p.get(-1, 8 + i) - p.get(-1, 6 - i));
            }
            let a = 16 * (p.get(-1, 15) + p.get(15, -1));
            let b = (5 * h + 32) >> 6;
            let c = (5 * v + 32) >> 6;
            for (y, row) in out.iter_mut().enumerate() {
                for (x, value) in row.iter_mut().enumerate() {
                    *value = clip1(
                        (a + b * (x as i32 - 7) + c * (y as i32 - 7) + 16) >> 5,
                        bit_depth,
                    );
                }
            }
        }
    }

    Ok(out)
}

// ============================================================
// 色度预测 (8.3.4)
// ============================================================

/// 色度预测块, 4:2:0 用前 8 行, 4:2:2 用全部 16 行
pub type ChromaPred = [[i32; 8]; 16];

/// 色度样本预测 (ChromaArrayType 1/2), 返回 pred\[y\]\[x\]
///
/// DC 模式按 4x4 子块推导, 每个子块依位置优先取上方或左侧参考.
/// ChromaArrayType 3 的色度预测走亮度路径, 此处不支持.
pub fn predict_chroma(
    mb_addr: i32,
    mode: IntraChromaMode,
    format: ChromaFormat,
    p: &RefSamples,
    bit_depth: u8,
) -> MbResult<ChromaPred> {
    let cat = format.chroma_array_type();
    if cat != 1 && cat != 2 {
        warn!("H264: 宏块 {} 请求 ChromaArrayType {} 的色度帧内预测", mb_addr, cat);
        return Err(MbError::Unsupported("ChromaArrayType 3 色度帧内预测"));
    }
    let w = format.mb_width_c();
    let h = format.mb_height_c();
    let mut out = [[0i32; 8]; 16];

    match mode {
        IntraChromaMode::Dc => {
            for blk in 0..(1 << (cat + 1)) {
                let xo = blk % 2 * 4;
                let yo = blk / 2 * 4;
                let top = (0..4).all(|x| p.available(x + xo, -1));
                let left = (0..4).all(|y| p.available(-1, y + yo));
                let sum_top: i32 = (0..4).map(|x| p.get(x + xo, -1)).sum();
                let sum_left: i32 = (0..4).map(|y| p.get(-1, y + yo)).sum();

                let dc = if xo == 0 && yo == 0 || xo > 0 && yo > 0 {
                    if top && left {
                        (sum_top + sum_left + 4) >> 3
                    } else if left {
                        (sum_left + 2) >> 2
                    } else if top {
                        (sum_top + 2) >> 2
                    } else {
                        1 << (bit_depth - 1)
                    }
                } else if xo > 0 {
                    // 上排右侧子块优先取上方
                    if top {
                        (sum_top + 2) >> 2
                    } else if left {
                        (sum_left + 2) >> 2
                    } else {
                        1 << (bit_depth - 1)
                    }
                } else {
                    // 左列下方子块优先取左侧
                    if left {
                        (sum_left + 2) >> 2
                    } else if top {
                        (sum_top + 2) >> 2
                    } else {
                        1 << (bit_depth - 1)
                    }
                };

                for y in 0..4 {
                    for x in 0..4 {
                        out[(y + yo) as usize][(x + xo) as usize] = dc;
                    }
                }
            }
        }
        IntraChromaMode::Horizontal => {
            if !p.left_available(h as usize) {
                return Err(unavailable(mb_addr, "Intra_Chroma_Horizontal"));
            }
            for y in 0..h {
                for x in 0..w {
                    out[y as usize][x as usize] = p.get(-1, y);
                }
            }
        }
        IntraChromaMode::Vertical => {
            if !p.top_available(w as usize) {
                return Err(unavailable(mb_addr, "Intra_Chroma_Vertical"));
            }
            for y in 0..h {
                for x in 0..w {
                    out[y as usize][x as usize] = p.get(x, -1);
                }
            }
        }
        IntraChromaMode::Plane => {
            if !(p.top_available(w as usize)
                && p.left_available(h as usize)
                && p.corner_available())
            {
                return Err(unavailable(mb_addr, "Intra_Chroma_Plane"));
            }
            // 4:2:2 下垂直方向按 8 样本差分 (yCF = 4)
            let ycf = if cat != 1 { 4 } else { 0 };
            let mut hg = 0;
            let mut vg = 0;
            for x in 0..4 {
                hg += (x + 1) * (p.get(4 + x, -1) - p.get(2 - x, -1));
            }
            for y in 0..(4 + ycf) {
                vg += (y + 1) * (p.get(-1, 4 + ycf + y) - p.get(-1, 2 + ycf - y));
            }
            let a = 16 * (p.get(-1, h - 1) + p.get(w - 1, -1));
            let b = (34 * hg + 32) >> 6;
            let c = ((34 - 29 * i32::from(cat != 1)) * vg + 32) >> 6;
            for y in 0..h {
                for x in 0..w {
                    out[y as usize][x as usize] = clip1(
                        (a + b * (x - 3) + c * (y - 3 - ycf) + 16) >> 5,
                        bit_depth,
                    );
                }
            }
        }
    }

    Ok(out)
}

// ============================================================
// I_PCM (8.3.5)
// ============================================================

/// I_PCM 宏块的原始样本
#[derive(Debug, Clone)]
pub struct PcmSamples {
    pub luma: Vec<i32>,
    pub cb: Vec<i32>,
    pub cr: Vec<i32>,
}

/// 读取 I_PCM 样本. 读取前对齐到字节边界 (pcm_alignment_zero_bit).
pub fn decode_pcm(br: &mut BitReader, cfg: &CoreConfig) -> MbResult<PcmSamples> {
    br.align_to_byte();

    let mut luma = Vec::with_capacity(256);
    for _ in 0..256 {
        luma.push(br.read_bits(cfg.bit_depth_luma as u32)? as i32);
    }

    let chroma_count = (cfg.chroma_format.mb_width_c() * cfg.chroma_format.mb_height_c()) as usize;
    let mut cb = Vec::with_capacity(chroma_count);
    let mut cr = Vec::with_capacity(chroma_count);
    for _ in 0..chroma_count {
        cb.push(br.read_bits(cfg.bit_depth_chroma as u32)? as i32);
    }
    for _ in 0..chroma_count {
        cr.push(br.read_bits(cfg.bit_depth_chroma as u32)? as i32);
    }

    Ok(PcmSamples { luma, cb, cr })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs_4x4(top: [i32; 8], left: [i32; 4], corner: i32) -> RefSamples {
        let mut p = RefSamples::new(4, 4);
        p.set(-1, -1, corner);
        for (x, v) in top.iter().enumerate() {
            p.set(x as i32, -1, *v);
        }
        for (y, v) in left.iter().enumerate() {
            p.set(-1, y as i32, *v);
        }
        p
    }

    #[test]
    fn test_4x4_vertical_horizontal() {
        let p = refs_4x4([10, 20, 30, 40, 0, 0, 0, 0], [50, 60, 70, 80], 5);
        let pred = predict_4x4(0, IntraLumaMxMMode::Vertical, &p, 8).unwrap();
        for row in pred {
            assert_eq!(row, [10, 20, 30, 40]);
        }
        let pred = predict_4x4(0, IntraLumaMxMMode::Horizontal, &p, 8).unwrap();
        for (y, row) in pred.iter().enumerate() {
            assert_eq!(*row, [[50; 4], [60; 4], [70; 4], [80; 4]][y]);
        }
    }

    #[test]
    fn test_4x4_dc_variants() {
        // 全可用: (10+20+30+40 + 50+60+70+80 + 4) >> 3 = 45
        let p = refs_4x4([10, 20, 30, 40, 0, 0, 0, 0], [50, 60, 70, 80], 5);
        let pred = predict_4x4(0, IntraLumaMxMMode::Dc, &p, 8).unwrap();
        assert_eq!(pred[0][0], 45);

        // 仅左侧: (50+60+70+80 + 2) >> 2 = 65
        let mut p = RefSamples::new(4, 4);
        for (y, v) in [50, 60, 70, 80].iter().enumerate() {
            p.set(-1, y as i32, *v);
        }
        let pred = predict_4x4(0, IntraLumaMxMMode::Dc, &p, 8).unwrap();
        assert_eq!(pred[2][2], 65);

        // 无邻居: 1 << 7 = 128
        let p = RefSamples::new(4, 4);
        let pred = predict_4x4(0, IntraLumaMxMMode::Dc, &p, 8).unwrap();
        assert_eq!(pred[0][0], 128, "无邻居时 DC 应回退到位深中值");
        let pred = predict_4x4(0, IntraLumaMxMMode::Dc, &p, 10).unwrap();
        assert_eq!(pred[0][0], 512);
    }

    #[test]
    fn test_4x4_directional_requires_refs() {
        // 仅上方 4 样本: DDL 需要 8 个, 应报参考样本缺失
        let mut p = RefSamples::new(4, 4);
        for x in 0..4 {
            p.set(x, -1, 10);
        }
        assert!(matches!(
            predict_4x4(7, IntraLumaMxMMode::DiagDownLeft, &p, 8),
            Err(MbError::SamplesUnavailable { mb_addr: 7, .. })
        ));
        assert!(matches!(
            predict_4x4(7, IntraLumaMxMMode::DiagDownRight, &p, 8),
            Err(MbError::SamplesUnavailable { .. })
        ));
    }

    #[test]
    fn test_4x4_diag_down_left_flat() {
        let p = refs_4x4([7; 8], [7; 4], 7);
        let pred = predict_4x4(0, IntraLumaMxMMode::DiagDownLeft, &p, 8).unwrap();
        for row in pred {
            assert_eq!(row, [7; 4], "平坦参考下 DDL 预测应平坦");
        }
    }

    #[test]
    fn test_4x4_diag_down_right_diagonal() {
        // x == y 使用角样本: (p[0,-1] + 2*p[-1,-1] + p[-1,0] + 2) >> 2
        let p = refs_4x4([20, 20, 20, 20, 0, 0, 0, 0], [40, 40, 40, 40], 60);
        let pred = predict_4x4(0, IntraLumaMxMMode::DiagDownRight, &p, 8).unwrap();
        let diag = (20 + 2 * 60 + 40 + 2) >> 2;
        for i in 0..4 {
            assert_eq!(pred[i][i], diag);
        }
        // x > y 只用上方样本
        assert_eq!(pred[0][2], 20);
        // x < y 只用左侧样本
        assert_eq!(pred[2][0], 40);
    }

    #[test]
    fn test_4x4_horizontal_up_tail() {
        let p = refs_4x4([0; 8], [10, 20, 30, 40], 0);
        let pred = predict_4x4(0, IntraLumaMxMMode::HorizontalUp, &p, 8).unwrap();
        // zHU = 5: (p[-1,2] + 3*p[-1,3] + 2) >> 2 = (30 + 120 + 2) >> 2 = 38
        assert_eq!(pred[2][1], 38);
        // zHU > 5: p[-1,3]
        assert_eq!(pred[3][3], 40);
        assert_eq!(pred[3][2], 40);
    }

    #[test]
    fn test_8x8_dc_with_filter() {
        // 平坦参考带经过滤后仍平坦, DC = 样本值
        let mut p = RefSamples::new(8, 8);
        p.set(-1, -1, 99);
        for x in 0..16 {
            p.set(x, -1, 99);
        }
        for y in 0..8 {
            p.set(-1, y, 99);
        }
        let pred = predict_8x8(0, IntraLumaMxMMode::Dc, &p, 8).unwrap();
        for row in pred {
            assert_eq!(row, [99; 8]);
        }
    }

    #[test]
    fn test_8x8_dc_no_neighbors() {
        let p = RefSamples::new(8, 8);
        let pred = predict_8x8(0, IntraLumaMxMMode::Dc, &p, 8).unwrap();
        assert_eq!(pred[4][4], 128);
    }

    #[test]
    fn test_8x8_vertical_flat() {
        let mut p = RefSamples::new(8, 8);
        for x in 0..16 {
            p.set(x, -1, 77);
        }
        let pred = predict_8x8(0, IntraLumaMxMMode::Vertical, &p, 8).unwrap();
        for row in pred {
            assert_eq!(row, [77; 8], "平坦上方参考经过滤后垂直预测应平坦");
        }
    }

    #[test]
    fn test_16x16_plane_flat() {
        let mut p = RefSamples::new(16, 16);
        p.set(-1, -1, 100);
        for x in 0..16 {
            p.set(x, -1, 100);
        }
        for y in 0..16 {
            p.set(-1, y, 100);
        }
        let pred = predict_16x16(0, Intra16x16Mode::Plane, &p, 8).unwrap();
        for row in pred {
            assert_eq!(row, [100; 16], "平坦参考下 Plane 预测应平坦");
        }
    }

    #[test]
    fn test_16x16_plane_gradient_clipped() {
        // 线性渐变参考, 预测值应落在位深范围内
        let mut p = RefSamples::new(16, 16);
        p.set(-1, -1, 0);
        for x in 0..16 {
            p.set(x, -1, x * 16);
        }
        for y in 0..16 {
            p.set(-1, y, y * 16);
        }
        let pred = predict_16x16(0, Intra16x16Mode::Plane, &p, 8).unwrap();
        for row in &pred {
            for &v in row {
                assert!((0..=255).contains(&v), "Plane 预测值 {v} 超出位深范围");
            }
        }
        // 渐变方向单调
        assert!(pred[0][15] > pred[0][0]);
        assert!(pred[15][0] > pred[0][0]);
    }

    #[test]
    fn test_16x16_dc_fallbacks() {
        let p = RefSamples::new(16, 16);
        let pred = predict_16x16(0, Intra16x16Mode::Dc, &p, 8).unwrap();
        assert_eq!(pred[0][0], 128);

        let mut p = RefSamples::new(16, 16);
        for x in 0..16 {
            p.set(x, -1, 64);
        }
        let pred = predict_16x16(0, Intra16x16Mode::Dc, &p, 8).unwrap();
        assert_eq!(pred[8][8], 64);
    }

    #[test]
    fn test_chroma_dc_positional() {
        // 仅上方可用: 子块 (4,0) 取上方, 子块 (0,4) 回退到上方
        let mut p = RefSamples::new(8, 8);
        for x in 0..8 {
            p.set(x, -1, if x < 4 { 40 } else { 80 });
        }
        let pred =
            predict_chroma(0, IntraChromaMode::Dc, ChromaFormat::Yuv420, &p, 8).unwrap();
        assert_eq!(pred[0][0], 40);
        assert_eq!(pred[0][4], 80);
        assert_eq!(pred[4][0], 40, "左列下方子块无左参考时回退到上方");
        assert_eq!(pred[4][4], 80);
    }

    #[test]
    fn test_chroma_dc_no_neighbors() {
        let p = RefSamples::new(8, 8);
        let pred =
            predict_chroma(0, IntraChromaMode::Dc, ChromaFormat::Yuv420, &p, 8).unwrap();
        for y in 0..8 {
            assert_eq!(pred[y][0], 128);
        }
    }

    #[test]
    fn test_chroma_plane_flat_422() {
        // 4:2:2 色度块为 8x16
        let mut p = RefSamples::new(8, 16);
        p.set(-1, -1, 90);
        for x in 0..8 {
            p.set(x, -1, 90);
        }
        for y in 0..16 {
            p.set(-1, y, 90);
        }
        let pred =
            predict_chroma(0, IntraChromaMode::Plane, ChromaFormat::Yuv422, &p, 8).unwrap();
        for y in 0..16 {
            assert_eq!(pred[y], [90; 8], "第 {y} 行应平坦");
        }
    }

    #[test]
    fn test_chroma_unsupported_444() {
        let p = RefSamples::new(16, 16);
        assert!(matches!(
            predict_chroma(0, IntraChromaMode::Dc, ChromaFormat::Yuv444, &p, 8),
            Err(MbError::Unsupported(_))
        ));
    }

    #[test]
    fn test_decode_pcm() {
        // 8 比特样本, 对齐后逐字节读取
        let cfg = CoreConfig::default();
        let total = 256 + 2 * 64;
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let mut br = BitReader::new(&data);
        let pcm = decode_pcm(&mut br, &cfg).unwrap();
        assert_eq!(pcm.luma.len(), 256);
        assert_eq!(pcm.cb.len(), 64);
        assert_eq!(pcm.cr.len(), 64);
        assert_eq!(pcm.luma[0], 0);
        assert_eq!(pcm.luma[255], 255 % 251);
        assert_eq!(pcm.cb[0], 256 % 251);
    }

    #[test]
    fn test_mode_from_index() {
        assert_eq!(
            IntraLumaMxMMode::from_index(8),
            Some(IntraLumaMxMMode::HorizontalUp)
        );
        assert_eq!(IntraLumaMxMMode::from_index(9), None);
        assert_eq!(Intra16x16Mode::from_index(3), Some(Intra16x16Mode::Plane));
        assert_eq!(IntraChromaMode::from_index(0), Some(IntraChromaMode::Dc));
        for i in 0..9 {
            let m = IntraLumaMxMMode::from_index(i).unwrap();
            assert_eq!(m.index(), i, "模式索引应与构造值一致");
        }
    }
}
