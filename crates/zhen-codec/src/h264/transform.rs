//! 逆扫描, 反量化与整数变换 (ITU-T H.264 条款 8.5).
//!
//! 4x4 / 8x8 残差块的 zig-zag 逆扫描, 按 qP 查表反量化, 以及无乘法的
//! 蝶形逆变换. Intra_16x16 亮度 DC 与色度 DC 走各自的 Hadamard 路径.
//! 编码方向提供 4x4 正变换与量化, 与解码方向构成有界误差的往返.
//!
//! LevelScale 表已折入平坦缩放矩阵的权重 16, 与 (qP/6 - 4) 形式的
//! 移位公式配套.

use super::common::clip3;

/// 4x4 残差块
pub type Block4x4 = [[i32; 4]; 4];
/// 8x8 残差块
pub type Block8x8 = [[i32; 8]; 8];

// ============================================================
// 扫描表
// ============================================================

/// 4x4 zig-zag 扫描: 下标为光栅序, 值为扫描序位置
#[rustfmt::skip]
pub const ZIGZAG_SCAN_4X4: [usize; 16] = [
     0,  1,  5,  6,
     2,  4,  7, 10,
     3,  8,  9, 11,
    12, 13, 14, 15,
];

/// 8x8 zig-zag 扫描: 下标为光栅序, 值为扫描序位置
#[rustfmt::skip]
pub const ZIGZAG_SCAN_8X8: [usize; 64] = [
     0,  1,  5,  6, 14, 15, 27, 28,
     2,  4,  7, 13, 16, 26, 29, 42,
     3,  8, 12, 17, 25, 30, 41, 43,
     9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// 扫描序系数表 -> 4x4 光栅矩阵
pub fn inverse_scan_4x4(list: &[i32; 16]) -> Block4x4 {
    let mut block = [[0i32; 4]; 4];
    for r in 0..16 {
        block[r / 4][r % 4] = list[ZIGZAG_SCAN_4X4[r]];
    }
    block
}

/// 4x4 光栅矩阵 -> 扫描序系数表
pub fn scan_4x4(block: &Block4x4) -> [i32; 16] {
    let mut list = [0i32; 16];
    for r in 0..16 {
        list[ZIGZAG_SCAN_4X4[r]] = block[r / 4][r % 4];
    }
    list
}

/// 扫描序系数表 -> 8x8 光栅矩阵
pub fn inverse_scan_8x8(list: &[i32; 64]) -> Block8x8 {
    let mut block = [[0i32; 8]; 8];
    for r in 0..64 {
        block[r / 8][r % 8] = list[ZIGZAG_SCAN_8X8[r]];
    }
    block
}

/// CAVLC 的 4 个交错 4x4 子表 -> 8x8 扫描序系数表 (8.5.6)
///
/// 子表 i 的第 k 个系数落在 8x8 扫描位置 4k + i.
pub fn interleave_8x8_coeffs(lists: &[[i32; 16]; 4]) -> [i32; 64] {
    let mut combined = [0i32; 64];
    for (i, list) in lists.iter().enumerate() {
        for (k, &v) in list.iter().enumerate() {
            combined[4 * k + i] = v;
        }
    }
    combined
}

// ============================================================
// LevelScale 表 (权重 16 已折入)
// ============================================================

#[rustfmt::skip]
const LEVEL_SCALE_4X4: [[[i32; 4]; 4]; 6] = [
    [[160, 208, 160, 208], [208, 256, 208, 256], [160, 208, 160, 208], [208, 256, 208, 256]],
    [[176, 224, 176, 224], [224, 288, 224, 288], [176, 224, 176, 224], [224, 288, 224, 288]],
    [[208, 256, 208, 256], [256, 320, 256, 320], [208, 256, 208, 256], [256, 320, 256, 320]],
    [[224, 288, 224, 288], [288, 368, 288, 368], [224, 288, 224, 288], [288, 368, 288, 368]],
    [[256, 320, 256, 320], [320, 400, 320, 400], [256, 320, 256, 320], [320, 400, 320, 400]],
    [[288, 368, 288, 368], [368, 464, 368, 464], [288, 368, 288, 368], [368, 464, 368, 464]],
];

/// 色度 DC 反量化只用 (0, 0) 位置
#[rustfmt::skip]
const LEVEL_SCALE_2X2: [[[i32; 2]; 2]; 6] = [
    [[160, 208], [208, 256]],
    [[176, 224], [224, 288]],
    [[208, 256], [256, 320]],
    [[224, 288], [288, 368]],
    [[256, 320], [320, 400]],
    [[288, 368], [368, 464]],
];

/// normAdjust8x8 的 6 个等价类取值 (权重 16 已折入)
#[rustfmt::skip]
const LEVEL_SCALE_8X8_CLASSES: [[i32; 6]; 6] = [
    [320, 288, 512, 304, 400, 384],
    [352, 304, 560, 336, 448, 416],
    [416, 368, 672, 384, 528, 496],
    [448, 400, 720, 416, 560, 528],
    [512, 448, 816, 480, 640, 608],
    [576, 512, 928, 544, 736, 688],
];

/// LevelScale8x8, 位置按 (i % 4, j % 4) 归入 6 个等价类 (8.5.9)
fn level_scale_8x8(m: usize, i: usize, j: usize) -> i32 {
    let class = if i % 4 == 0 && j % 4 == 0 {
        0
    } else if i % 2 == 1 && j % 2 == 1 {
        1
    } else if i % 4 == 2 && j % 4 == 2 {
        2
    } else if (i % 4 == 0 && j % 2 == 1) || (i % 2 == 1 && j % 4 == 0) {
        3
    } else if (i % 4 == 0 && j % 4 == 2) || (i % 4 == 2 && j % 4 == 0) {
        4
    } else {
        5
    };
    LEVEL_SCALE_8X8_CLASSES[m][class]
}

// ============================================================
// 4x4 反量化与逆变换 (8.5.12)
// ============================================================

/// 4x4 残差反量化 (8.5.12.1)
///
/// `dc_exempt` 对应亮度 Intra_16x16 或色度块: (0, 0) 位置的 DC 已在
/// 专用路径反量化, 这里原样透传.
pub fn scale_residual_4x4(qp: i32, c: &Block4x4, dc_exempt: bool) -> Block4x4 {
    let m = (qp % 6) as usize;
    let mut d = [[0i32; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            if i == 0 && j == 0 && dc_exempt {
                d[0][0] = c[0][0];
            } else if qp >= 24 {
                d[i][j] = (c[i][j] * LEVEL_SCALE_4X4[m][i][j]) << (qp / 6 - 4);
            } else {
                d[i][j] = (c[i][j] * LEVEL_SCALE_4X4[m][i][j] + (1 << (3 - qp / 6)))
                    >> (4 - qp / 6);
            }
        }
    }
    d
}

/// 4x4 整数逆变换 (8.5.12.2), 先水平后垂直, 末端 (x + 32) >> 6
pub fn idct_4x4(d: &Block4x4) -> Block4x4 {
    let mut f = [[0i32; 4]; 4];
    for i in 0..4 {
        let e0 = d[i][0] + d[i][2];
        let e1 = d[i][0] - d[i][2];
        let e2 = (d[i][1] >> 1) - d[i][3];
        let e3 = d[i][1] + (d[i][3] >> 1);
        f[i][0] = e0 + e3;
        f[i][1] = e1 + e2;
        f[i][2] = e1 - e2;
        f[i][3] = e0 - e3;
    }

    let mut r = [[0i32; 4]; 4];
    for j in 0..4 {
        let g0 = f[0][j] + f[2][j];
        let g1 = f[0][j] - f[2][j];
        let g2 = (f[1][j] >> 1) - f[3][j];
        let g3 = f[1][j] + (f[3][j] >> 1);
        r[0][j] = g0 + g3;
        r[1][j] = g1 + g2;
        r[2][j] = g1 - g2;
        r[3][j] = g0 - g3;
    }

    for row in &mut r {
        for v in row.iter_mut() {
            *v = (*v + 32) >> 6;
        }
    }
    r
}

/// 4x4 残差块反量化 + 逆变换; 旁路模式直接透传系数
pub fn inverse_transform_4x4(qp: i32, c: &Block4x4, dc_exempt: bool, bypass: bool) -> Block4x4 {
    if bypass {
        return *c;
    }
    idct_4x4(&scale_residual_4x4(qp, c, dc_exempt))
}

// ============================================================
// Intra_16x16 亮度 DC (8.5.10)
// ============================================================

/// 4x4 Hadamard 变换 (先水平后垂直, 无缩放)
fn hadamard_4x4(c: &Block4x4) -> Block4x4 {
    let mut t = [[0i32; 4]; 4];
    for i in 0..4 {
        let s0 = c[i][0] + c[i][2];
        let s1 = c[i][0] - c[i][2];
        let s2 = c[i][1] - c[i][3];
        let s3 = c[i][1] + c[i][3];
        t[i][0] = s0 + s3;
        t[i][1] = s1 + s2;
        t[i][2] = s1 - s2;
        t[i][3] = s0 - s3;
    }
    let mut f = [[0i32; 4]; 4];
    for j in 0..4 {
        let s0 = t[0][j] + t[2][j];
        let s1 = t[0][j] - t[2][j];
        let s2 = t[1][j] - t[3][j];
        let s3 = t[1][j] + t[3][j];
        f[0][j] = s0 + s3;
        f[1][j] = s1 + s2;
        f[2][j] = s1 - s2;
        f[3][j] = s0 - s3;
    }
    f
}

/// Intra_16x16 亮度 DC 的 Hadamard 逆变换与反量化 (8.5.10)
///
/// 输出矩阵的 (i, j) 元素是第 4*i + j 个 4x4 亮度块的 DC 系数.
pub fn transform_intra16x16_dc(qp: i32, c: &Block4x4, bypass: bool) -> Block4x4 {
    if bypass {
        return *c;
    }
    let f = hadamard_4x4(c);
    let scale = LEVEL_SCALE_4X4[(qp % 6) as usize][0][0];
    let mut dc = [[0i32; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            if qp >= 36 {
                dc[i][j] = (f[i][j] * scale) << (qp / 6 - 6);
            } else {
                dc[i][j] = (f[i][j] * scale + (1 << (5 - qp / 6))) >> (6 - qp / 6);
            }
        }
    }
    dc
}

// ============================================================
// 色度 DC (8.5.11)
// ============================================================

/// 4:2:0 色度 DC 的 2x2 Hadamard 逆变换与反量化
pub fn transform_chroma_dc_420(qp: i32, c: &[[i32; 2]; 2], bypass: bool) -> [[i32; 2]; 2] {
    if bypass {
        return *c;
    }
    let f = [
        [
            c[0][0] + c[0][1] + c[1][0] + c[1][1],
            c[0][0] - c[0][1] + c[1][0] - c[1][1],
        ],
        [
            c[0][0] + c[0][1] - c[1][0] - c[1][1],
            c[0][0] - c[0][1] - c[1][0] + c[1][1],
        ],
    ];
    let scale = LEVEL_SCALE_2X2[(qp % 6) as usize][0][0];
    let mut dc = [[0i32; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            dc[i][j] = ((f[i][j] * scale) << (qp / 6)) >> 5;
        }
    }
    dc
}

/// 4:2:2 色度 DC 的 2x4 变换与反量化, DC 专用 qP 为 qP + 3
pub fn transform_chroma_dc_422(qp: i32, c: &[[i32; 2]; 4], bypass: bool) -> [[i32; 2]; 4] {
    if bypass {
        return *c;
    }
    // f = H4 * c * H2
    const H4: [[i32; 4]; 4] = [
        [1, 1, 1, 1],
        [1, 1, -1, -1],
        [1, -1, -1, 1],
        [1, -1, 1, -1],
    ];
    let mut g = [[0i32; 2]; 4];
    for i in 0..4 {
        for j in 0..2 {
            g[i][j] = (0..4).map(|k| H4[i][k] * c[k][j]).sum();
        }
    }
    let mut f = [[0i32; 2]; 4];
    for i in 0..4 {
        f[i][0] = g[i][0] + g[i][1];
        f[i][1] = g[i][0] - g[i][1];
    }

    let qp_dc = qp + 3;
    let scale = LEVEL_SCALE_2X2[(qp_dc % 6) as usize][0][0];
    let mut dc = [[0i32; 2]; 4];
    for i in 0..4 {
        for j in 0..2 {
            dc[i][j] = ((f[i][j] * scale) << (qp_dc / 6)) >> 5;
        }
    }
    dc
}

// ============================================================
// 8x8 反量化与逆变换 (8.5.12.3)
// ============================================================

/// 8x8 残差反量化
pub fn scale_residual_8x8(qp: i32, c: &Block8x8) -> Block8x8 {
    let m = (qp % 6) as usize;
    let mut d = [[0i32; 8]; 8];
    for i in 0..8 {
        for j in 0..8 {
            if qp >= 36 {
                d[i][j] = (c[i][j] * level_scale_8x8(m, i, j)) << (qp / 6 - 6);
            } else {
                d[i][j] = (c[i][j] * level_scale_8x8(m, i, j) + (1 << (5 - qp / 6)))
                    >> (6 - qp / 6);
            }
        }
    }
    d
}

fn idct_8x8_pass(d: &Block8x8) -> Block8x8 {
    let mut out = [[0i32; 8]; 8];
    for i in 0..8 {
        let e0 = d[i][0] + d[i][4];
        let e1 = -d[i][3] + d[i][5] - d[i][7] - (d[i][7] >> 1);
        let e2 = d[i][0] - d[i][4];
        let e3 = d[i][1] + d[i][7] - d[i][3] - (d[i][3] >> 1);
        let e4 = (d[i][2] >> 1) - d[i][6];
        let e5 = -d[i][1] + d[i][7] + d[i][5] + (d[i][5] >> 1);
        let e6 = d[i][2] + (d[i][6] >> 1);
        let e7 = d[i][3] + d[i][5] + d[i][1] + (d[i][1] >> 1);

        let f0 = e0 + e6;
        let f1 = e1 + (e7 >> 2);
        let f2 = e2 + e4;
        let f3 = e3 + (e5 >> 2);
        let f4 = e2 - e4;
        let f5 = (e3 >> 2) - e5;
        let f6 = e0 - e6;
        let f7 = e7 - (e1 >> 2);

        out[i][0] = f0 + f7;
        out[i][1] = f2 + f5;
        out[i][2] = f4 + f3;
        out[i][3] = f6 + f1;
        out[i][4] = f6 - f1;
        out[i][5] = f4 - f3;
        out[i][6] = f2 - f5;
        out[i][7] = f0 - f7;
    }
    out
}

fn transpose_8x8(d: &Block8x8) -> Block8x8 {
    let mut t = [[0i32; 8]; 8];
    for i in 0..8 {
        for j in 0..8 {
            t[j][i] = d[i][j];
        }
    }
    t
}

/// 8x8 整数逆变换, 行列两趟同构蝶形, 末端 (x + 32) >> 6
pub fn idct_8x8(d: &Block8x8) -> Block8x8 {
    let rows = idct_8x8_pass(d);
    let mut r = transpose_8x8(&idct_8x8_pass(&transpose_8x8(&rows)));
    for row in &mut r {
        for v in row.iter_mut() {
            *v = (*v + 32) >> 6;
        }
    }
    r
}

/// 8x8 残差块反量化 + 逆变换; 旁路模式直接透传系数
pub fn inverse_transform_8x8(qp: i32, c: &Block8x8, bypass: bool) -> Block8x8 {
    if bypass {
        return *c;
    }
    idct_8x8(&scale_residual_8x8(qp, c))
}

// ============================================================
// 编码方向: 4x4 正变换与量化
// ============================================================

/// 量化乘数表, 行按 qP % 6, 三列对应 4x4 位置等价类 (a, b, c)
#[rustfmt::skip]
const QUANT_MF: [[i32; 3]; 6] = [
    [13107, 5243, 8066],
    [11916, 4660, 7490],
    [10082, 4194, 6554],
    [ 9362, 3647, 5825],
    [ 8192, 3355, 5243],
    [ 7282, 2893, 4559],
];

fn quant_mf(m: usize, i: usize, j: usize) -> i32 {
    let class = if i % 2 == 0 && j % 2 == 0 {
        0
    } else if i % 2 == 1 && j % 2 == 1 {
        1
    } else {
        2
    };
    QUANT_MF[m][class]
}

/// 4x4 整数正变换, 行列两趟蝶形 (逆变换的伴随)
pub fn forward_transform_4x4(x: &Block4x4) -> Block4x4 {
    let mut t = [[0i32; 4]; 4];
    for i in 0..4 {
        let s0 = x[i][0] + x[i][3];
        let s1 = x[i][1] + x[i][2];
        let s2 = x[i][1] - x[i][2];
        let s3 = x[i][0] - x[i][3];
        t[i][0] = s0 + s1;
        t[i][1] = 2 * s3 + s2;
        t[i][2] = s0 - s1;
        t[i][3] = s3 - 2 * s2;
    }
    let mut w = [[0i32; 4]; 4];
    for j in 0..4 {
        let s0 = t[0][j] + t[3][j];
        let s1 = t[1][j] + t[2][j];
        let s2 = t[1][j] - t[2][j];
        let s3 = t[0][j] - t[3][j];
        w[0][j] = s0 + s1;
        w[1][j] = 2 * s3 + s2;
        w[2][j] = s0 - s1;
        w[3][j] = s3 - 2 * s2;
    }
    w
}

/// 变换系数量化, 与 `scale_residual_4x4` 互逆 (有界舍入误差)
pub fn quantize_4x4(qp: i32, w: &Block4x4, dc_exempt: bool) -> Block4x4 {
    let m = (qp % 6) as usize;
    let qbits = 15 + qp / 6;
    // 帧内偏置 2^qbits / 3
    let f = (1i64 << qbits) / 3;
    let mut z = [[0i32; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            if i == 0 && j == 0 && dc_exempt {
                z[0][0] = w[0][0];
                continue;
            }
            let level = ((i64::from(w[i][j].abs()) * i64::from(quant_mf(m, i, j)) + f)
                >> qbits) as i32;
            z[i][j] = if w[i][j] < 0 { -level } else { level };
        }
    }
    z
}

/// 4x4 残差正变换 + 量化; 旁路模式直接透传
pub fn forward_transform_quantize_4x4(
    qp: i32,
    x: &Block4x4,
    dc_exempt: bool,
    bypass: bool,
) -> Block4x4 {
    if bypass {
        return *x;
    }
    quantize_4x4(qp, &forward_transform_4x4(x), dc_exempt)
}

/// 重建样本: 预测 + 残差后按位深裁剪
pub fn reconstruct(pred: i32, residual: i32, bit_depth: u8) -> i32 {
    clip3(0, (1 << bit_depth) - 1, pred + residual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_4x4_roundtrip() {
        let mut list = [0i32; 16];
        for (i, v) in list.iter_mut().enumerate() {
            *v = i as i32 + 1;
        }
        let block = inverse_scan_4x4(&list);
        // 扫描位置 2 对应光栅 (1, 0)
        assert_eq!(block[1][0], 3);
        assert_eq!(block[0][2], 6, "扫描位置 5 对应光栅 (0, 2)");
        assert_eq!(scan_4x4(&block), list);
    }

    #[test]
    fn test_zigzag_8x8_is_permutation() {
        let mut seen = [false; 64];
        for &pos in &ZIGZAG_SCAN_8X8 {
            assert!(!seen[pos], "扫描位置 {pos} 重复");
            seen[pos] = true;
        }
        // 对角线走向: 扫描位置 2 在光栅 (1, 0), 位置 3 在 (2, 0)
        assert_eq!(ZIGZAG_SCAN_8X8[8], 2);
        assert_eq!(ZIGZAG_SCAN_8X8[16], 3);
        assert_eq!(ZIGZAG_SCAN_8X8[9], 4);
    }

    #[test]
    fn test_interleave_8x8() {
        let mut lists = [[0i32; 16]; 4];
        for (i, list) in lists.iter_mut().enumerate() {
            for (k, v) in list.iter_mut().enumerate() {
                *v = (i * 100 + k) as i32;
            }
        }
        let combined = interleave_8x8_coeffs(&lists);
        assert_eq!(combined[0], 0, "子表 0 的首系数是 8x8 扫描首位");
        assert_eq!(combined[1], 100);
        assert_eq!(combined[4], 1);
        assert_eq!(combined[63], 315);
    }

    #[test]
    fn test_scale_4x4_low_qp() {
        let mut c = [[0i32; 4]; 4];
        c[0][0] = 64;
        let d = scale_residual_4x4(0, &c, false);
        // (64 * 160 + 8) >> 4 = 640
        assert_eq!(d[0][0], 640);
        assert_eq!(d[1][1], 0);
    }

    #[test]
    fn test_scale_4x4_dc_exempt() {
        let mut c = [[0i32; 4]; 4];
        c[0][0] = 7;
        c[0][1] = 1;
        let d = scale_residual_4x4(28, &c, true);
        assert_eq!(d[0][0], 7, "DC 豁免位置应透传");
        // qP = 28: (1 * 320) << 0
        assert_eq!(d[0][1], 320);
    }

    #[test]
    fn test_idct_4x4_dc_only() {
        let mut d = [[0i32; 4]; 4];
        d[0][0] = 640;
        let r = idct_4x4(&d);
        for row in &r {
            for &v in row {
                assert_eq!(v, 10, "DC 640 经逆变换应得到平坦的 10");
            }
        }
    }

    #[test]
    fn test_inverse_transform_bypass() {
        let mut c = [[0i32; 4]; 4];
        c[2][3] = -9;
        assert_eq!(inverse_transform_4x4(30, &c, false, true), c);
    }

    #[test]
    fn test_forward_inverse_flat_exact() {
        // 平坦残差只有 DC 分量, qP = 0 下整条链路无损
        let x: Block4x4 = [[10; 4]; 4];
        let z = forward_transform_quantize_4x4(0, &x, false, false);
        let r = inverse_transform_4x4(0, &z, false, false);
        assert_eq!(r, x);
    }

    #[test]
    fn test_forward_inverse_roundtrip_bounded() {
        // qP = 0 下量化舍入 (帧内偏置 1/3) 逐系数累积,
        // 每样本重建误差不超过 4
        let x: Block4x4 = [
            [12, -3, 0, 7],
            [5, 5, -8, 1],
            [0, 19, 2, -4],
            [-6, 3, 11, 0],
        ];
        let z = forward_transform_quantize_4x4(0, &x, false, false);
        let r = inverse_transform_4x4(0, &z, false, false);
        for i in 0..4 {
            for j in 0..4 {
                let err = (r[i][j] - x[i][j]).abs();
                assert!(err <= 4, "位置 ({i}, {j}) 误差 {err} 超出舍入界");
            }
        }
    }

    #[test]
    fn test_intra16x16_dc_flat() {
        let mut c = [[0i32; 4]; 4];
        c[0][0] = 16;
        let dc = transform_intra16x16_dc(10, &c, false);
        // Hadamard 后全 16, (16 * 256 + 16) >> 5 = 128
        for row in &dc {
            for &v in row {
                assert_eq!(v, 128);
            }
        }
    }

    #[test]
    fn test_chroma_dc_420() {
        let c = [[8, 0], [0, 0]];
        let dc = transform_chroma_dc_420(0, &c, false);
        // f 全 8, (8 * 160) >> 5 = 40
        assert_eq!(dc, [[40, 40], [40, 40]]);
    }

    #[test]
    fn test_chroma_dc_422_uses_qp_offset() {
        let mut c = [[0i32; 2]; 4];
        c[0][0] = 4;
        // qP = 27 -> qPDC = 30: ((4 * 160) << 5) >> 5 = 640
        let dc = transform_chroma_dc_422(27, &c, false);
        for row in &dc {
            for &v in row {
                assert_eq!(v, 640);
            }
        }
    }

    #[test]
    fn test_scale_idct_8x8_dc_only() {
        let mut c = [[0i32; 8]; 8];
        c[0][0] = 64;
        let d = scale_residual_8x8(0, &c);
        // (64 * 320 + 32) >> 6 = 320
        assert_eq!(d[0][0], 320);
        let r = idct_8x8(&d);
        for row in &r {
            for &v in row {
                assert_eq!(v, 5, "DC 320 经 8x8 逆变换应得到平坦的 5");
            }
        }
    }

    #[test]
    fn test_level_scale_8x8_classes() {
        // (0,0) 类, (1,1) 类与 (2,2) 类取不同的 normAdjust 值
        assert_eq!(level_scale_8x8(0, 0, 0), 320);
        assert_eq!(level_scale_8x8(0, 1, 1), 288);
        assert_eq!(level_scale_8x8(0, 2, 2), 512);
        assert_eq!(level_scale_8x8(0, 0, 1), 304);
        assert_eq!(level_scale_8x8(0, 0, 2), 400);
        assert_eq!(level_scale_8x8(0, 1, 2), 384);
        assert_eq!(level_scale_8x8(0, 4, 4), 320, "等价类按模 4 周期重复");
    }

    #[test]
    fn test_reconstruct_clips() {
        assert_eq!(reconstruct(250, 20, 8), 255);
        assert_eq!(reconstruct(5, -20, 8), 0);
        assert_eq!(reconstruct(100, 13, 8), 113);
    }
}
