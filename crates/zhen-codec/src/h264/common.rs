//! H.264 通用工具函数.
//!
//! Exp-Golomb 读取, 取值裁剪, QP 映射等跨模块共用的小工具.

use zhen_core::{BitReader, ZhenError, ZhenResult};

// ============================================================
// Exp-Golomb
// ============================================================

/// 读取无符号 Exp-Golomb
pub fn read_ue(br: &mut BitReader) -> ZhenResult<u32> {
    let mut zeros = 0u32;
    loop {
        let bit = br.read_bit()?;
        if bit == 1 {
            break;
        }
        zeros += 1;
        if zeros > 31 {
            return Err(ZhenError::InvalidData("Exp-Golomb 前导零过多".into()));
        }
    }
    if zeros == 0 {
        return Ok(0);
    }
    let suffix = br.read_bits(zeros)?;
    Ok((1 << zeros) - 1 + suffix)
}

/// 读取有符号 Exp-Golomb
pub fn read_se(br: &mut BitReader) -> ZhenResult<i32> {
    let code = read_ue(br)?;
    let value = code.div_ceil(2) as i32;
    if code & 1 == 0 { Ok(-value) } else { Ok(value) }
}

// ============================================================
// 取值裁剪
// ============================================================

/// Clip3(a, b, x)
pub fn clip3(a: i32, b: i32, x: i32) -> i32 {
    x.clamp(a, b)
}

/// Clip1 按位深裁剪: Clip3(0, (1 << bit_depth) - 1, x)
pub fn clip1(x: i32, bit_depth: u8) -> i32 {
    clip3(0, (1 << bit_depth) - 1, x)
}

// ============================================================
// 整数除法
// ============================================================

pub(super) fn floor_div(v: i32, d: i32) -> i32 {
    let mut q = v / d;
    let r = v % d;
    if r != 0 && ((r > 0) != (d > 0)) {
        q -= 1;
    }
    q
}

pub(super) fn mod_floor(v: i32, d: i32) -> i32 {
    let r = v % d;
    if r < 0 { r + d } else { r }
}

// ============================================================
// QP 映射
// ============================================================

/// QP 按 H.264 规则做 0..51 环绕.
pub fn wrap_qp(qp: i64) -> i32 {
    let m = 52i64;
    ((qp % m + m) % m) as i32
}

/// Luma QP → Chroma QP 映射 (H.264 Table 8-15)
pub fn chroma_qp_from_luma_with_offset(qp: i32, offset: i32) -> i32 {
    let qpc = (qp + offset).clamp(0, 51);
    CHROMA_QP_TABLE[qpc as usize]
}

/// Chroma QP 映射表 (H.264 Table 8-15)
#[rustfmt::skip]
const CHROMA_QP_TABLE: [i32; 52] = [
     0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15,
    16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 29, 30,
    31, 32, 32, 33, 34, 34, 35, 35, 36, 36, 37, 37, 37, 38, 38, 38,
    39, 39, 39, 39,
];

#[cfg(test)]
mod tests {
    use super::*;
    use zhen_core::BitReader;

    #[test]
    fn test_read_ue() {
        // 1 -> 0, 010 -> 1, 011 -> 2, 00100 -> 3
        let data = [0b10100110, 0b01000000];
        let mut br = BitReader::new(&data);
        assert_eq!(read_ue(&mut br).unwrap(), 0);
        assert_eq!(read_ue(&mut br).unwrap(), 1);
        assert_eq!(read_ue(&mut br).unwrap(), 2);
        assert_eq!(read_ue(&mut br).unwrap(), 3);
    }

    #[test]
    fn test_read_se() {
        // ue 码字 0,1,2,3,4 对应 se 值 0,1,-1,2,-2
        let data = [0b10100110, 0b01000010, 0b10000000];
        let mut br = BitReader::new(&data);
        assert_eq!(read_se(&mut br).unwrap(), 0);
        assert_eq!(read_se(&mut br).unwrap(), 1);
        assert_eq!(read_se(&mut br).unwrap(), -1);
        assert_eq!(read_se(&mut br).unwrap(), 2);
        assert_eq!(read_se(&mut br).unwrap(), -2);
    }

    #[test]
    fn test_clip1() {
        assert_eq!(clip1(-5, 8), 0);
        assert_eq!(clip1(300, 8), 255);
        assert_eq!(clip1(128, 8), 128);
        assert_eq!(clip1(1500, 10), 1023);
    }

    #[test]
    fn test_floor_div_mod() {
        assert_eq!(floor_div(-1, 4), -1);
        assert_eq!(floor_div(7, 4), 1);
        assert_eq!(mod_floor(-1, 4), 3);
        assert_eq!(mod_floor(7, 4), 3);
    }

    #[test]
    fn test_chroma_qp_table() {
        assert_eq!(chroma_qp_from_luma_with_offset(29, 0), 29);
        assert_eq!(chroma_qp_from_luma_with_offset(30, 0), 29);
        assert_eq!(chroma_qp_from_luma_with_offset(51, 0), 39);
        assert_eq!(chroma_qp_from_luma_with_offset(51, 10), 39);
        assert_eq!(chroma_qp_from_luma_with_offset(0, -10), 0);
    }

    #[test]
    fn test_wrap_qp() {
        assert_eq!(wrap_qp(52), 0);
        assert_eq!(wrap_qp(-1), 51);
        assert_eq!(wrap_qp(26), 26);
    }
}
