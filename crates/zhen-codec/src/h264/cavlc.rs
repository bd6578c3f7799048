//! CAVLC 残差解码 (ITU-T H.264 条款 9.2).
//!
//! coeff_token / total_zeros / run_before 的码表按 (码字, 位长) 成对存放,
//! 解码时顺序扫描, peek 命中后再消费. 码表为前缀码, 扫描顺序不影响结果.
//! nC 由左/上邻居 4x4 块的非零系数个数推导, 邻居状态从宏块描述符缓存读取.

use log::debug;
use zhen_core::BitReader;

use super::error::{MbError, MbResult};
use super::geometry::{
    NeighborBlock, NeighborCtx, derive_neighboring_4x4_chroma_blocks,
    derive_neighboring_4x4_luma_blocks,
};
use super::macroblock::{ByAddressCache, MbFlags, MbRecord, MbType};

// ============================================================
// coeff_token 码表 (Table 9-5)
// ============================================================

// 行序: TotalCoeff 0..=16, 每组内 TrailingOnes 0..=min(TotalCoeff, 3).
// 四列对应 0<=nC<2, 2<=nC<4, 4<=nC<8, nC>=8 (最后一列为 6 位定长码).
#[rustfmt::skip]
const COEFF_TOKEN_BITS: [[u16; 62]; 4] = [
    [
        0x01, 0x05, 0x01, 0x07, 0x04, 0x01, 0x07, 0x06,
        0x05, 0x03, 0x07, 0x06, 0x05, 0x03, 0x07, 0x06,
        0x05, 0x04, 0x0F, 0x06, 0x05, 0x04, 0x0B, 0x0E,
        0x05, 0x04, 0x08, 0x0A, 0x0D, 0x04, 0x0F, 0x0E,
        0x09, 0x04, 0x0B, 0x0A, 0x0D, 0x0C, 0x0F, 0x0E,
        0x09, 0x0C, 0x0B, 0x0A, 0x0D, 0x08, 0x0F, 0x01,
        0x09, 0x0C, 0x0B, 0x0E, 0x0D, 0x08, 0x07, 0x0A,
        0x09, 0x0C, 0x04, 0x06, 0x05, 0x08,
    ],
    [
        0x03, 0x0B, 0x02, 0x07, 0x07, 0x03, 0x07, 0x0A,
        0x09, 0x05, 0x07, 0x06, 0x05, 0x04, 0x04, 0x06,
        0x05, 0x06, 0x07, 0x06, 0x05, 0x08, 0x0F, 0x06,
        0x05, 0x04, 0x0B, 0x0E, 0x0D, 0x04, 0x0F, 0x0A,
        0x09, 0x04, 0x0B, 0x0E, 0x0D, 0x0C, 0x08, 0x0A,
        0x09, 0x08, 0x0F, 0x0E, 0x0D, 0x0C, 0x0B, 0x0A,
        0x09, 0x0C, 0x07, 0x0B, 0x06, 0x08, 0x09, 0x08,
        0x0A, 0x01, 0x07, 0x06, 0x05, 0x04,
    ],
    [
        0x0F, 0x0F, 0x0E, 0x0B, 0x0F, 0x0D, 0x08, 0x0C,
        0x0E, 0x0C, 0x0F, 0x0A, 0x0B, 0x0B, 0x0B, 0x08,
        0x09, 0x0A, 0x09, 0x0E, 0x0D, 0x09, 0x08, 0x0A,
        0x09, 0x08, 0x0F, 0x0E, 0x0D, 0x0D, 0x0B, 0x0E,
        0x0A, 0x0C, 0x0F, 0x0A, 0x0D, 0x0C, 0x0B, 0x0E,
        0x09, 0x0C, 0x08, 0x0A, 0x0D, 0x08, 0x0D, 0x07,
        0x09, 0x0C, 0x09, 0x0C, 0x0B, 0x0A, 0x05, 0x08,
        0x07, 0x06, 0x01, 0x04, 0x03, 0x02,
    ],
    [
        0x03, 0x00, 0x01, 0x04, 0x05, 0x06, 0x08, 0x09,
        0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11,
        0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19,
        0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0x20, 0x21,
        0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29,
        0x2A, 0x2B, 0x2C, 0x2D, 0x2E, 0x2F, 0x30, 0x31,
        0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
        0x3A, 0x3B, 0x3C, 0x3D, 0x3E, 0x3F,
    ],
];

#[rustfmt::skip]
const COEFF_TOKEN_LENS: [[u8; 62]; 4] = [
    [
         1,  6,  2,  8,  6,  3,  9,  8,  7,  5, 10,  9,  8,  6, 11, 10,
         9,  7, 13, 11, 10,  8, 13, 13, 11,  9, 13, 13, 13, 10, 14, 14,
        13, 11, 14, 14, 14, 13, 15, 15, 14, 14, 15, 15, 15, 14, 16, 15,
        15, 15, 16, 16, 16, 15, 16, 16, 16, 16, 16, 16, 16, 16,
    ],
    [
         2,  6,  2,  6,  5,  3,  7,  6,  6,  4,  8,  6,  6,  4,  8,  7,
         7,  5,  9,  8,  8,  6, 11,  9,  9,  6, 11, 11, 11,  7, 12, 11,
        11,  9, 12, 12, 12, 11, 12, 12, 12, 11, 13, 13, 13, 12, 13, 13,
        13, 13, 13, 14, 13, 13, 14, 14, 14, 13, 14, 14, 14, 14,
    ],
    [
         4,  6,  4,  6,  5,  4,  6,  5,  5,  4,  7,  5,  5,  4,  7,  5,
         5,  4,  7,  6,  6,  4,  7,  6,  6,  4,  8,  7,  7,  5,  8,  8,
         7,  6,  9,  8,  8,  7,  9,  9,  8,  8,  9,  9,  9,  8, 10,  9,
         9,  9, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    ],
    [6; 62],
];

/// 色度 DC coeff_token (nC == -1, ChromaArrayType 1, TotalCoeff 0..=4)
#[rustfmt::skip]
const CHROMA_DC_COEFF_TOKEN_BITS: [u16; 14] = [
    1, 7, 1, 4, 6, 1, 3, 3, 2, 5, 2, 3, 2, 0,
];
#[rustfmt::skip]
const CHROMA_DC_COEFF_TOKEN_LENS: [u8; 14] = [
    2, 6, 1, 6, 6, 3, 6, 7, 7, 6, 6, 8, 8, 7,
];

/// 色度 DC coeff_token (nC == -2, ChromaArrayType 2, TotalCoeff 0..=8)
#[rustfmt::skip]
const CHROMA422_DC_COEFF_TOKEN_BITS: [u16; 30] = [
    1,
    15,  1,
    14, 13,  1,
     7, 12, 11,  1,
     6,  5, 10,  1,
     7,  6,  4,  9,
     7,  6,  5,  8,
     7,  6,  5,  4,
     7,  5,  4,  4,
];
#[rustfmt::skip]
const CHROMA422_DC_COEFF_TOKEN_LENS: [u8; 30] = [
     1,
     7,  2,
     7,  7,  3,
     9,  7,  7,  5,
     9,  9,  7,  6,
    10, 10,  9,  7,
    11, 11, 10,  7,
    12, 12, 11, 10,
    13, 12, 12, 11,
];

// ============================================================
// total_zeros / run_before 码表 (Table 9-7 至 9-10)
// ============================================================

/// 4x4 块 total_zeros, 按 TotalCoeff-1 行索引
#[rustfmt::skip]
const TOTAL_ZEROS_BITS: [[u8; 16]; 15] = [
    [1, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 1],
    [7, 6, 5, 4, 3, 5, 4, 3, 2, 3, 2, 3, 2, 1, 0, 0],
    [5, 7, 6, 5, 4, 3, 4, 3, 2, 3, 2, 1, 1, 0, 0, 0],
    [3, 7, 5, 4, 6, 5, 4, 3, 3, 2, 2, 1, 0, 0, 0, 0],
    [5, 4, 3, 7, 6, 5, 4, 3, 2, 1, 1, 0, 0, 0, 0, 0],
    [1, 1, 7, 6, 5, 4, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0],
    [1, 1, 5, 4, 3, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 3, 3, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 1, 3, 2, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 1, 3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 2, 1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];
#[rustfmt::skip]
const TOTAL_ZEROS_LENS: [[u8; 16]; 15] = [
    [1, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 9],
    [3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 6, 6, 6, 6, 0],
    [4, 3, 3, 3, 4, 4, 3, 3, 4, 5, 5, 6, 5, 6, 0, 0],
    [5, 3, 4, 4, 3, 3, 3, 4, 3, 4, 5, 5, 5, 0, 0, 0],
    [4, 4, 4, 3, 3, 3, 3, 3, 4, 5, 4, 5, 0, 0, 0, 0],
    [6, 5, 3, 3, 3, 3, 3, 3, 4, 3, 6, 0, 0, 0, 0, 0],
    [6, 5, 3, 3, 3, 2, 3, 4, 3, 6, 0, 0, 0, 0, 0, 0],
    [6, 4, 5, 3, 2, 2, 3, 3, 6, 0, 0, 0, 0, 0, 0, 0],
    [6, 6, 4, 2, 2, 3, 2, 5, 0, 0, 0, 0, 0, 0, 0, 0],
    [5, 5, 3, 2, 2, 2, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 4, 3, 3, 1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 4, 2, 1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 3, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// 色度 DC total_zeros (ChromaArrayType 1, 最多 4 个系数)
#[rustfmt::skip]
const CHROMA_DC_TOTAL_ZEROS_BITS: [[u8; 4]; 3] = [
    [1, 1, 1, 0],
    [1, 1, 0, 0],
    [1, 0, 0, 0],
];
#[rustfmt::skip]
const CHROMA_DC_TOTAL_ZEROS_LENS: [[u8; 4]; 3] = [
    [1, 2, 3, 3],
    [1, 2, 2, 0],
    [1, 1, 0, 0],
];

/// 色度 DC total_zeros (ChromaArrayType 2, 最多 8 个系数)
#[rustfmt::skip]
const CHROMA422_DC_TOTAL_ZEROS_BITS: [[u8; 8]; 7] = [
    [1, 2, 3, 2, 3, 1, 1, 0],
    [0, 1, 1, 4, 5, 6, 7, 0],
    [0, 1, 1, 2, 6, 7, 0, 0],
    [6, 0, 1, 2, 7, 0, 0, 0],
    [0, 1, 2, 3, 0, 0, 0, 0],
    [0, 1, 1, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 0],
];
#[rustfmt::skip]
const CHROMA422_DC_TOTAL_ZEROS_LENS: [[u8; 8]; 7] = [
    [1, 3, 3, 4, 4, 4, 5, 5],
    [3, 2, 3, 3, 3, 3, 3, 0],
    [3, 3, 2, 2, 3, 3, 0, 0],
    [3, 2, 2, 2, 3, 0, 0, 0],
    [2, 2, 2, 2, 0, 0, 0, 0],
    [2, 2, 1, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0],
];

/// run_before, 按 min(zerosLeft, 7) - 1 行索引
#[rustfmt::skip]
const RUN_BEFORE_BITS: [[u8; 15]; 7] = [
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 2, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 1, 3, 2, 5, 4, 0, 0, 0, 0, 0, 0, 0, 0],
    [7, 6, 5, 4, 3, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];
#[rustfmt::skip]
const RUN_BEFORE_LENS: [[u8; 15]; 7] = [
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 3, 3, 3, 3, 3, 3, 4, 5, 6, 7, 8, 9, 10, 11],
];

// ============================================================
// coeff_token 解码
// ============================================================

/// coeff_token 解码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoeffToken {
    pub total_coeff: u8,
    pub trailing_ones: u8,
}

/// 扫描索引 -> (TotalCoeff, TrailingOnes), 行序与码表一致
fn token_from_index(idx: usize) -> CoeffToken {
    let mut i = idx;
    for tc in 0u8..=16 {
        let group = tc.min(3) as usize + 1;
        if i < group {
            return CoeffToken {
                total_coeff: tc,
                trailing_ones: i as u8,
            };
        }
        i -= group;
    }
    // 码表长度固定, 不会越界
    CoeffToken {
        total_coeff: 16,
        trailing_ones: 3,
    }
}

fn scan_codebook(
    br: &mut BitReader,
    bits: &[u16],
    lens: &[u8],
) -> MbResult<Option<usize>> {
    for (idx, (&code, &len)) in bits.iter().zip(lens).enumerate() {
        if len == 0 || (len as usize) > br.bits_left() {
            continue;
        }
        if br.peek_bits(len as u32)? == code as u32 {
            br.skip_bits(len as u32)?;
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

/// 解码 coeff_token (9.2.1), 码表列由 nC 选择
pub fn decode_coeff_token(br: &mut BitReader, nc: i32) -> MbResult<CoeffToken> {
    let (bits, lens): (&[u16], &[u8]) = match nc {
        0..2 => (&COEFF_TOKEN_BITS[0], &COEFF_TOKEN_LENS[0]),
        2..4 => (&COEFF_TOKEN_BITS[1], &COEFF_TOKEN_LENS[1]),
        4..8 => (&COEFF_TOKEN_BITS[2], &COEFF_TOKEN_LENS[2]),
        8.. => (&COEFF_TOKEN_BITS[3], &COEFF_TOKEN_LENS[3]),
        -1 => (&CHROMA_DC_COEFF_TOKEN_BITS, &CHROMA_DC_COEFF_TOKEN_LENS),
        -2 => (&CHROMA422_DC_COEFF_TOKEN_BITS, &CHROMA422_DC_COEFF_TOKEN_LENS),
        _ => return Err(MbError::CoeffTokenMiss { nc }),
    };

    match scan_codebook(br, bits, lens)? {
        Some(idx) => Ok(token_from_index(idx)),
        None => {
            debug!("H264: coeff_token 查表未命中, nC={}, 已读 {} 位", nc, br.bits_read());
            Err(MbError::CoeffTokenMiss { nc })
        }
    }
}

fn decode_total_zeros(br: &mut BitReader, total_coeff: u8, max_num_coeff: usize) -> MbResult<u32> {
    let row = total_coeff as usize - 1;
    let (bits, lens): (&[u8], &[u8]) = match max_num_coeff {
        4 => (
            &CHROMA_DC_TOTAL_ZEROS_BITS[row],
            &CHROMA_DC_TOTAL_ZEROS_LENS[row],
        ),
        8 => (
            &CHROMA422_DC_TOTAL_ZEROS_BITS[row],
            &CHROMA422_DC_TOTAL_ZEROS_LENS[row],
        ),
        _ => (&TOTAL_ZEROS_BITS[row], &TOTAL_ZEROS_LENS[row]),
    };

    for (value, (&code, &len)) in bits.iter().zip(lens).enumerate() {
        if len == 0 || (len as usize) > br.bits_left() {
            continue;
        }
        if br.peek_bits(len as u32)? == code as u32 {
            br.skip_bits(len as u32)?;
            return Ok(value as u32);
        }
    }
    Err(MbError::Structural {
        mb_addr: -1,
        block: super::error::BlockKind::Luma4x4,
        step: "total_zeros 查表失败",
    })
}

fn decode_run_before(br: &mut BitReader, zeros_left: u32) -> MbResult<u32> {
    let row = (zeros_left.min(7) - 1) as usize;
    for (value, (&code, &len)) in RUN_BEFORE_BITS[row].iter().zip(&RUN_BEFORE_LENS[row]).enumerate()
    {
        if len == 0 || (len as usize) > br.bits_left() {
            continue;
        }
        if br.peek_bits(len as u32)? == code as u32 {
            br.skip_bits(len as u32)?;
            return Ok(value as u32);
        }
    }
    Err(MbError::Structural {
        mb_addr: -1,
        block: super::error::BlockKind::Luma4x4,
        step: "run_before 查表失败",
    })
}

// ============================================================
// 残差块解码
// ============================================================

/// 解码完成的 CAVLC 残差块 (频域扫描序)
#[derive(Debug, Clone)]
pub struct ResidualBlock {
    pub coeffs: [i32; 16],
    pub total_coeff: u8,
    pub trailing_ones: u8,
}

/// 解码一个 CAVLC 残差块 (9.2), 系数按扫描序写入 `coeffs[start_idx..]`.
///
/// `max_num_coeff` 取 16 (完整 4x4), 15 (AC), 4 或 8 (色度 DC),
/// 同时决定 total_zeros 的码表.
pub fn decode_residual_block(
    br: &mut BitReader,
    nc: i32,
    start_idx: usize,
    end_idx: usize,
    max_num_coeff: usize,
) -> MbResult<ResidualBlock> {
    let token = decode_coeff_token(br, nc)?;
    let total_coeff = token.total_coeff as usize;
    let trailing_ones = token.trailing_ones as usize;
    let mut coeffs = [0i32; 16];

    if total_coeff == 0 {
        return Ok(ResidualBlock {
            coeffs,
            total_coeff: 0,
            trailing_ones: 0,
        });
    }

    // 级别解码 (9.2.2), suffixLength 随级别幅度自适应增长
    let mut level_val = [0i32; 16];
    let mut suffix_length: u32 = if total_coeff > 10 && trailing_ones < 3 {
        1
    } else {
        0
    };
    for i in 0..total_coeff {
        if i < trailing_ones {
            let sign = br.read_bit()?;
            level_val[i] = 1 - 2 * sign as i32;
        } else {
            let level_prefix = br.read_unary(1)?;
            let suffix_size = if level_prefix == 14 && suffix_length == 0 {
                4
            } else if level_prefix >= 15 {
                level_prefix - 3
            } else {
                suffix_length
            };

            let mut level_code = (level_prefix.min(15) << suffix_length) as i32;
            if suffix_length > 0 || level_prefix >= 14 {
                level_code += br.read_bits(suffix_size)? as i32;
            }
            if level_prefix >= 15 && suffix_length == 0 {
                level_code += 15;
            }
            if level_prefix >= 16 {
                level_code += (1 << (level_prefix - 3)) - 4096;
            }
            if i == trailing_ones && trailing_ones < 3 {
                level_code += 2;
            }

            level_val[i] = if level_code % 2 == 0 {
                (level_code + 2) >> 1
            } else {
                -((level_code + 1) >> 1)
            };

            if suffix_length == 0 {
                suffix_length = 1;
            }
            if level_val[i].unsigned_abs() > (3 << (suffix_length - 1)) && suffix_length < 6 {
                suffix_length += 1;
            }
        }
    }

    // 零游程解码 (9.2.3)
    let mut zeros_left = 0u32;
    if total_coeff < end_idx - start_idx + 1 {
        zeros_left = decode_total_zeros(br, token.total_coeff, max_num_coeff)?;
    }

    let mut run_val = [0u32; 16];
    for i in 0..total_coeff - 1 {
        run_val[i] = if zeros_left > 0 {
            decode_run_before(br, zeros_left)?
        } else {
            0
        };
        // 损坏码流可能给出超过剩余零个数的游程
        if run_val[i] > zeros_left {
            return Err(MbError::Structural {
                mb_addr: -1,
                block: super::error::BlockKind::Luma4x4,
                step: "run_before 超出剩余零个数",
            });
        }
        zeros_left -= run_val[i];
    }
    run_val[total_coeff - 1] = zeros_left;

    // 按扫描序回填 (9.2.4)
    let mut coeff_num: i32 = -1;
    for i in (0..total_coeff).rev() {
        coeff_num += run_val[i] as i32 + 1;
        coeffs[start_idx + coeff_num as usize] = level_val[i];
    }

    Ok(ResidualBlock {
        coeffs,
        total_coeff: token.total_coeff,
        trailing_ones: token.trailing_ones,
    })
}

// ============================================================
// nC 推导 (9.2.1)
// ============================================================

/// 残差块类别, 决定 nC 推导使用的邻居与块索引
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualKind {
    /// 色度 DC (nC 为 -1 / -2)
    ChromaDc,
    /// Intra_16x16 亮度 DC (按块 0 推导)
    Intra16x16Dc,
    /// Intra_16x16 亮度 AC
    Intra16x16Ac,
    /// 亮度 4x4
    Luma4x4,
    /// 色度 AC
    ChromaAc,
}

/// 颜色分量, 选择邻居描述符中的 TotalCoeff 数组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Luma,
    Cb,
    Cr,
}

/// nC 推导上下文
pub struct NcCtx<'a> {
    pub ctx: &'a NeighborCtx,
    pub cache: &'a ByAddressCache<MbRecord>,
    /// 当前宏块的解码中描述符
    pub curr: &'a MbRecord,
    pub constrained_intra_pred: bool,
    /// 当前 NAL 为条带数据分割 (nal_unit_type 2..4)
    pub partitioned_nal: bool,
}

impl NcCtx<'_> {
    fn record(&self, addr: i32) -> Option<&MbRecord> {
        if addr == self.ctx.curr_mb_addr {
            Some(self.curr)
        } else {
            self.cache.get(addr)
        }
    }

    /// 邻居块对 nC 的贡献
    fn contribution(&self, blk: &NeighborBlock, plane: Plane) -> Option<i32> {
        if !blk.mb.available {
            return None;
        }
        let rec = self.record(blk.mb.addr)?;
        // 受限帧内预测: 数据分割条带中帧内宏块不得引用帧间邻居
        if self.curr.mb_type.is_intra()
            && self.constrained_intra_pred
            && !rec.mb_type.is_intra()
            && self.partitioned_nal
        {
            return None;
        }
        let n = if rec.mb_type.is_skip() {
            0
        } else if rec.mb_type == MbType::IPcm {
            16
        } else if rec.flags.contains(MbFlags::ALL_AC_ZERO) {
            0
        } else {
            let arr = match plane {
                Plane::Luma => &rec.luma_total_coeff,
                Plane::Cb => &rec.cb_total_coeff,
                Plane::Cr => &rec.cr_total_coeff,
            };
            arr.get(blk.blk_idx as usize).copied().unwrap_or(0) as i32
        };
        Some(n)
    }
}

/// 推导残差块的 nC (9.2.1)
///
/// 两邻居都可用时 nC = nA + nB, 只有一个可用时取其值, 都不可用时为 0.
/// 色度 DC 直接按 ChromaArrayType 返回 -1 / -2.
pub fn get_nc(
    nc_ctx: &NcCtx<'_>,
    kind: ResidualKind,
    plane: Plane,
    blk_idx: i32,
    chroma_array_type: i32,
) -> MbResult<i32> {
    if kind == ResidualKind::ChromaDc {
        return Ok(if chroma_array_type == 1 { -1 } else { -2 });
    }

    let blk_idx = if kind == ResidualKind::Intra16x16Dc {
        0
    } else {
        blk_idx
    };

    let (a, b) = match kind {
        ResidualKind::ChromaAc => derive_neighboring_4x4_chroma_blocks(nc_ctx.ctx, blk_idx)?,
        _ => derive_neighboring_4x4_luma_blocks(nc_ctx.ctx, blk_idx)?,
    };

    let na = nc_ctx.contribution(&a, plane);
    let nb = nc_ctx.contribution(&b, plane);
    Ok(match (na, nb) {
        (Some(na), Some(nb)) => na + nb,
        (Some(na), None) => na,
        (None, Some(nb)) => nb,
        (None, None) => 0,
    })
}
