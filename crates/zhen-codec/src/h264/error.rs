//! 宏块级解码错误类型.
//!
//! 每个错误都携带定位信息 (宏块地址, 块类别, 推导步骤), 便于在条带中止时
//! 直接指出出错位置. 核心不做任何重试, 错误一律向上传播.

use thiserror::Error;
use zhen_core::ZhenError;

/// 推导请求所属的块类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// 亮度 4x4 块
    Luma4x4,
    /// 亮度 8x8 块
    Luma8x8,
    /// 色度 4x4 块
    Chroma4x4,
    /// 宏块整体
    Macroblock,
    /// 宏块/子宏块分区
    Partition,
}

/// 宏块级解码错误
#[derive(Debug, Error)]
pub enum MbError {
    /// 码流或推导请求在结构上无效 (如请求右侧/下方邻居)
    #[error("宏块 {mb_addr} 处结构错误: {step} ({block:?})")]
    Structural {
        mb_addr: i32,
        block: BlockKind,
        step: &'static str,
    },

    /// 预测模式所需的参考样本不可用
    #[error("宏块 {mb_addr} 帧内预测 {mode} 缺少参考样本")]
    SamplesUnavailable { mb_addr: i32, mode: &'static str },

    /// coeff_token 码表扫描完毕仍未命中
    #[error("coeff_token 查表失败, nC={nc}")]
    CoeffTokenMiss { nc: i32 },

    /// 能力不支持 (如 4:4:4 色度帧内预测)
    #[error("不支持的能力: {0}")]
    Unsupported(&'static str),

    /// 比特流读取错误 (EOF, 下溢等)
    #[error(transparent)]
    Bitstream(#[from] ZhenError),
}

/// 宏块级解码 Result 类型
pub type MbResult<T> = Result<T, MbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MbError::Structural {
            mb_addr: 42,
            block: BlockKind::Luma4x4,
            step: "邻居定位",
        };
        let msg = format!("{err}");
        assert!(msg.contains("42"), "错误信息应包含宏块地址: {msg}");
        assert!(msg.contains("邻居定位"), "错误信息应包含推导步骤: {msg}");
    }

    #[test]
    fn test_bitstream_propagation() {
        fn inner() -> MbResult<u32> {
            let data = [0u8; 1];
            let mut br = zhen_core::BitReader::new(&data);
            br.read_bits(8)?;
            Ok(br.read_bits(8)?)
        }
        assert!(matches!(
            inner(),
            Err(MbError::Bitstream(ZhenError::Eof))
        ));
    }
}
