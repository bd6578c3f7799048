//! # zhen-core
//!
//! Zhen 解码核心的基础设施: 统一错误类型与比特流读取器.
//!
//! 本 crate 不包含任何 H.264 专有逻辑, 仅提供压缩码流解码都需要的底层能力.

pub mod bitreader;
pub mod error;

// 重导出常用类型
pub use bitreader::BitReader;
pub use error::{ZhenError, ZhenResult};
