//! # Zhen (帧)
//!
//! 纯 Rust 实现的 H.264/AVC 宏块级解码核心.
//!
//! Zhen 提供帧内解码路径所需的全部宏块级推导:
//! - **几何推导**: 反光栅扫描, 宏块/子块寻址, 邻居定位 (含 MBAFF)
//! - **帧内预测**: 4x4 / 8x8 / 16x16 亮度与色度预测模式
//! - **CAVLC 残差**: coeff_token 查表, nC 推导, 系数/游程解码
//! - **变换与量化**: 4x4 / 8x8 反变换, DC Hadamard, 正向变换
//! - **条带簿记**: POC 推导与条带组映射
//!
//! # 快速开始
//!
//! ```rust
//! use zhen::codec::h264::geometry::inverse_raster_scan;
//!
//! // 宽 11 个宏块的图像中, 地址 10 的宏块左上角位于 (160, 0)
//! assert_eq!(inverse_raster_scan(10, 16, 16, 176, 0), 160);
//! assert_eq!(inverse_raster_scan(10, 16, 16, 176, 1), 0);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `zhen-core` | 核心类型与比特流工具 |
//! | `zhen-codec` | H.264 宏块级解码核心 |

/// 核心类型与比特流工具
pub use zhen_core as core;

/// H.264 宏块级解码核心
pub use zhen_codec as codec;

/// 获取 Zhen 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
