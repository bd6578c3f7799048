//! H.264/AVC 宏块级解码核心.
//!
//! 以 Rec. ITU-T H.264 条款编号组织:
//! - 6.4: 几何推导与邻居定位 ([`geometry`])
//! - 8.2.1: 图像顺序计数 ([`poc`])
//! - 8.2.2: 条带组映射 ([`slice_group`])
//! - 8.3: 帧内预测 ([`samples`], [`intra`], [`pred_mode`])
//! - 8.5: 变换与量化 ([`transform`])
//! - 9.2: CAVLC 残差解码 ([`cavlc`])
//!
//! 所有操作以值语义返回推导结果, 失败时通过 [`error::MbError`] 传播并中止
//! 所在条带的解码, 核心内部不做任何重试.

pub mod cavlc;
pub mod common;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intra;
pub mod macroblock;
pub mod poc;
pub mod pred_mode;
pub mod samples;
pub mod slice_group;
pub mod transform;

pub use config::{ChromaFormat, CoreConfig, EntropyMode};
pub use error::{BlockKind, MbError, MbResult};
pub use macroblock::{ByAddressCache, MbFlags, MbRecord, MbType, SubMbType};
pub use poc::{Poc, PocConfig, PocContext, PocInput};
pub use slice_group::SliceGroupParams;
