//! # zhen-codec
//!
//! Zhen H.264/AVC 宏块级解码核心.
//!
//! 覆盖帧内解码路径所需的全部宏块级推导: 几何寻址, 邻居定位, 帧内预测,
//! CAVLC 残差解码, 变换与量化, 以及条带级簿记 (POC, 条带组映射).
//!
//! 本 crate 不做 RBSP 解析与容器解封装, 输入为已解析的语法元素与配置.

pub mod h264;
