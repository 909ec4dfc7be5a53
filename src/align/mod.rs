//! # 能带对齐模块
//!
//! 将两组在不同 k 路径坐标上采样的能带归一化到同一 [0, 1] 区间并比较。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 子模块: interp (归一化与插值), aligner (配对与统计)

pub mod aligner;
pub mod interp;

pub use aligner::{align, AlignConfig, Pairing};
