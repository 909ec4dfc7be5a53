//! # 数据模型模块
//!
//! 定义 k 点网格、原子结构、能带、收敛记录等不可变值类型。
//!
//! ## 依赖关系
//! - 被 `kmesh/`, `parsers/`, `align/`, `commands/` 使用
//! - 子模块: kpoint, structure, band, convergence, calculation

pub mod band;
pub mod calculation;
pub mod convergence;
pub mod kpoint;
pub mod structure;

pub use band::{Band, BandSet};
pub use calculation::{CutoffPoint, ScfResult, EV_PER_RY};
pub use convergence::{Column, ConvergenceRecord};
pub use kpoint::{Axis, KMesh, KPoint};
pub use structure::{AtomicStructure, PositionUnit};
