//! # k 点网格模块
//!
//! 按显式声明的轴顺序生成规则分数坐标网格，写成 pw.x 与 wannier90 两种格式，
//! 并可直接写入已有输入文件。
//!
//! ## 依赖关系
//! - 被 `commands/kmesh.rs`, `commands/kpoints.rs` 使用
//! - 子模块: generator, dialect, patch

pub mod dialect;
pub mod generator;
pub mod patch;

pub use dialect::{
    points_to_coordinate_block, to_coordinate_block, to_full_records, to_pw_card, verify_dialects,
    Precision,
};
pub use generator::MeshSpec;
pub use patch::{patch_pw_input, patch_win_input};
