//! # kpoints 子命令 CLI 定义
//!
//! 从 pw.x 输出中重新提取 k 点列表，写成 wannier90 的 kpoints 块
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/kpoints.rs`

use crate::parsers::pw_out::KListSection;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// k 点列表所在段落
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Section {
    /// "cart. coord. in units 2pi/alat"
    Cart,
    /// "cryst. coord."
    Cryst,
}

impl From<Section> for KListSection {
    fn from(section: Section) -> Self {
        match section {
            Section::Cart => KListSection::Cartesian,
            Section::Cryst => KListSection::Crystal,
        }
    }
}

/// kpoints 子命令参数
#[derive(Args, Debug)]
pub struct KpointsArgs {
    /// pw.x output file (run with verbosity = 'high' for the crystal list)
    pub input: PathBuf,

    /// Which k-point listing to read
    #[arg(long, value_enum, default_value = "cryst")]
    pub section: Section,

    /// Decimal digits written per coordinate (6-8)
    #[arg(short, long, default_value_t = 8)]
    pub precision: u8,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
