//! # structure 子命令 CLI 定义
//!
//! 从 QE `data-file-schema.xml` 提取晶胞和原子位置
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/structure.rs`

use crate::models::PositionUnit;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// XML 中坐标的单位
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SourceUnit {
    /// Bohr (QE XML default)
    Bohr,
    /// Angstrom
    Angstrom,
    /// Fractional coordinates of the cell vectors
    Crystal,
}

impl From<SourceUnit> for PositionUnit {
    fn from(unit: SourceUnit) -> Self {
        match unit {
            SourceUnit::Bohr => PositionUnit::Bohr,
            SourceUnit::Angstrom => PositionUnit::Angstrom,
            SourceUnit::Crystal => PositionUnit::Crystal,
        }
    }
}

/// structure 子命令参数
#[derive(Args, Debug)]
pub struct StructureArgs {
    /// QE XML file (e.g. prefix.save/data-file-schema.xml)
    pub input: PathBuf,

    /// Path to the structure node; a leading '//' searches the whole tree
    #[arg(long, default_value = "//atomic_structure")]
    pub path: String,

    /// Unit of the positions stored in the XML
    #[arg(long, value_enum, default_value = "bohr")]
    pub unit: SourceUnit,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
