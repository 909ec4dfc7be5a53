//! # spread 子命令 CLI 定义
//!
//! 读取 wannier90 `.wout` 中的收敛表
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/spread.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 收敛表种类
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TableKind {
    /// Wannierisation (CONV) table
    Wannierise,
    /// Disentanglement (DIS) table
    Disentangle,
}

/// spread 子命令参数
#[derive(Args, Debug)]
pub struct SpreadArgs {
    /// wannier90 .wout file
    pub input: PathBuf,

    /// Which convergence table to read
    #[arg(long, value_enum, default_value = "wannierise")]
    pub table: TableKind,

    /// Number of final iterations to print
    #[arg(long, default_value_t = 10)]
    pub last: usize,

    /// Export all records to CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
