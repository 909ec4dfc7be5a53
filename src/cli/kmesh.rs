//! # kmesh 子命令 CLI 定义
//!
//! 生成规则 k 点网格并写成 pw.x 或 wannier90 格式
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/kmesh.rs`

use crate::models::Axis;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 变化最快的轴
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FastestAxis {
    /// k1 fastest, k3 slowest (wannier90 convention)
    K1,
    /// k2 fastest, then k1, k3 slowest
    K2,
    /// k3 fastest, k1 slowest
    K3,
}

impl From<FastestAxis> for Axis {
    fn from(axis: FastestAxis) -> Self {
        match axis {
            FastestAxis::K1 => Axis::First,
            FastestAxis::K2 => Axis::Second,
            FastestAxis::K3 => Axis::Third,
        }
    }
}

/// 网格输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum MeshFormat {
    /// pw.x K_POINTS crystal card
    Pw,
    /// wannier90 begin/end kpoints block
    Win,
    /// Bare "x y z weight" lines
    Records,
}

/// kmesh 子命令参数
#[derive(Args, Debug)]
pub struct KmeshArgs {
    /// Mesh dimensions N1 N2 N3
    #[arg(num_args = 3, required = true, value_names = ["N1", "N2", "N3"])]
    pub dims: Vec<usize>,

    /// Axis that varies fastest (no default: the ordering must be explicit)
    #[arg(long, value_enum)]
    pub fastest: FastestAxis,

    /// Decimal digits written per coordinate (6-8)
    #[arg(short, long, default_value_t = 8)]
    pub precision: u8,

    /// Output format when writing to stdout or --output
    #[arg(short, long, value_enum, default_value = "pw")]
    pub format: MeshFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// pw.x input whose K_POINTS card is replaced in place
    #[arg(long)]
    pub pw_input: Option<PathBuf>,

    /// wannier90 .win file whose kpoints block and mp_grid are replaced in place
    #[arg(long)]
    pub win_input: Option<PathBuf>,
}
