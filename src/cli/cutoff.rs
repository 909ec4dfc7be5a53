//! # cutoff 子命令 CLI 定义
//!
//! 截断能收敛测试，包含两个子命令：
//! - `prepare`: 由模板生成一组 pw.x 输入
//! - `collect`: 汇总输出中的总能
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/cutoff.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Cutoff 主命令
// ─────────────────────────────────────────────────────────────

/// cutoff 主命令参数
#[derive(Args, Debug)]
pub struct CutoffArgs {
    #[command(subcommand)]
    pub command: CutoffCommands,
}

/// cutoff 子命令
#[derive(Subcommand, Debug)]
pub enum CutoffCommands {
    /// Write one pw.x input per cutoff from a template
    Prepare(PrepareArgs),

    /// Collect final total energies from pw.x outputs
    Collect(CollectArgs),
}

// ─────────────────────────────────────────────────────────────
// prepare
// ─────────────────────────────────────────────────────────────

/// prepare 子命令参数
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// pw.x input template containing 'ecutwfc'
    pub template: PathBuf,

    /// Wavefunction cutoffs in Ry (e.g. "30,40,50,60")
    #[arg(long, value_delimiter = ',', required = true)]
    pub cutoffs: Vec<f64>,

    /// ecutrho = factor * ecutwfc
    #[arg(long, default_value_t = 8.0)]
    pub rho_factor: f64,

    /// Directory for the generated inputs
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// File name stem (defaults to the template's stem)
    #[arg(long)]
    pub stem: Option<String>,
}

// ─────────────────────────────────────────────────────────────
// collect
// ─────────────────────────────────────────────────────────────

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// pw.x output file or directory of outputs
    pub input: PathBuf,

    /// File pattern for directory input (comma-separated)
    #[arg(short, long, default_value = "*.out")]
    pub pattern: String,

    /// Search subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Parallel jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Export the convergence table to CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
