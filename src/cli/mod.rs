//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `kmesh`: 生成 k 点网格（可直接写入 pw.x / .win 输入）
//! - `kpoints`: 从 pw.x 输出重新提取 k 点列表
//! - `structure`: 从 QE XML 提取结构
//! - `spread`: 读取 .wout 收敛表
//! - `compare`: 比较两组能带
//! - `cutoff`: 截断能收敛测试（嵌套子命令）
//!   - `prepare`: 生成输入
//!   - `collect`: 汇总输出
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: kmesh, kpoints, structure, spread, compare, cutoff

pub mod compare;
pub mod cutoff;
pub mod kmesh;
pub mod kpoints;
pub mod spread;
pub mod structure;

use clap::{Parser, Subcommand};

/// wanbridge - DFT 与 Wannier 插值之间的数据桥接工具
#[derive(Parser)]
#[command(name = "wanbridge")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Bridge DFT and Wannier90 data: k-meshes, structures, spreads and band comparison", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a regular k-point mesh for pw.x and wannier90
    Kmesh(kmesh::KmeshArgs),

    /// Re-extract the k-point list printed by pw.x
    Kpoints(kpoints::KpointsArgs),

    /// Extract the cell and atomic positions from a QE XML file
    Structure(structure::StructureArgs),

    /// Read the spread convergence table of a wannier90 .wout file
    Spread(spread::SpreadArgs),

    /// Compare two band structures sampled on different paths
    Compare(compare::CompareArgs),

    /// Plane-wave cutoff convergence study
    Cutoff(cutoff::CutoffArgs),
}
