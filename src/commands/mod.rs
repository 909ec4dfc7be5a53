//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `kmesh/`, `align/`, `cutoff/`, `utils/`
//! - 子模块: kmesh, kpoints, structure, spread, compare, cutoff

pub mod compare;
pub mod cutoff;
pub mod kmesh;
pub mod kpoints;
pub mod spread;
pub mod structure;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Kmesh(args) => kmesh::execute(args),
        Commands::Kpoints(args) => kpoints::execute(args),
        Commands::Structure(args) => structure::execute(args),
        Commands::Spread(args) => spread::execute(args),
        Commands::Compare(args) => compare::execute(args),
        Commands::Cutoff(args) => cutoff::execute(args),
    }
}
