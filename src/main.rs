//! # wanbridge - DFT 与 Wannier 插值之间的数据桥接工具
//!
//! 准备 pw.x / wannier90 的输入，并把它们的输出整理成可比较的数据。
//!
//! ## 子命令
//! - `kmesh`     - 生成规则 k 点网格（pw.x 卡片 / .win 块），可原地写入输入
//! - `kpoints`   - 从 pw.x 输出重新提取 k 点列表
//! - `structure` - 从 QE XML 提取晶胞与原子位置
//! - `spread`    - 读取 .wout 收敛表
//! - `compare`   - 比较两组能带并计算 RMS 偏差
//! - `cutoff`    - 截断能收敛测试
//!   - `prepare` - 生成输入
//!   - `collect` - 汇总输出
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── kmesh/    (网格生成与输入替换)
//!   │     ├── parsers/  (块提取器与各格式解析器)
//!   │     ├── align/    (能带对齐)
//!   │     ├── cutoff/   (截断能收敛)
//!   │     └── models/   (数据模型)
//!   ├── batch/      (并行批处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```
//!
//! 日志级别由环境变量 `WANBRIDGE_LOG` 控制（默认 `warn`）。

mod align;
mod batch;
mod cli;
mod commands;
mod cutoff;
mod error;
mod kmesh;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;
use env_logger::init_from_env;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    init_from_env(env_logger::Env::new().filter_or("WANBRIDGE_LOG", "warn"));

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            utils::output::print_error(&format!("  caused by: {}", cause));
            source = cause.source();
        }
        std::process::exit(1);
    }
}
