//! # kpoints 命令实现
//!
//! 从 pw.x 输出读取 k 点列表，写成 wannier90 `begin kpoints` 块。
//!
//! ## 依赖关系
//! - 使用 `cli/kpoints.rs` 定义的参数
//! - 使用 `parsers/pw_out.rs`, `kmesh/dialect.rs`
//! - 使用 `utils/`

use crate::cli::kpoints::KpointsArgs;
use crate::error::Result;
use crate::kmesh::{points_to_coordinate_block, Precision};
use crate::parsers::{pw_out, read_text};
use crate::utils::{self, output};

/// 执行 kpoints 命令
pub fn execute(args: KpointsArgs) -> Result<()> {
    let precision = Precision::new(args.precision)?;
    let source = args.input.display().to_string();

    let content = read_text(&args.input)?;
    let listing = pw_out::read_kpoint_listing(&content, args.section.into());

    output::print_malformed(&source, &listing.warnings);
    if let Some(notice) = listing.notice("k-point listing") {
        output::print_notice(&source, &notice);
        return Ok(());
    }

    let text = points_to_coordinate_block(&listing.records, precision);
    utils::write_text(args.output.as_deref(), &text)?;

    if let Some(path) = &args.output {
        output::print_success(&format!(
            "{} k-points written to '{}'",
            listing.records.len(),
            path.display()
        ));
    }
    Ok(())
}
