//! # spread 命令实现
//!
//! ## 功能
//! - 按表头检测列，读取 `.wout` 收敛表
//! - 终端显示最后若干次迭代
//! - 可选导出全部记录为 CSV（列随表头而定）
//!
//! ## 依赖关系
//! - 使用 `cli/spread.rs` 定义的参数
//! - 使用 `parsers/wout.rs`
//! - 使用 `utils/output.rs`

use crate::cli::spread::{SpreadArgs, TableKind};
use crate::error::{Result, WanbridgeError};
use crate::models::{Column, ConvergenceRecord};
use crate::parsers::read_text;
use crate::parsers::wout::{parse_convergence, TableSchema};
use crate::utils::output;

use std::path::Path;
use tabled::builder::Builder;

/// 执行 spread 命令
pub fn execute(args: SpreadArgs) -> Result<()> {
    let schema = match args.table {
        TableKind::Wannierise => TableSchema::wannierise(),
        TableKind::Disentangle => TableSchema::disentangle(),
    };
    let source = args.input.display().to_string();

    output::print_header(&format!("Convergence of {} in '{}'", schema.name, source));

    let content = read_text(&args.input)?;
    let table = parse_convergence(&content, &schema)?;

    output::print_malformed(&source, &table.warnings);
    if let Some(notice) = table.notice("convergence records") {
        output::print_notice(&source, &notice);
        return Ok(());
    }

    let columns = columns_of(&table.records);
    let shown = table.records.len().saturating_sub(args.last);

    let mut builder = Builder::default();
    let mut header = vec![Column::Iteration.label().to_string()];
    header.extend(columns.iter().map(|c| c.label().to_string()));
    builder.push_record(header);
    for record in &table.records[shown..] {
        let mut row = vec![record.iteration.to_string()];
        row.extend(columns.iter().map(|c| format_value(record.get(*c))));
        builder.push_record(row);
    }
    println!("{}", builder.build());

    let (first, last) = (&table.records[0], &table.records[table.records.len() - 1]);
    output::print_info(&format!(
        "{} iterations ({} .. {})",
        table.records.len(),
        first.iteration,
        last.iteration
    ));
    for column in [Column::Spread, Column::OmegaI] {
        if let Some(value) = last.get(column) {
            output::print_success(&format!("Final {}: {:.10}", column, value));
        }
    }

    if let Some(path) = &args.csv {
        save_records_csv(&table.records, &columns, path)?;
        output::print_written("convergence records", &path.display().to_string());
    }
    Ok(())
}

/// 记录中出现过的数值列（不含迭代号），按列顺序
fn columns_of(records: &[ConvergenceRecord]) -> Vec<Column> {
    let mut columns: Vec<Column> = records.iter().flat_map(|r| r.values.keys().copied()).collect();
    columns.sort();
    columns.dedup();
    columns
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1e4 || (v != 0.0 && v.abs() < 1e-4) => format!("{:.6e}", v),
        Some(v) => format!("{:.10}", v),
        None => String::new(),
    }
}

/// 保存收敛记录到 CSV
fn save_records_csv(records: &[ConvergenceRecord], columns: &[Column], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec![Column::Iteration.label().to_string()];
    header.extend(columns.iter().map(|c| c.label().to_string()));
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![record.iteration.to_string()];
        row.extend(
            columns
                .iter()
                .map(|c| record.get(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(|e| WanbridgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
