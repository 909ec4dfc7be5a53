//! # cutoff 命令实现
//!
//! ## 功能
//! - `prepare`: 由模板写出每个截断能的 pw.x 输入
//! - `collect`: 并行解析 pw.x 输出，生成 ΔE 收敛表
//!
//! ## 依赖关系
//! - 使用 `cli/cutoff.rs` 定义的参数
//! - 使用 `cutoff/`, `parsers/pw_out.rs`, `batch/`
//! - 使用 `utils/`

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::cutoff::{CollectArgs, CutoffArgs, CutoffCommands, PrepareArgs};
use crate::cutoff::{prepare_inputs, summarize, validate_cutoffs};
use crate::error::{Result, WanbridgeError};
use crate::parsers::{pw_out, read_text};
use crate::utils::{self, output};

use std::fs;
use tabled::{Table, Tabled};

/// 收敛表格行
#[derive(Debug, Clone, Tabled)]
struct CutoffRow {
    #[tabled(rename = "ecutwfc (Ry)")]
    cutoff: String,
    #[tabled(rename = "Energy (Ry)")]
    energy: String,
    #[tabled(rename = "ΔE (meV)")]
    delta: String,
}

/// 执行 cutoff 命令
pub fn execute(args: CutoffArgs) -> Result<()> {
    match args.command {
        CutoffCommands::Prepare(args) => execute_prepare(args),
        CutoffCommands::Collect(args) => execute_collect(args),
    }
}

fn execute_prepare(args: PrepareArgs) -> Result<()> {
    validate_cutoffs(&args.cutoffs, args.rho_factor)?;
    output::print_header("Preparing Cutoff Convergence Inputs");

    let template = read_text(&args.template)?;
    let inputs = prepare_inputs(&template, &args.cutoffs, args.rho_factor)?;

    let stem = args.stem.clone().unwrap_or_else(|| {
        args.template
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pw")
            .to_string()
    });

    fs::create_dir_all(&args.outdir).map_err(|e| WanbridgeError::FileWriteError {
        path: args.outdir.display().to_string(),
        source: e,
    })?;

    for input in &inputs {
        let path = args.outdir.join(input.file_name(&stem));
        utils::write_text(Some(path.as_path()), &input.content)?;
        output::print_written(&format!("{} Ry", input.cutoff_ry), &path.display().to_string());
    }

    output::print_done(&format!(
        "{} inputs written (ecutrho = {} x ecutwfc)",
        inputs.len(),
        args.rho_factor
    ));
    Ok(())
}

fn execute_collect(args: CollectArgs) -> Result<()> {
    output::print_header("Collecting Cutoff Convergence");

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        return Err(WanbridgeError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }
    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Found {} pw.x outputs, parsing with {} jobs",
        files.len(),
        runner.jobs()
    ));

    let batch = runner.run(files, |file| match pw_out::parse_scf_file(file) {
        Ok(result) if result.total_energy_ry.is_none() => {
            ProcessResult::Skipped(format!("{}: no final total energy", file.display()))
        }
        Ok(result) => ProcessResult::Success(result),
        Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
    })?;

    for reason in &batch.skipped {
        output::print_skip(reason);
    }
    for (path, err) in batch.failures.iter().take(10) {
        output::print_error(&format!("  {}: {}", path, err));
    }
    if batch.failures.len() > 10 {
        output::print_warning(&format!("  ... and {} more", batch.failures.len() - 10));
    }

    let points = summarize(&batch.items);
    if points.is_empty() {
        output::print_warning("No completed calculations found to collect.");
        return Ok(());
    }

    let rows: Vec<CutoffRow> = points
        .iter()
        .map(|p| CutoffRow {
            cutoff: format!("{}", p.cutoff_ry),
            energy: format!("{:.8}", p.energy_ry),
            delta: format!("{:.3}", p.delta_ev * 1000.0),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_separator();
    output::print_success(&format!(
        "{} of {} outputs used, reference cutoff {} Ry",
        points.len(),
        batch.total(),
        points[points.len() - 1].cutoff_ry
    ));

    if let Some(path) = &args.csv {
        utils::write_csv(path, &points)?;
        output::print_written("convergence table", &path.display().to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn prepare_args(cutoffs: Vec<f64>, rho_factor: f64) -> PrepareArgs {
        PrepareArgs {
            template: PathBuf::from("/nonexistent/wanbridge/pw.in"),
            cutoffs,
            rho_factor,
            outdir: PathBuf::from("/nonexistent/wanbridge/out"),
            stem: None,
        }
    }

    #[test]
    fn test_prepare_checks_cutoffs_before_reading_template() {
        for args in [
            prepare_args(vec![], 8.0),
            prepare_args(vec![30.0, -5.0], 8.0),
            prepare_args(vec![30.0], 0.0),
        ] {
            assert!(matches!(execute_prepare(args), Err(WanbridgeError::ConfigError(_))));
        }
    }

    #[test]
    fn test_prepare_reports_missing_template() {
        let result = execute_prepare(prepare_args(vec![30.0], 8.0));
        assert!(matches!(result, Err(WanbridgeError::FileNotFound { .. })));
    }
}
