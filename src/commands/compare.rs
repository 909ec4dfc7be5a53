//! # compare 命令实现
//!
//! ## 功能
//! - 读取两组能带（gnuplot 或 pw.x 输出，可按扩展名推断）
//! - 路径归一化、配对、插值并计算 RMS
//! - 终端显示逐对偏差与汇总，可选导出 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/compare.rs` 定义的参数
//! - 使用 `parsers/bands.rs`, `align/`
//! - 使用 `utils/`

use crate::align::{align, AlignConfig, Pairing};
use crate::cli::compare::{CompareArgs, PairingMode};
use crate::error::Result;
use crate::models::BandSet;
use crate::parsers::{parse_bands_file, BandFormat};
use crate::utils::{self, output};

use log::debug;
use std::path::Path;
use tabled::{Table, Tabled};

/// 逐对偏差表格行
#[derive(Debug, Clone, Tabled)]
struct PairRow {
    #[tabled(rename = "Ref band")]
    reference: usize,
    #[tabled(rename = "Test band")]
    test: usize,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "RMS (meV)")]
    rms: String,
    #[tabled(rename = "Max |ΔE| (meV)")]
    max_abs: String,
    #[tabled(rename = "Point ratio")]
    ratio: &'static str,
}

fn mev(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v * 1000.0)).unwrap_or_else(|| "-".to_string())
}

/// 执行 compare 命令
pub fn execute(args: CompareArgs) -> Result<()> {
    let config = AlignConfig {
        pairing: match args.pairing {
            PairingMode::Index => Pairing::ByIndex { offset: args.offset },
            PairingMode::Nearest => Pairing::NearestEnergyAtStart,
        },
        max_point_ratio: args.max_ratio,
        energy_window: energy_window(args.emin, args.emax),
        test_shift: args.shift,
    };
    config.validate()?;

    output::print_header("Band Structure Comparison");

    let reference = load_bands(&args.reference, args.reference_format.map(Into::into))?;
    let test = load_bands(&args.test, args.test_format.map(Into::into))?;

    let result = align(&reference, &test, &config)?;

    let rows: Vec<PairRow> = result
        .pairs
        .iter()
        .map(|p| PairRow {
            reference: p.reference_index + 1,
            test: p.test_index + 1,
            samples: p.samples,
            rms: mev(p.rms),
            max_abs: mev(p.max_abs),
            ratio: if p.over_ratio { "exceeded" } else { "ok" },
        })
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }

    output::print_separator();
    match result.rms {
        Some(rms) => {
            output::print_success(&format!(
                "RMS deviation: {:.6} eV ({:.2} meV) over {} samples in {} band pairs",
                rms,
                rms * 1000.0,
                result.samples,
                result.pairs.len()
            ));
            output::print_info(&format!("Max |ΔE|: {} meV", mev(result.max_abs)));
            output::print_info(&format!(
                "{} of {} reference / {} test bands compared on {} normalized abscissae",
                result.pairs.len(),
                result.reference.len(),
                result.test.len(),
                result.domain.len()
            ));
        }
        None => output::print_warning("No samples were compared"),
    }

    if let Some(path) = &args.csv {
        utils::write_csv(path, &result.pairs)?;
        output::print_written("per-pair deviations", &path.display().to_string());
    }
    Ok(())
}

/// 只给出一侧时另一侧不设限
fn energy_window(emin: Option<f64>, emax: Option<f64>) -> Option<(f64, f64)> {
    match (emin, emax) {
        (None, None) => None,
        (lo, hi) => Some((lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))),
    }
}

/// 读取并报告一组能带
fn load_bands(path: &Path, format: Option<BandFormat>) -> Result<BandSet> {
    let format = format.unwrap_or_else(|| BandFormat::infer(path));
    let source = path.display().to_string();

    let bands = parse_bands_file(path, format)?;
    output::print_malformed(&source, &bands.warnings);
    if let Some(notice) = bands.notice("bands") {
        output::print_notice(&source, &notice);
    }

    let set = BandSet::new(bands.records);
    output::print_info(&format!(
        "{}: {} bands x {} points ({:?})",
        source,
        set.len(),
        set.points_per_band(),
        format
    ));
    if let Some((lo, hi)) = set.energy_range() {
        debug!("{}: energies span {:.4} .. {:.4} eV", source, lo, hi);
    }
    Ok(set)
}
