//! # 截断能收敛测试
//!
//! - `prepare_inputs`: 由 pw.x 输入模板生成一组不同 `ecutwfc` 的输入
//!   （`ecutrho = 倍数 × ecutwfc`）
//! - `summarize`: 汇总各输出的最终总能，给出相对最高截断能的 ΔE (eV)
//!
//! ## 依赖关系
//! - 被 `commands/cutoff.rs` 使用
//! - 使用 `models/calculation.rs`

use crate::error::{Result, WanbridgeError};
use crate::models::{CutoffPoint, ScfResult, EV_PER_RY};

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

fn ecutwfc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(ecutwfc\s*=\s*)[-+0-9.eEdD]+").expect("valid ecutwfc regex"))
}

fn ecutrho_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(ecutrho\s*=\s*)[-+0-9.eEdD]+").expect("valid ecutrho regex"))
}

/// 生成的单个输入
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInput {
    pub cutoff_ry: f64,
    pub content: String,
}

impl PreparedInput {
    /// `{stem}_cut_{cutoff}.in`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}_cut_{}.in", stem, self.cutoff_ry)
    }
}

/// 检查截断能列表与 ecutrho 倍数，不涉及模板
pub fn validate_cutoffs(cutoffs: &[f64], rho_factor: f64) -> Result<()> {
    if cutoffs.is_empty() {
        return Err(WanbridgeError::ConfigError("no cutoffs given".to_string()));
    }
    if let Some(bad) = cutoffs.iter().find(|&&c| !(c > 0.0)) {
        return Err(WanbridgeError::ConfigError(format!(
            "cutoff must be positive (got {})",
            bad
        )));
    }
    if !(rho_factor > 0.0) {
        return Err(WanbridgeError::ConfigError(format!(
            "ecutrho factor must be positive (got {})",
            rho_factor
        )));
    }
    Ok(())
}

/// 按截断能列表改写输入模板
pub fn prepare_inputs(template: &str, cutoffs: &[f64], rho_factor: f64) -> Result<Vec<PreparedInput>> {
    validate_cutoffs(cutoffs, rho_factor)?;
    if !ecutwfc_regex().is_match(template) {
        return Err(WanbridgeError::ConfigError(
            "template has no 'ecutwfc' entry".to_string(),
        ));
    }
    if !ecutrho_regex().is_match(template) {
        debug!("Template has no 'ecutrho'; pw.x default (4 x ecutwfc) applies");
    }

    Ok(cutoffs
        .iter()
        .map(|&cutoff| {
            let content = ecutwfc_regex().replace_all(template, format!("${{1}}{}", cutoff));
            let content = ecutrho_regex().replace_all(&content, format!("${{1}}{}", cutoff * rho_factor));
            PreparedInput {
                cutoff_ry: cutoff,
                content: content.into_owned(),
            }
        })
        .collect())
}

/// 汇总收敛曲线，按截断能升序
///
/// 缺少截断能或总能的结果被跳过；ΔE 相对最高截断能。
pub fn summarize(results: &[ScfResult]) -> Vec<CutoffPoint> {
    let mut points: Vec<(f64, f64)> = results
        .iter()
        .filter_map(|r| match (r.cutoff_ry, r.total_energy_ry) {
            (Some(c), Some(e)) => {
                if !r.is_finished {
                    warn!("{}: JOB DONE missing, using last total energy", r.source);
                }
                Some((c, e))
            }
            _ => {
                warn!("{}: no cutoff or total energy, skipped", r.source);
                None
            }
        })
        .collect();

    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let reference = match points.last() {
        Some(&(_, e)) => e,
        None => return Vec::new(),
    };

    points
        .into_iter()
        .map(|(cutoff_ry, energy_ry)| CutoffPoint {
            cutoff_ry,
            energy_ry,
            delta_ev: (energy_ry - reference) * EV_PER_RY,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "&system\n  ibrav = 0\n  ecutwfc = 45.0\n  ecutrho = 360.0\n/\n";

    #[test]
    fn test_prepare_rewrites_both_cutoffs() {
        let inputs = prepare_inputs(TEMPLATE, &[30.0, 40.0], 8.0).unwrap();

        assert_eq!(inputs.len(), 2);
        assert!(inputs[0].content.contains("ecutwfc = 30\n"));
        assert!(inputs[0].content.contains("ecutrho = 240\n"));
        assert!(inputs[1].content.contains("ecutwfc = 40\n"));
        assert!(inputs[1].content.contains("ecutrho = 320\n"));
        assert_eq!(inputs[1].file_name("wte2"), "wte2_cut_40.in");
    }

    #[test]
    fn test_prepare_rejects_bad_configuration() {
        assert!(matches!(
            prepare_inputs(TEMPLATE, &[], 8.0),
            Err(WanbridgeError::ConfigError(_))
        ));
        assert!(prepare_inputs(TEMPLATE, &[30.0, 0.0], 8.0).is_err());
        assert!(prepare_inputs(TEMPLATE, &[30.0], -1.0).is_err());
        assert!(prepare_inputs("&system\n/\n", &[30.0], 8.0).is_err());
    }

    fn result(cutoff: f64, energy: Option<f64>) -> ScfResult {
        let mut r = ScfResult::new(format!("cut_{}.out", cutoff));
        r.is_finished = true;
        r.cutoff_ry = Some(cutoff);
        r.total_energy_ry = energy;
        r
    }

    #[test]
    fn test_summarize_relative_to_highest_cutoff() {
        let results = vec![
            result(50.0, Some(-100.0)),
            result(30.0, Some(-99.9)),
            result(40.0, None),
        ];
        let points = summarize(&results);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].cutoff_ry, 30.0);
        assert!((points[0].delta_ev - 0.1 * EV_PER_RY).abs() < 1e-9);
        assert_eq!(points[1].delta_ev, 0.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
