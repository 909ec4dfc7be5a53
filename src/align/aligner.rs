//! # 能带路径对齐与偏差计算
//!
//! 两组能带各自在独立、未归一化的路径坐标上采样（点数不同，单位不同，
//! 甚至只是 k 点序号）。每条能带的路径先各自缩放到 [0, 1]，
//! 再把点数较少的一条线性插值到点数较多的一条的横坐标上，
//! 在重叠区间内计算能量差的 RMS。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `align/interp.rs`, `models/band.rs`

use super::interp::NormalizedBand;
use crate::error::{Result, WanbridgeError};
use crate::models::BandSet;

use log::{debug, warn};
use serde::Serialize;

/// 能带配对方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pairing {
    /// 测试能带 j 对应参考能带 j + offset
    ByIndex { offset: isize },
    /// 按路径起点处能量最近贪心配对，参考能带不重复使用
    NearestEnergyAtStart,
}

/// 对齐参数
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    pub pairing: Pairing,
    /// 两条能带点数之比超过该值时给出诊断（仍继续插值）
    pub max_point_ratio: f64,
    /// 只统计参考能量落在该窗口内的采样点
    pub energy_window: Option<(f64, f64)>,
    /// 加到测试能带上的能量平移（如费米能差）
    pub test_shift: f64,
}

impl AlignConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_point_ratio >= 1.0) {
            return Err(WanbridgeError::ConfigError(format!(
                "max point ratio must be >= 1 (got {})",
                self.max_point_ratio
            )));
        }
        if let Some((lo, hi)) = self.energy_window {
            if !(lo < hi) {
                return Err(WanbridgeError::ConfigError(format!(
                    "energy window [{}, {}] is empty",
                    lo, hi
                )));
            }
        }
        Ok(())
    }
}

/// 单对能带的偏差
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDeviation {
    pub reference_index: usize,
    pub test_index: usize,
    /// 没有落在窗口内的采样点时为 `None`
    pub rms: Option<f64>,
    pub max_abs: Option<f64>,
    pub samples: usize,
    /// 两条能带点数之比超过 `max_point_ratio`
    pub over_ratio: bool,
}

/// 对齐结果
#[derive(Debug, Clone)]
pub struct AlignmentResult<'a> {
    pub reference: &'a BandSet,
    pub test: &'a BandSet,
    /// 参与比较的归一化横坐标（升序去重）
    pub domain: Vec<f64>,
    pub pairs: Vec<PairDeviation>,
    /// 全部采样点上的 RMS；没有任何比较时为 `None`
    pub rms: Option<f64>,
    pub max_abs: Option<f64>,
    pub samples: usize,
}

/// 一对能带的逐点差值：(t, 参考能量, 测试 - 参考)
fn pair_samples(reference: &NormalizedBand, test: &NormalizedBand) -> Vec<(f64, f64, f64)> {
    let (r_lo, r_hi) = reference.extent();
    let (t_lo, t_hi) = test.extent();
    let (lo, hi) = (r_lo.max(t_lo), r_hi.min(t_hi));

    // 点数相同时把测试能带插值到参考能带上
    if test.len() <= reference.len() {
        reference
            .points()
            .iter()
            .filter(|p| p.0 >= lo && p.0 <= hi)
            .filter_map(|&(t, e_ref)| Some((t, e_ref, test.interpolate(t)? - e_ref)))
            .collect()
    } else {
        test.points()
            .iter()
            .filter(|p| p.0 >= lo && p.0 <= hi)
            .filter_map(|&(t, e_test)| {
                let e_ref = reference.interpolate(t)?;
                Some((t, e_ref, e_test - e_ref))
            })
            .collect()
    }
}

fn rms_of(diffs: &[f64]) -> Option<f64> {
    if diffs.is_empty() {
        return None;
    }
    Some((diffs.iter().map(|d| d * d).sum::<f64>() / diffs.len() as f64).sqrt())
}

fn max_abs_of(diffs: &[f64]) -> Option<f64> {
    diffs.iter().map(|d| d.abs()).fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.max(d))))
}

/// 按配置生成 (参考序号, 测试序号) 对
fn pair_indices(reference: &BandSet, test: &BandSet, config: &AlignConfig) -> Vec<(usize, usize)> {
    match config.pairing {
        Pairing::ByIndex { offset } => (0..test.len())
            .filter_map(|j| {
                let i = j as isize + offset;
                (i >= 0 && (i as usize) < reference.len()).then_some((i as usize, j))
            })
            .collect(),
        Pairing::NearestEnergyAtStart => {
            let mut used = vec![false; reference.len()];
            let mut pairs = Vec::new();
            for (j, band) in test.bands.iter().enumerate() {
                let Some(e_test) = band.first_energy().map(|e| e + config.test_shift) else {
                    continue;
                };
                let nearest = reference
                    .bands
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !used[*i])
                    .filter_map(|(i, b)| Some((i, (b.first_energy()? - e_test).abs())))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((i, _)) = nearest {
                    used[i] = true;
                    pairs.push((i, j));
                }
            }
            pairs
        }
    }
}

/// 对齐两组能带并计算偏差
pub fn align<'a>(
    reference: &'a BandSet,
    test: &'a BandSet,
    config: &AlignConfig,
) -> Result<AlignmentResult<'a>> {
    config.validate()?;

    let mut pairs = Vec::new();
    let mut all_diffs = Vec::new();
    let mut domain = Vec::new();

    for (i, j) in pair_indices(reference, test, config) {
        let r_band = &reference.bands[i];
        let t_band = &test.bands[j];

        let (Some(r_norm), Some(t_norm)) = (
            NormalizedBand::from_band(r_band, 0.0),
            NormalizedBand::from_band(t_band, config.test_shift),
        ) else {
            warn!(
                "Skipping pair (reference {}, test {}): degenerate path",
                i, j
            );
            continue;
        };

        let (many, few) = if r_norm.len() >= t_norm.len() {
            (r_norm.len(), t_norm.len())
        } else {
            (t_norm.len(), r_norm.len())
        };
        let over_ratio = many as f64 > config.max_point_ratio * few as f64;
        if over_ratio {
            warn!(
                "Pair (reference {}, test {}): point counts {} vs {} exceed ratio {}; interpolating",
                i,
                j,
                r_norm.len(),
                t_norm.len(),
                config.max_point_ratio
            );
        }

        let samples: Vec<(f64, f64, f64)> = pair_samples(&r_norm, &t_norm)
            .into_iter()
            .filter(|(_, e_ref, _)| match config.energy_window {
                Some((lo, hi)) => *e_ref >= lo && *e_ref <= hi,
                None => true,
            })
            .collect();

        let diffs: Vec<f64> = samples.iter().map(|s| s.2).collect();
        domain.extend(samples.iter().map(|s| s.0));

        pairs.push(PairDeviation {
            reference_index: i,
            test_index: j,
            rms: rms_of(&diffs),
            max_abs: max_abs_of(&diffs),
            samples: diffs.len(),
            over_ratio,
        });
        all_diffs.extend(diffs);
    }

    domain.sort_by(f64::total_cmp);
    domain.dedup();

    let rms = rms_of(&all_diffs);
    debug!(
        "Aligned {} band pairs over {} samples (RMS {:?})",
        pairs.len(),
        all_diffs.len(),
        rms
    );

    Ok(AlignmentResult {
        reference,
        test,
        domain,
        pairs,
        rms,
        max_abs: max_abs_of(&all_diffs),
        samples: all_diffs.len(),
    })
}
