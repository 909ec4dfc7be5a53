//! # pw.x 输出解析器
//!
//! 解析 Quantum ESPRESSO pw.x 输出，提取 k 点列表、总能与截断能。
//!
//! ## 依赖关系
//! - 被 `commands/kpoints.rs`, `commands/cutoff.rs` 使用
//! - 使用 `parsers/block.rs`, `models/`

use super::block::{BlockSpec, Extraction, RowParse};
use super::read_text;
use crate::error::Result;
use crate::models::{KPoint, ScfResult};

use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// k 点列表所在段落
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KListSection {
    /// `cart. coord. in units 2pi/alat`
    Cartesian,
    /// `cryst. coord.`
    Crystal,
}

impl KListSection {
    fn is_marker(self, line: &str) -> bool {
        let line = line.trim();
        match self {
            KListSection::Cartesian => line.starts_with("cart. coord. in units"),
            KListSection::Crystal => line == "cryst. coord.",
        }
    }
}

fn klist_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"k\(\s*\d+\)\s*=\s*\(\s*([-\d.]+)\s+([-\d.]+)\s+([-\d.]+)\s*\),\s*wk\s*=\s*([-\d.]+)",
        )
        .expect("valid k list regex")
    })
}

fn energy_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^!\s+total energy\s+=\s+([-+]?\d+\.\d+)\s+Ry").expect("valid energy regex")
    })
}

fn cutoff_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"kinetic-energy cutoff\s+=\s+([-+]?\d+\.?\d*)\s+Ry").expect("valid cutoff regex")
    })
}

/// `k(    1) = (   0.0000000   0.0000000   0.0000000), wk =   0.0277778`
fn klist_row(line: &str) -> RowParse {
    let caps = match klist_regex().captures(line) {
        Some(c) => c,
        None => return RowParse::Malformed("not a k-point line".to_string()),
    };

    let fields: Option<Vec<f64>> = (1..=4)
        .map(|i| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok()))
        .collect();
    match fields {
        Some(f) => RowParse::Data(f),
        None => RowParse::Malformed("unparsable k-point coordinates".to_string()),
    }
}

/// 读取 pw.x 打印的 k 点列表
///
/// 只取所选段落中第一个非空的块。
pub fn read_kpoint_listing(text: &str, section: KListSection) -> Extraction<KPoint> {
    let spec = BlockSpec::new(move |l| section.is_marker(l), klist_row).stop_at(|l| l.trim().is_empty());
    let blocks = spec.collect_blocks(text);

    blocks.map(|blocks| {
        blocks
            .into_iter()
            .find(|b| !b.rows.is_empty())
            .map(|b| {
                b.rows
                    .iter()
                    .map(|r| KPoint::new([r.fields[0], r.fields[1], r.fields[2]]).with_weight(r.fields[3]))
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// 最后一个 `!    total energy = E Ry`
pub fn read_total_energy(text: &str) -> Option<f64> {
    energy_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .last()
}

/// `kinetic-energy cutoff = C Ry`
pub fn read_cutoff(text: &str) -> Option<f64> {
    cutoff_regex()
        .captures(text)
        .and_then(|c| c.get(1)?.as_str().parse().ok())
}

/// 从 pw.x 输出文本提取 SCF 结果
pub fn read_scf_result(text: &str, source: &str) -> ScfResult {
    let mut result = ScfResult::new(source);
    result.is_finished = text.contains("JOB DONE");
    result.cutoff_ry = read_cutoff(text);
    result.total_energy_ry = read_total_energy(text);
    debug!(
        "{}: cutoff {:?} Ry, energy {:?} Ry, finished {}",
        source, result.cutoff_ry, result.total_energy_ry, result.is_finished
    );
    result
}

/// 解析 pw.x 输出文件
pub fn parse_scf_file(path: &Path) -> Result<ScfResult> {
    let content = read_text(path)?;
    Ok(read_scf_result(&content, &path.display().to_string()))
}
