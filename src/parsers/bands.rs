//! # 能带文本解析器
//!
//! 两种能带格式，均基于 `parsers/block.rs` 的通用提取器：
//!
//! ## gnuplot 格式 (wannier90 `*_band.dat`)
//! ```text
//! 0.000000  -5.123456     <- 第 1 条能带
//! 0.012345  -5.120000
//!                         <- 空行分隔
//! 0.000000  -3.456789     <- 第 2 条能带
//! ```
//!
//! ## pw.x 标准输出格式
//! ```text
//!           k = 0.0000 0.0000 0.0000 (  1234 PWs)   bands (ev):
//!
//!    -5.1234  -3.2345  -1.0000   0.5000   1.2345   2.3456   3.4567   4.5678
//!     5.6789
//! ```
//! 每个 k 点一个块；能量可能跨多行，也可能粘连（`-10.1234-10.5678`）。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 使用 `parsers/block.rs`, `models/band.rs`

use super::block::{numeric_row, BlockSpec, Extraction, RowParse};
use crate::error::MalformedRecordWarning;
use crate::models::Band;

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

/// pw.x 中结束能带块的短语（小写比较）
const PW_BLOCK_TERMINATORS: &[&str] = &[
    "occupation numbers",
    "end of band structure calculation",
    "end of self-consistent calculation",
    "highest occupied",
    "the fermi energy",
    "writing output",
    "job done",
];

fn float_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-+]?\d+\.\d*(?:[eEdD][-+]?\d+)?").expect("valid float regex"))
}

fn kpoint_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"k\s*=\s*([-+]?\d+\.\d+)\s*([-+]?\d+\.\d+)\s*([-+]?\d+\.\d+)")
            .expect("valid k-point regex")
    })
}

// ─────────────────────────────────────────────────────────────
// gnuplot 格式
// ─────────────────────────────────────────────────────────────

fn gnuplot_row(line: &str) -> RowParse {
    if line.trim_start().starts_with('#') {
        return RowParse::Skip;
    }
    match numeric_row(line) {
        RowParse::Data(fields) if fields.len() < 2 => {
            RowParse::Malformed("expected 'distance energy'".to_string())
        }
        other => other,
    }
}

/// 解析 gnuplot 格式能带
///
/// 空块被丢弃；路径距离下降的块整体丢弃并给出诊断。
pub fn read_gnuplot_bands(text: &str) -> Extraction<Band> {
    let spec = BlockSpec::new(|l| l.trim().is_empty(), gnuplot_row).open_at_start();
    let blocks = spec.collect_blocks(text);

    let mut warnings = blocks.warnings;
    let mut bands = Vec::new();

    for block in blocks.records {
        if block.rows.is_empty() {
            continue;
        }
        let points: Vec<(f64, f64)> = block.rows.iter().map(|r| (r.fields[0], r.fields[1])).collect();
        match Band::new(points) {
            Some(band) => bands.push(band),
            None => {
                let first_line = block.rows[0].line;
                warn!("Band block starting at line {} has a decreasing path; dropped", first_line);
                warnings.push(MalformedRecordWarning {
                    line: first_line,
                    content: String::new(),
                    reason: "path distance decreases within block".to_string(),
                });
            }
        }
    }

    debug!("Read {} gnuplot bands", bands.len());
    Extraction {
        records: bands,
        warnings,
    }
}

// ─────────────────────────────────────────────────────────────
// pw.x 标准输出格式
// ─────────────────────────────────────────────────────────────

/// 能量行：只由浮点数组成（允许粘连）
fn pw_energy_row(line: &str) -> RowParse {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return RowParse::Skip;
    }

    let re = float_regex();
    let residue = re.replace_all(trimmed, "");
    if !residue.trim().is_empty() {
        return RowParse::Malformed(format!("unexpected text '{}'", residue.trim()));
    }

    let fields: Vec<f64> = re
        .find_iter(trimmed)
        .filter_map(|m| super::block::parse_float(m.as_str()))
        .collect();
    RowParse::Data(fields)
}

/// 从 `k = x y z ...` 标记行读取坐标
fn parse_k_header(header: &str) -> Option<[f64; 3]> {
    let caps = kpoint_regex().captures(header)?;
    let x = caps.get(1)?.as_str().parse().ok()?;
    let y = caps.get(2)?.as_str().parse().ok()?;
    let z = caps.get(3)?.as_str().parse().ok()?;
    Some([x, y, z])
}

/// 沿 k 点序列的累积路径长度；缺少坐标时退化为序号
fn path_distances(coords: &[Option<[f64; 3]>]) -> Vec<f64> {
    if coords.iter().any(Option::is_none) {
        return (0..coords.len()).map(|i| i as f64).collect();
    }

    let mut total = 0.0;
    let mut distances = Vec::with_capacity(coords.len());
    let mut prev: Option<[f64; 3]> = None;
    for k in coords.iter().flatten() {
        if let Some(p) = prev {
            total += ((k[0] - p[0]).powi(2) + (k[1] - p[1]).powi(2) + (k[2] - p[2]).powi(2)).sqrt();
        }
        distances.push(total);
        prev = Some(*k);
    }
    distances
}

/// 解析 pw.x 输出中的能带
///
/// 每个 `bands (ev):` 块为一个 k 点；结果按能带序号转置为 `Band`。
pub fn read_pw_bands(text: &str) -> Extraction<Band> {
    let spec = BlockSpec::new(|l| l.contains("bands (ev)"), pw_energy_row)
        .stop_at(|l| {
            let lower = l.to_lowercase();
            PW_BLOCK_TERMINATORS.iter().any(|t| lower.contains(t))
        });
    let blocks = spec.collect_blocks(text);
    let mut warnings = blocks.warnings;

    let mut coords = Vec::new();
    let mut energies: Vec<Vec<f64>> = Vec::new();
    for block in blocks.records {
        let values: Vec<f64> = block.rows.iter().flat_map(|r| r.fields.iter().copied()).collect();
        if values.is_empty() {
            warnings.push(MalformedRecordWarning {
                line: block.line,
                content: block.header.unwrap_or_default().to_string(),
                reason: "k-point block without energies".to_string(),
            });
            continue;
        }
        coords.push(block.header.and_then(parse_k_header));
        energies.push(values);
    }

    let nbands = energies.iter().map(Vec::len).min().unwrap_or(0);
    if energies.iter().any(|e| e.len() != nbands) {
        warn!(
            "k-points carry different band counts; truncating all to {}",
            nbands
        );
    }

    let distances = path_distances(&coords);
    let bands = (0..nbands)
        .filter_map(|ib| {
            let points = distances
                .iter()
                .zip(energies.iter())
                .map(|(d, e)| (*d, e[ib]))
                .collect();
            Band::new(points)
        })
        .collect::<Vec<_>>();

    debug!("Read {} bands over {} k-points from pw.x output", bands.len(), distances.len());
    Extraction {
        records: bands,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_gnuplot_blocks() {
        let text = "0.0 1.0\n0.5 1.2\n\n0.0 -1.0\n0.5 -0.8\n";
        let bands = read_gnuplot_bands(text);

        assert_eq!(bands.records.len(), 2);
        assert_eq!(bands.records[0].points(), &[(0.0, 1.0), (0.5, 1.2)]);
        assert_eq!(bands.records[1].points(), &[(0.0, -1.0), (0.5, -0.8)]);
        assert!(bands.warnings.is_empty());
    }

    #[test]
    fn test_stray_line_does_not_truncate_block() {
        let text = "0.0 1.0\ngarbage here\n0.5 1.2\n1.0 1.4\n\n0.0 -1.0\n";
        let bands = read_gnuplot_bands(text);

        assert_eq!(bands.records.len(), 2);
        assert_eq!(bands.records[0].len(), 3);
        assert_eq!(bands.warnings.len(), 1);
        assert_eq!(bands.warnings[0].line, 2);
    }

    #[test]
    fn test_trailing_blank_lines_add_no_bands() {
        let text = "0.0 1.0\n0.5 1.2\n\n\n  \n";
        assert_eq!(read_gnuplot_bands(text).records.len(), 1);
    }

    #[test]
    fn test_decreasing_block_is_dropped() {
        let text = "0.0 1.0\n0.5 1.2\n0.2 1.3\n\n0.0 2.0\n";
        let bands = read_gnuplot_bands(text);
        assert_eq!(bands.records.len(), 1);
        assert_eq!(bands.warnings.len(), 1);
    }

    const PW_OUT: &str = "
     End of band structure calculation

          k = 0.0000 0.0000 0.0000 (   749 PWs)   bands (ev):

    -5.0000  -3.0000  -1.0000
     1.0000

          k = 0.3000 0.4000 0.0000 (   752 PWs)   bands (ev):

    -4.5000  -2.5000-10.5000
     1.5000

     Writing output data file ./tmp/wte2.save/
";

    #[test]
    fn test_pw_bands_transposed_per_band() {
        let bands = read_pw_bands(PW_OUT);

        assert_eq!(bands.records.len(), 4);
        assert!(bands.warnings.is_empty());
        let b2 = bands.records[2].points();
        assert_eq!(b2.len(), 2);
        assert!((b2[0].1 - (-1.0)).abs() < 1e-12);
        assert!((b2[1].1 - (-10.5)).abs() < 1e-12);
    }

    #[test]
    fn test_pw_bands_path_from_k_coordinates() {
        let bands = read_pw_bands(PW_OUT);
        let d: Vec<f64> = bands.records[0].points().iter().map(|p| p.0).collect();
        assert!((d[0] - 0.0).abs() < 1e-12);
        assert!((d[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pw_bands_truncate_to_common_count() {
        let text = "k = 0.0 0.0 0.0 bands (ev):\n 1.0 2.0 3.0\nk = 0.1 0.0 0.0 bands (ev):\n 1.5 2.5\n";
        let bands = read_pw_bands(text);
        assert_eq!(bands.records.len(), 2);
    }

    #[test]
    fn test_pw_bands_index_proxy_without_coordinates() {
        let text = "bands (ev):\n 1.0\nbands (ev):\n 2.0\nbands (ev):\n 3.0\n";
        let bands = read_pw_bands(text);
        let d: Vec<f64> = bands.records[0].points().iter().map(|p| p.0).collect();
        assert_eq!(d, vec![0.0, 1.0, 2.0]);
    }
}
