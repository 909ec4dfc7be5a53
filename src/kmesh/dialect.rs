//! # k 点网格的两种输出格式
//!
//! ## 完整记录格式 (pw.x `K_POINTS crystal`)
//! ```text
//! K_POINTS crystal
//! 4
//! 0.00000000  0.00000000  0.00000000  0.25000000
//! 0.50000000  0.00000000  0.00000000  0.25000000
//! ```
//!
//! ## 仅坐标格式 (wannier90 `.win`)
//! ```text
//! begin kpoints
//! 0.00000000  0.00000000  0.00000000
//! 0.50000000  0.00000000  0.00000000
//! end kpoints
//! ```
//!
//! 两种格式都从同一个 `KMesh` 按相同点序写出，并可用块提取器读回逐点比对。
//!
//! ## 依赖关系
//! - 被 `kmesh/patch.rs`, `commands/kmesh.rs`, `commands/kpoints.rs` 使用
//! - 使用 `parsers/block.rs`, `models/kpoint.rs`

use crate::error::{Result, WanbridgeError};
use crate::models::{KMesh, KPoint};
use crate::parsers::block::{numeric_row, BlockSpec, Extracted, Extraction, RowParse};

use std::fmt::Write;

/// 输出小数位数 (6..=8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision(u8);

impl Precision {
    pub const MIN: u8 = 6;
    pub const MAX: u8 = 8;

    pub fn new(decimals: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&decimals) {
            return Err(WanbridgeError::ConfigError(format!(
                "precision must be {}..={} decimal digits (got {})",
                Self::MIN,
                Self::MAX,
                decimals
            )));
        }
        Ok(Precision(decimals))
    }

    pub fn decimals(self) -> u8 {
        self.0
    }

    fn format(self, value: f64) -> String {
        // 避免写出 -0.000000
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{:.*}", self.0 as usize, value)
    }
}

fn coordinates(point: &KPoint, precision: Precision) -> String {
    point
        .frac
        .iter()
        .map(|&x| precision.format(x))
        .collect::<Vec<_>>()
        .join("  ")
}

// ─────────────────────────────────────────────────────────────
// 写出
// ─────────────────────────────────────────────────────────────

/// `x y z weight`，每点一行，无表头
pub fn to_full_records(mesh: &KMesh, precision: Precision) -> String {
    let weight = mesh.uniform_weight();
    let mut out = String::new();
    for point in &mesh.points {
        let w = point.weight.unwrap_or(weight);
        let _ = writeln!(out, "{}  {}", coordinates(point, precision), precision.format(w));
    }
    out
}

/// pw.x `K_POINTS crystal` 卡片
pub fn to_pw_card(mesh: &KMesh, precision: Precision) -> String {
    format!(
        "K_POINTS crystal\n{}\n{}",
        mesh.len(),
        to_full_records(mesh, precision)
    )
}

/// 任意点序列的 `begin kpoints` / `end kpoints` 块
pub fn points_to_coordinate_block(points: &[KPoint], precision: Precision) -> String {
    let mut out = String::from("begin kpoints\n");
    for point in points {
        let _ = writeln!(out, "{}", coordinates(point, precision));
    }
    out.push_str("end kpoints\n");
    out
}

/// 仅坐标格式
pub fn to_coordinate_block(mesh: &KMesh, precision: Precision) -> String {
    points_to_coordinate_block(&mesh.points, precision)
}

// ─────────────────────────────────────────────────────────────
// 读回
// ─────────────────────────────────────────────────────────────

fn full_record_row(line: &str) -> RowParse {
    let trimmed = line.trim();
    if trimmed.to_uppercase().starts_with("K_POINTS") {
        return RowParse::Skip;
    }
    match numeric_row(line) {
        RowParse::Data(fields) if fields.len() == 4 => RowParse::Data(fields),
        // 点数行
        RowParse::Data(fields) if fields.len() == 1 => RowParse::Skip,
        RowParse::Data(fields) => RowParse::Malformed(format!(
            "expected 'x y z weight', found {} fields",
            fields.len()
        )),
        other => other,
    }
}

fn coordinate_row(line: &str) -> RowParse {
    match numeric_row(line) {
        RowParse::Data(fields) if fields.len() == 3 => RowParse::Data(fields),
        RowParse::Data(fields) => RowParse::Malformed(format!(
            "expected 'x y z', found {} fields",
            fields.len()
        )),
        other => other,
    }
}

/// 读回完整记录格式（可带 `K_POINTS` 卡片头）
pub fn parse_full_records(text: &str) -> Extraction<KPoint> {
    let spec = BlockSpec::new(|_| false, full_record_row).open_at_start();
    let rows = spec.extract(text);
    collect_points(rows, |f| KPoint::new([f[0], f[1], f[2]]).with_weight(f[3]))
}

/// 读回 `begin kpoints` 块
pub fn parse_coordinate_block(text: &str) -> Extraction<KPoint> {
    let spec = BlockSpec::new(
        |l| l.trim().eq_ignore_ascii_case("begin kpoints"),
        coordinate_row,
    )
    .stop_at(|l| l.trim().eq_ignore_ascii_case("end kpoints"));
    let rows = spec.extract(text);
    collect_points(rows, |f| KPoint::new([f[0], f[1], f[2]]))
}

fn collect_points<'t, I, F>(items: I, build: F) -> Extraction<KPoint>
where
    I: Iterator<Item = Extracted<'t>>,
    F: Fn(&[f64]) -> KPoint,
{
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for item in items {
        match item {
            Extracted::Row(row) => records.push(build(&row.fields)),
            Extracted::Malformed(w) => warnings.push(w),
            Extracted::BlockStart { .. } => {}
        }
    }
    Extraction { records, warnings }
}

/// 把网格按两种格式写出再读回，逐点核对
///
/// 任一格式读回的点数、点序或坐标与网格不一致时返回错误。
pub fn verify_dialects(mesh: &KMesh, precision: Precision) -> Result<()> {
    let full = parse_full_records(&to_pw_card(mesh, precision));
    let coords = parse_coordinate_block(&to_coordinate_block(mesh, precision));

    for (dialect, parsed) in [("K_POINTS card", &full), ("kpoints block", &coords)] {
        if let Some(w) = parsed.warnings.first() {
            return Err(WanbridgeError::Other(format!(
                "{} re-read failed at line {}: {}",
                dialect, w.line, w.reason
            )));
        }
        if parsed.records.len() != mesh.len() {
            return Err(WanbridgeError::Other(format!(
                "{} re-read {} points, mesh has {}",
                dialect,
                parsed.records.len(),
                mesh.len()
            )));
        }
    }

    let decimals = precision.decimals();
    for (i, ((a, b), point)) in full.records.iter().zip(&coords.records).zip(&mesh.points).enumerate() {
        if !a.same_as(point, decimals) || !b.same_as(point, decimals) {
            return Err(WanbridgeError::Other(format!(
                "k-point {} differs between written formats: {:?} vs {:?}",
                i + 1,
                a.frac,
                b.frac
            )));
        }
    }
    Ok(())
}
