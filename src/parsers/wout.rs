//! # wannier90 .wout 收敛表解析器
//!
//! 列的含义由表头行检测得到：不同版本打印的列集合和顺序不同，
//! 因此从不按固定位置猜测 "Total Spread" 在哪一列。
//!
//! ## .wout 收敛表示例
//! ```text
//!  +--------------------------------------------------------------------+<-- CONV
//!  | Iter  Delta Spread     RMS Gradient      Spread (Ang^2)      Time  |<-- CONV
//!  +--------------------------------------------------------------------+<-- CONV
//!
//!       0     0.317E+02     0.0000000000       31.7165052476       0.03  <-- CONV
//!       1    -0.292E+01     0.2133926066       28.7942315431       0.04  <-- CONV
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/spread.rs` 使用
//! - 使用 `parsers/block.rs`, `models/convergence.rs`

use super::block::{parse_float, BlockSpec, Extracted, Extraction, RowParse};
use crate::error::{MalformedRecordWarning, Result, WanbridgeError};
use crate::models::{Column, ConvergenceRecord};

use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// 收敛表结构描述
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// 表名（用于诊断信息）
    pub name: String,
    /// 必须同时出现在表头行上的两个列标签
    required: [Column; 2],
    /// 可识别的全部列
    columns: Vec<Column>,
    /// 表结束短语
    terminal: Vec<String>,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        required: [Column; 2],
        columns: Vec<Column>,
        terminal: &[&str],
    ) -> Self {
        TableSchema {
            name: name.into(),
            required,
            columns,
            terminal: terminal.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Wannier 局域化 (CONV) 表
    pub fn wannierise() -> Self {
        TableSchema::new(
            "wannierisation",
            [Column::RmsGradient, Column::Spread],
            vec![
                Column::Iteration,
                Column::DeltaSpread,
                Column::RmsGradient,
                Column::Spread,
                Column::Time,
            ],
            &["Final State", "Total Execution Time", "All done"],
        )
    }

    /// 解纠缠 (DIS) 表
    pub fn disentangle() -> Self {
        TableSchema::new(
            "disentanglement",
            [Column::OmegaIPrevious, Column::OmegaI],
            vec![
                Column::Iteration,
                Column::OmegaIPrevious,
                Column::OmegaI,
                Column::DeltaFraction,
                Column::Time,
            ],
            &[
                "convergence criteria satisfied",
                "Final Omega_I",
                "Time to disentangle",
            ],
        )
    }

    pub fn is_header(&self, line: &str) -> bool {
        self.required.iter().all(|c| line.contains(c.label()))
    }

    fn is_terminal(&self, line: &str) -> bool {
        self.terminal.iter().any(|t| line.contains(t.as_str()))
    }

    /// 从表头行确定各列的 token 序号
    ///
    /// 表头按两个以上空白或 `|` 切分成列；未识别的列保留为 `HeaderLabel::Unknown`
    /// 占位，使其后各列仍对应真实的 token 序号。无法切分的列标签返回 `SchemaError`。
    pub fn detect_layout(&self, header: &str) -> Result<TableLayout> {
        let body = match header.find("<--") {
            Some(at) => &header[..at],
            None => header,
        };

        let mut labels: Vec<HeaderLabel> = Vec::new();
        for cell in body
            .split('|')
            .flat_map(|part| cell_gap_regex().split(part))
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            labels.extend(self.split_cell(cell)?);
        }

        if labels.first() != Some(&HeaderLabel::Known(Column::Iteration)) {
            return Err(self.header_error(format!(
                "first column must be '{}' (header: '{}')",
                Column::Iteration,
                body.trim()
            )));
        }
        for (i, label) in labels.iter().enumerate() {
            if let HeaderLabel::Known(c) = label {
                if labels[..i].contains(label) {
                    return Err(self.header_error(format!("column '{}' appears twice", c)));
                }
            }
        }

        let layout = TableLayout { labels };
        for &column in &self.required {
            if layout.position(column).is_none() {
                return Err(self.header_error(format!("column '{}' not found in header", column)));
            }
        }
        Ok(layout)
    }

    /// 一个表头单元可能由单空格隔开的多个已知标签组成
    fn split_cell(&self, cell: &str) -> Result<Vec<HeaderLabel>> {
        let mut labels = Vec::new();
        let mut rest = cell;
        while !rest.is_empty() {
            let known = self
                .columns
                .iter()
                .copied()
                .filter(|c| label_at(rest, 0, c.label()))
                .max_by_key(|c| c.label().len());
            match known {
                Some(column) => {
                    labels.push(HeaderLabel::Known(column));
                    rest = rest[column.label().len()..].trim_start();
                }
                None => {
                    if let Some(column) = self.columns.iter().find(|c| contains_label(rest, c.label())) {
                        return Err(self.header_error(format!(
                            "cannot separate '{}' from unknown text in header cell '{}'",
                            column, cell
                        )));
                    }
                    labels.push(HeaderLabel::Unknown(rest.to_string()));
                    break;
                }
            }
        }
        Ok(labels)
    }

    fn header_error(&self, reason: String) -> WanbridgeError {
        WanbridgeError::schema(format!("{} log", self.name), reason)
    }
}

fn cell_gap_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("valid header gap regex"))
}

/// `text[at..]` 以完整的 `label` 开头（其后为空白或结尾）
fn label_at(text: &str, at: usize, label: &str) -> bool {
    text[at..].starts_with(label)
        && text[at + label.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
}

/// `label` 作为独立词出现在 `text` 中
fn contains_label(text: &str, label: &str) -> bool {
    text.match_indices(label).any(|(at, _)| {
        let word_start = text[..at].chars().next_back().map_or(true, char::is_whitespace);
        word_start && label_at(text, at, label)
    })
}

/// 表头中的一列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLabel {
    Known(Column),
    /// 未识别的列，只占一个 token 位置
    Unknown(String),
}

/// 检测得到的列布局，按 token 顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub labels: Vec<HeaderLabel>,
}

impl TableLayout {
    /// 一条记录至少需要的 token 数
    pub fn min_tokens(&self) -> usize {
        self.labels.len()
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| *l == HeaderLabel::Known(column))
    }
}

/// 表内数据行：首个 token 为整数迭代号；行尾 `<-- TAG` 被忽略
fn table_row(line: &str) -> RowParse {
    let body = match line.find("<--") {
        Some(at) => &line[..at],
        None => line,
    };

    let mut tokens = body.split_whitespace();
    let iteration = match tokens.next().and_then(|t| t.parse::<u64>().ok()) {
        Some(i) => i,
        None => return RowParse::Skip,
    };

    let mut fields = vec![iteration as f64];
    for token in tokens {
        match parse_float(token) {
            Some(v) => fields.push(v),
            None => return RowParse::Malformed(format!("non-numeric value '{}'", token)),
        }
    }
    RowParse::Data(fields)
}

/// 解析收敛表
///
/// 找不到表头时返回 `SchemaError`；找到表头但没有记录时返回空结果。
/// 遇到结束短语或迭代号不再递增时停止，越序的那一行不计入。
pub fn parse_convergence(text: &str, schema: &TableSchema) -> Result<Extraction<ConvergenceRecord>> {
    if !text.lines().any(|l| schema.is_header(l)) {
        return Err(WanbridgeError::schema(
            format!("{} log", schema.name),
            format!(
                "no header line with both '{}' and '{}'",
                schema.required[0], schema.required[1]
            ),
        ));
    }

    let spec = BlockSpec::new(|l| schema.is_header(l), table_row).stop_at(|l| schema.is_terminal(l));

    let mut records: Vec<ConvergenceRecord> = Vec::new();
    let mut warnings: Vec<MalformedRecordWarning> = Vec::new();
    let mut layout: Option<TableLayout> = None;

    for item in spec.extract(text) {
        match item {
            Extracted::BlockStart { header, line, .. } => {
                if !records.is_empty() {
                    debug!("Second {} table header at line {}; stopping", schema.name, line);
                    break;
                }
                let detected = schema.detect_layout(header.unwrap_or_default())?;
                debug!("Detected {} columns: {:?}", schema.name, detected.labels);
                for label in &detected.labels {
                    if let HeaderLabel::Unknown(name) = label {
                        warn!("Unrecognized {} column '{}' at line {}", schema.name, name, line);
                    }
                }
                layout = Some(detected);
            }
            Extracted::Row(row) => {
                let layout = match &layout {
                    Some(l) => l,
                    None => continue,
                };
                if row.len() < layout.min_tokens() {
                    warnings.push(MalformedRecordWarning {
                        line: row.line,
                        content: format!("{:?}", row.fields),
                        reason: format!(
                            "expected at least {} columns, found {}",
                            layout.min_tokens(),
                            row.len()
                        ),
                    });
                    continue;
                }

                let iteration = row.fields[0] as u64;
                if let Some(prev) = records.last() {
                    if iteration <= prev.iteration {
                        debug!(
                            "Iteration index {} after {} at line {}; table ends",
                            iteration, prev.iteration, row.line
                        );
                        break;
                    }
                }

                let values: BTreeMap<Column, f64> = schema
                    .columns
                    .iter()
                    .filter(|&&c| c != Column::Iteration)
                    .filter_map(|&c| Some((c, row.get(layout.position(c)?)?)))
                    .collect();
                records.push(ConvergenceRecord { iteration, values });
            }
            Extracted::Malformed(w) => warnings.push(w),
        }
    }

    if !warnings.is_empty() {
        warn!("Skipped {} malformed rows in {} table", warnings.len(), schema.name);
    }

    Ok(Extraction { records, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WOUT: &str = "
 Starting a new Wannier90 calculation ...
 +--------------------------------------------------------------------+<-- CONV
 | Iter  Delta Spread     RMS Gradient      Spread (Ang^2)      Time  |<-- CONV
 +--------------------------------------------------------------------+<-- CONV

      0     0.317E+02     0.0000000000       31.7165052476       0.03  <-- CONV
        O_D=      1.2345678 O_OD=      3.4567890 O_TOT=     31.7165052 <-- SPRD
 ------------------------------------------------------------------------------
 Cycle:      1
  WF centre and spread    1  ( -0.000000,  1.500000,  0.000000 )     2.34567
      1    -0.292E+01     0.2133926066       28.7942315431       0.04  <-- CONV
      2    -0.100E+00     0.0100000000       28.6942315431       0.05  <-- CONV
      3    -0.050E+00     0.0050000000       28.6442315431       0.06  <-- CONV
      4    -0.010E+00     0.0010000000       28.6342315431       0.07  <-- CONV
      5    -0.001E+00     0.0001000000       28.6332315431       0.08  <-- CONV
      2    -0.001E+00     0.0001000000       99.0000000000       0.09  <-- CONV
      6    -0.001E+00     0.0001000000       28.6322315431       0.10  <-- CONV
";

    #[test]
    fn test_decreasing_iteration_ends_table() {
        let table = parse_convergence(WOUT, &TableSchema::wannierise()).unwrap();

        assert_eq!(table.records.len(), 6);
        assert_eq!(table.records.last().unwrap().iteration, 5);
        assert!(table
            .records
            .iter()
            .all(|r| r.get(Column::Spread) != Some(99.0)));
    }

    #[test]
    fn test_columns_follow_header() {
        let table = parse_convergence(WOUT, &TableSchema::wannierise()).unwrap();
        let first = &table.records[0];

        assert_eq!(first.iteration, 0);
        assert!((first.get(Column::DeltaSpread).unwrap() - 31.7).abs() < 1e-9);
        assert!((first.get(Column::Spread).unwrap() - 31.7165052476).abs() < 1e-9);
        assert!((first.get(Column::Time).unwrap() - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_reordered_header_changes_column_identity() {
        let text = "\
 | Iter  Spread (Ang^2)   RMS Gradient   Delta Spread   Time |<-- CONV
      1    28.79     0.21    -2.92     0.04  <-- CONV
      2    28.69     0.01    -0.10     0.05  <-- CONV
 All done: wannier90 exiting
      3    28.00     0.01    -0.10     0.05  <-- CONV
";
        let table = parse_convergence(text, &TableSchema::wannierise()).unwrap();

        assert_eq!(table.records.len(), 2);
        assert!((table.records[0].get(Column::Spread).unwrap() - 28.79).abs() < 1e-9);
        assert!((table.records[0].get(Column::DeltaSpread).unwrap() - (-2.92)).abs() < 1e-9);
    }

    #[test]
    fn test_detect_layout_ignores_nested_labels() {
        let schema = TableSchema::wannierise();
        let layout = schema
            .detect_layout(" | Iter  Delta Spread     RMS Gradient      Spread (Ang^2)      Time  |<-- CONV")
            .unwrap();
        assert_eq!(
            layout.labels,
            vec![
                HeaderLabel::Known(Column::Iteration),
                HeaderLabel::Known(Column::DeltaSpread),
                HeaderLabel::Known(Column::RmsGradient),
                HeaderLabel::Known(Column::Spread),
                HeaderLabel::Known(Column::Time)
            ]
        );
        assert_eq!(layout.position(Column::Spread), Some(3));
    }

    #[test]
    fn test_unknown_column_keeps_true_positions() {
        let text = "\
 | Iter  Delta Spread  Omega_D (Ang^2)  RMS Gradient  Spread (Ang^2)  Time |<-- CONV
      1    -2.92     5.55     0.21     28.79     0.04  <-- CONV
      2    -0.10     5.50     0.01     28.69     0.05  <-- CONV
";
        let table = parse_convergence(text, &TableSchema::wannierise()).unwrap();
        let first = &table.records[0];

        assert_eq!(table.records.len(), 2);
        assert!(table.warnings.is_empty());
        assert!((first.get(Column::DeltaSpread).unwrap() - (-2.92)).abs() < 1e-9);
        assert!((first.get(Column::RmsGradient).unwrap() - 0.21).abs() < 1e-9);
        assert!((first.get(Column::Spread).unwrap() - 28.79).abs() < 1e-9);
        assert!((first.get(Column::Time).unwrap() - 0.04).abs() < 1e-9);

        let layout = TableSchema::wannierise()
            .detect_layout(text.lines().next().unwrap())
            .unwrap();
        assert_eq!(layout.labels[2], HeaderLabel::Unknown("Omega_D (Ang^2)".to_string()));
        assert_eq!(layout.min_tokens(), 6);
    }

    #[test]
    fn test_inseparable_header_label_is_schema_error() {
        let text = "| Iter  Delta Spread  RMS Gradient  Omega_D Spread (Ang^2)  Time |\n  1  0.1  0.2  0.3  0.4\n";
        let result = parse_convergence(text, &TableSchema::wannierise());
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_single_spaced_known_labels_are_split() {
        let layout = TableSchema::wannierise()
            .detect_layout("| Iter Delta Spread RMS Gradient Spread (Ang^2) Time |")
            .unwrap();
        assert_eq!(layout.position(Column::Spread), Some(3));
        assert_eq!(layout.position(Column::Time), Some(4));
    }

    #[test]
    fn test_short_row_is_warning() {
        let text = "| Iter  Delta Spread  RMS Gradient  Spread (Ang^2)  Time |\n  1  0.1  0.2\n  2  0.1 0.2 0.3 0.4\n";
        let table = parse_convergence(text, &TableSchema::wannierise()).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_missing_header_is_schema_error() {
        let result = parse_convergence("  1  0.1  0.2  0.3  0.4\n", &TableSchema::wannierise());
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_header_without_rows_is_empty_result() {
        let text = "| Iter  Delta Spread  RMS Gradient  Spread (Ang^2)  Time |\n Final State\n";
        let table = parse_convergence(text, &TableSchema::wannierise()).unwrap();
        assert!(table.is_empty());
        assert!(table.notice("iterations").is_some());
    }

    #[test]
    fn test_disentanglement_table() {
        let text = "\
 |  Iter     Omega_I(i-1)      Omega_I(i)      Delta (frac.)    Time   |<-- DIS
      1     292.37516095     292.37370258       4.988E-06     34.11    <-- DIS
      2     292.37370258     292.37300000       2.403E-06     34.20    <-- DIS
            <<< Disentanglement convergence criteria satisfied >>>
";
        let table = parse_convergence(text, &TableSchema::disentangle()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert!((table.records[1].get(Column::OmegaI).unwrap() - 292.373).abs() < 1e-9);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let schema = TableSchema::wannierise();
        let a = parse_convergence(WOUT, &schema).unwrap();
        let b = parse_convergence(WOUT, &schema).unwrap();
        assert_eq!(a, b);
    }
}
