//! # 通用数据块提取器
//!
//! 从半结构化文本中按 "起始标记 / 终止标记 / 行解析器" 提取有序数值记录。
//!
//! ## 行为约定
//! ```text
//! ...无关文本...          <- 忽略
//! START 标记行            <- 开启新块（再次出现时重新开启一个新块）
//!   1.0  2.0  3.0        <- 数据行
//!   some text            <- 非数值行：跳过并给出 MalformedRecordWarning
//!   4.0  5.0             <- 数据行
//! STOP 标记行             <- 关闭当前块，直到下一个 START 之前的行都被忽略
//! ```
//!
//! 提取是惰性的（`Extractor` 为迭代器），每次调用独立，不保留也不修改输入。
//!
//! ## 依赖关系
//! - 被 `parsers/bands.rs`, `parsers/wout.rs`, `parsers/pw_out.rs`, `kmesh/dialect.rs` 使用
//! - 使用 `error.rs` 中的诊断类型

use crate::error::{EmptyResultNotice, MalformedRecordWarning};

use std::iter::Enumerate;
use std::str::Lines;

/// 单行解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowParse {
    /// 数据行，字段按出现顺序编号
    Data(Vec<f64>),
    /// 不是数据行（空行、注释等），静默跳过
    Skip,
    /// 本应是数据行但无法解析
    Malformed(String),
}

type Predicate<'a> = Box<dyn Fn(&str) -> bool + 'a>;
type RowParser<'a> = Box<dyn Fn(&str) -> RowParse + 'a>;

/// 数据块提取配置
pub struct BlockSpec<'a> {
    start: Predicate<'a>,
    stop: Option<Predicate<'a>>,
    row: RowParser<'a>,
    open_at_start: bool,
}

impl<'a> BlockSpec<'a> {
    pub fn new<S, R>(start: S, row: R) -> Self
    where
        S: Fn(&str) -> bool + 'a,
        R: Fn(&str) -> RowParse + 'a,
    {
        BlockSpec {
            start: Box::new(start),
            stop: None,
            row: Box::new(row),
            open_at_start: false,
        }
    }

    /// 设置终止标记
    pub fn stop_at<E>(mut self, stop: E) -> Self
    where
        E: Fn(&str) -> bool + 'a,
    {
        self.stop = Some(Box::new(stop));
        self
    }

    /// 第一行之前即视为已开启一个块（无显式起始标记的格式）
    pub fn open_at_start(mut self) -> Self {
        self.open_at_start = true;
        self
    }

    /// 惰性提取
    pub fn extract<'s, 't>(&'s self, text: &'t str) -> Extractor<'s, 'a, 't> {
        Extractor {
            spec: self,
            lines: text.lines().enumerate(),
            block: None,
            in_block: false,
            pending_implicit: self.open_at_start,
        }
    }

    /// 提取并按块分组
    pub fn collect_blocks<'t>(&self, text: &'t str) -> Extraction<Block<'t>> {
        let mut blocks: Vec<Block<'t>> = Vec::new();
        let mut warnings = Vec::new();

        for item in self.extract(text) {
            match item {
                Extracted::BlockStart { line, header, .. } => blocks.push(Block {
                    header,
                    line,
                    rows: Vec::new(),
                }),
                Extracted::Row(row) => {
                    if let Some(block) = blocks.last_mut() {
                        block.rows.push(row);
                    }
                }
                Extracted::Malformed(w) => warnings.push(w),
            }
        }

        Extraction {
            records: blocks,
            warnings,
        }
    }
}

/// 一行数据记录：字段序号 → 浮点数
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 所属块序号（从 0 开始）
    pub block: usize,
    /// 行号（从 1 开始）
    pub line: usize,
    pub fields: Vec<f64>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<f64> {
        self.fields.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 提取器产出的事件
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<'t> {
    /// 开启新块；隐式开启的块没有标记行
    BlockStart {
        block: usize,
        line: usize,
        header: Option<&'t str>,
    },
    Row(Row),
    Malformed(MalformedRecordWarning),
}

/// 惰性提取迭代器
pub struct Extractor<'s, 'a, 't> {
    spec: &'s BlockSpec<'a>,
    lines: Enumerate<Lines<'t>>,
    block: Option<usize>,
    in_block: bool,
    pending_implicit: bool,
}

impl<'s, 'a, 't> Extractor<'s, 'a, 't> {
    fn open_block(&mut self, line: usize, header: Option<&'t str>) -> Extracted<'t> {
        let block = self.block.map(|b| b + 1).unwrap_or(0);
        self.block = Some(block);
        self.in_block = true;
        Extracted::BlockStart {
            block,
            line,
            header,
        }
    }
}

impl<'s, 'a, 't> Iterator for Extractor<'s, 'a, 't> {
    type Item = Extracted<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_implicit {
            self.pending_implicit = false;
            return Some(self.open_block(0, None));
        }

        loop {
            let (idx, line) = self.lines.next()?;
            let line_no = idx + 1;

            if (self.spec.start)(line) {
                return Some(self.open_block(line_no, Some(line)));
            }

            if !self.in_block {
                continue;
            }

            if let Some(stop) = &self.spec.stop {
                if stop(line) {
                    self.in_block = false;
                    continue;
                }
            }

            match (self.spec.row)(line) {
                RowParse::Data(fields) => {
                    return Some(Extracted::Row(Row {
                        block: self.block.unwrap_or(0),
                        line: line_no,
                        fields,
                    }))
                }
                RowParse::Skip => continue,
                RowParse::Malformed(reason) => {
                    return Some(Extracted::Malformed(MalformedRecordWarning {
                        line: line_no,
                        content: line.to_string(),
                        reason,
                    }))
                }
            }
        }
    }
}

/// 分组后的数据块
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'t> {
    /// 起始标记行
    pub header: Option<&'t str>,
    /// 起始标记行号（隐式块为 0）
    pub line: usize,
    pub rows: Vec<Row>,
}

/// 提取结果：记录 + 逐行诊断
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub warnings: Vec<MalformedRecordWarning>,
}

impl<T> Extraction<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 没有记录时给出提示
    pub fn notice(&self, what: &str) -> Option<EmptyResultNotice> {
        if self.records.is_empty() {
            Some(EmptyResultNotice {
                what: what.to_string(),
            })
        } else {
            None
        }
    }

    pub fn map<U, F>(self, f: F) -> Extraction<U>
    where
        F: FnOnce(Vec<T>) -> Vec<U>,
    {
        Extraction {
            records: f(self.records),
            warnings: self.warnings,
        }
    }
}

/// 解析浮点数，兼容 Fortran 的 `D` 指数
pub fn parse_float(token: &str) -> Option<f64> {
    match token.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) if token.contains(['D', 'd']) => token.replace(['D', 'd'], "E").parse().ok(),
        Err(_) => None,
    }
}

/// 通用数值行：空行跳过，全部字段可解析为浮点数则为数据行
pub fn numeric_row(line: &str) -> RowParse {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return RowParse::Skip;
    }

    let mut fields = Vec::new();
    for token in trimmed.split_whitespace() {
        match parse_float(token) {
            Some(v) => fields.push(v),
            None => return RowParse::Malformed(format!("non-numeric token '{}'", token)),
        }
    }
    RowParse::Data(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_spec<'a>() -> BlockSpec<'a> {
        BlockSpec::new(|l| l.trim() == "BEGIN", numeric_row).stop_at(|l| l.trim() == "END")
    }

    #[test]
    fn test_lines_outside_blocks_are_ignored() {
        let text = "noise 1\nBEGIN\n1 2\nEND\n3 4\n";
        let spec = marker_spec();
        let blocks = spec.collect_blocks(text);

        assert_eq!(blocks.records.len(), 1);
        assert_eq!(blocks.records[0].rows.len(), 1);
        assert_eq!(blocks.records[0].rows[0].fields, vec![1.0, 2.0]);
        assert!(blocks.warnings.is_empty());
    }

    #[test]
    fn test_repeated_start_marker_restarts_block() {
        let text = "BEGIN\n1\n2\nBEGIN\n3\n";
        let spec = marker_spec();
        let blocks = spec.collect_blocks(text);

        assert_eq!(blocks.records.len(), 2);
        assert_eq!(blocks.records[0].rows.len(), 2);
        assert_eq!(blocks.records[1].rows[0].block, 1);
        assert_eq!(blocks.records[1].header, Some("BEGIN"));
        assert_eq!(blocks.records[1].line, 4);
    }

    #[test]
    fn test_empty_block_is_legal() {
        let spec = marker_spec();
        let blocks = spec.collect_blocks("BEGIN\nEND\n");

        assert_eq!(blocks.records.len(), 1);
        assert!(blocks.records[0].rows.is_empty());
        assert!(blocks.notice("rows").is_none());
        assert!(spec.collect_blocks("").notice("blocks").is_some());
    }

    #[test]
    fn test_malformed_row_is_skipped_not_fatal() {
        let text = "BEGIN\n1 2\noops 3\n4 5\nEND\n";
        let spec = marker_spec();
        let blocks = spec.collect_blocks(text);

        assert_eq!(blocks.records[0].rows.len(), 2);
        assert_eq!(blocks.warnings.len(), 1);
        assert_eq!(blocks.warnings[0].line, 3);
        assert_eq!(blocks.records[0].rows[1].get(1), Some(5.0));
    }

    #[test]
    fn test_extraction_is_lazy() {
        let text = "BEGIN\n1\n2\n3\n";
        let spec = marker_spec();
        let first_row = spec.extract(text).find_map(|e| match e {
            Extracted::Row(r) => Some(r),
            _ => None,
        });
        assert_eq!(first_row.map(|r| r.line), Some(2));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "BEGIN\n1 2\nbad\nBEGIN\n3 4\n";
        let spec = marker_spec();
        assert_eq!(spec.collect_blocks(text), spec.collect_blocks(text));
    }

    #[test]
    fn test_parse_fortran_float() {
        assert_eq!(parse_float("0.5D+01"), Some(5.0));
        assert_eq!(parse_float("-1.25"), Some(-1.25));
        assert_eq!(parse_float("abc"), None);
    }
}
