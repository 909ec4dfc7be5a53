//! # 统一错误处理模块
//!
//! 定义 wanbridge 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - `ConfigError`: 生成参数非法，在任何 I/O 之前抛出
//! - `SchemaError`: 文档缺少必需的结构节点/表头，整份输入不可用
//! - `MalformedRecordWarning`: 单行解析失败，跳过该行并继续（不是错误）
//! - `EmptyResultNotice`: 扫描结构正常但没有记录（不是错误）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::fmt;
use thiserror::Error;

/// wanbridge 统一错误类型
#[derive(Error, Debug)]
pub enum WanbridgeError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 配置与结构错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Missing required structure in {document}: {reason}")]
    SchemaError { document: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

impl WanbridgeError {
    /// 构造 SchemaError
    pub fn schema(document: impl Into<String>, reason: impl Into<String>) -> Self {
        WanbridgeError::SchemaError {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, WanbridgeError>;

/// 数据块内单行无法解析。该行被跳过，序列继续。
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecordWarning {
    /// 行号（从 1 开始）
    pub line: usize,
    /// 原始行内容
    pub content: String,
    pub reason: String,
}

impl fmt::Display for MalformedRecordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} ({})",
            self.line,
            self.content.trim(),
            self.reason
        )
    }
}

/// 扫描成功但没有任何记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyResultNotice {
    pub what: String,
}

impl fmt::Display for EmptyResultNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no {} found", self.what)
    }
}
