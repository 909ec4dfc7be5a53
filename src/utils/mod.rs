//! # 工具函数模块
//!
//! 提供美化输出、进度条、文件写出等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 模块使用
//! - 子模块: output, progress

pub mod output;
pub mod progress;

use crate::error::{Result, WanbridgeError};
use std::fs;
use std::path::Path;

/// 写出文本；`path` 为 `None` 时写到标准输出
pub fn write_text(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content).map_err(|e| WanbridgeError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// 将可序列化的记录写成 CSV
pub fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| WanbridgeError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
