//! # 解析器模块
//!
//! 提供 DFT / wannier90 输出格式的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/`, `kmesh/`, `cutoff/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: block (通用块提取), bands, wout, qe_xml, pw_out

pub mod bands;
pub mod block;
pub mod pw_out;
pub mod qe_xml;
pub mod wout;

use crate::error::{Result, WanbridgeError};
use crate::models::Band;
use block::Extraction;
use std::fs;
use std::path::Path;

/// 读取整个文本文件
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(WanbridgeError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| WanbridgeError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 能带文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandFormat {
    /// wannier90 `*_band.dat`
    Gnuplot,
    /// pw.x 标准输出
    PwOutput,
}

impl BandFormat {
    /// 从文件名推断格式：`.dat` / `.gnu` 为 gnuplot，其余视为 pw.x 输出
    pub fn infer(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "dat" | "gnu" => BandFormat::Gnuplot,
            _ => BandFormat::PwOutput,
        }
    }
}

/// 按格式读取能带文件
pub fn parse_bands_file(path: &Path, format: BandFormat) -> Result<Extraction<Band>> {
    let content = read_text(path)?;
    Ok(match format {
        BandFormat::Gnuplot => bands::read_gnuplot_bands(&content),
        BandFormat::PwOutput => bands::read_pw_bands(&content),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_format_inference() {
        assert_eq!(BandFormat::infer(Path::new("wte2_band.dat")), BandFormat::Gnuplot);
        assert_eq!(BandFormat::infer(Path::new("bands.GNU")), BandFormat::Gnuplot);
        assert_eq!(BandFormat::infer(Path::new("bands.out")), BandFormat::PwOutput);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = read_text(Path::new("/nonexistent/wanbridge/file.out"));
        assert!(matches!(result, Err(WanbridgeError::FileNotFound { .. })));
    }
}
