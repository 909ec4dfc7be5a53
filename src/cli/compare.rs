//! # compare 子命令 CLI 定义
//!
//! 比较参考能带（如 DFT）与测试能带（如 Wannier 插值）
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use crate::parsers::BandFormat;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 能带文件格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BandFileFormat {
    /// Blank-line separated "distance energy" blocks (wannier90 *_band.dat)
    Gnuplot,
    /// pw.x standard output with "bands (ev):" blocks
    Pw,
}

impl From<BandFileFormat> for BandFormat {
    fn from(format: BandFileFormat) -> Self {
        match format {
            BandFileFormat::Gnuplot => BandFormat::Gnuplot,
            BandFileFormat::Pw => BandFormat::PwOutput,
        }
    }
}

/// 能带配对方式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PairingMode {
    /// Test band j against reference band j + offset
    Index,
    /// Greedy matching by energy at the start of the path
    Nearest,
}

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reference band file
    pub reference: PathBuf,

    /// Test band file
    pub test: PathBuf,

    /// Reference file format (inferred from the extension if omitted)
    #[arg(long, value_enum)]
    pub reference_format: Option<BandFileFormat>,

    /// Test file format (inferred from the extension if omitted)
    #[arg(long, value_enum)]
    pub test_format: Option<BandFileFormat>,

    /// How bands are paired
    #[arg(long, value_enum, default_value = "index")]
    pub pairing: PairingMode,

    /// Band index offset for index pairing (reference = test + offset)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: isize,

    /// Point-count ratio above which a diagnostic is printed
    #[arg(long, default_value_t = 4.0)]
    pub max_ratio: f64,

    /// Lower bound of the reference energy window (eV)
    #[arg(long, allow_hyphen_values = true)]
    pub emin: Option<f64>,

    /// Upper bound of the reference energy window (eV)
    #[arg(long, allow_hyphen_values = true)]
    pub emax: Option<f64>,

    /// Energy shift added to the test bands (eV)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub shift: f64,

    /// Export per-pair deviations to CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
