//! # 收敛表数据模型
//!
//! 迭代优化日志中的一行记录。列含义由表头检测得到，不依赖固定位置。
//!
//! ## 依赖关系
//! - 被 `parsers/wout.rs` 构造
//! - 被 `commands/spread.rs` 使用

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 收敛表中可识别的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Iteration,
    DeltaSpread,
    RmsGradient,
    /// 总 spread (Å²)
    Spread,
    OmegaIPrevious,
    OmegaI,
    DeltaFraction,
    Time,
}

impl Column {
    /// 表头中的列标签
    pub fn label(self) -> &'static str {
        match self {
            Column::Iteration => "Iter",
            Column::DeltaSpread => "Delta Spread",
            Column::RmsGradient => "RMS Gradient",
            Column::Spread => "Spread (Ang^2)",
            Column::OmegaIPrevious => "Omega_I(i-1)",
            Column::OmegaI => "Omega_I(i)",
            Column::DeltaFraction => "Delta (frac.)",
            Column::Time => "Time",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 单次迭代记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceRecord {
    pub iteration: u64,
    pub values: BTreeMap<Column, f64>,
}

impl ConvergenceRecord {
    pub fn get(&self, column: Column) -> Option<f64> {
        self.values.get(&column).copied()
    }
}
