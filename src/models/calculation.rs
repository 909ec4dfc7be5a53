//! # pw.x 计算结果数据模型
//!
//! 存储截断能收敛测试中每个 pw.x 输出提取的信息。
//!
//! ## 依赖关系
//! - 被 `parsers/pw_out.rs` 构造
//! - 被 `cutoff/`, `commands/cutoff.rs` 使用

use serde::{Deserialize, Serialize};

/// Rydberg → eV
pub const EV_PER_RY: f64 = 13.605_693_122_994;

/// 单个 SCF 输出的提取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScfResult {
    /// 来源文件
    pub source: String,

    /// 计算是否完成（出现 JOB DONE）
    pub is_finished: bool,

    /// 平面波截断能 ecutwfc (Ry)
    pub cutoff_ry: Option<f64>,

    /// 最终总能 (Ry)
    pub total_energy_ry: Option<f64>,
}

impl ScfResult {
    pub fn new(source: impl Into<String>) -> Self {
        ScfResult {
            source: source.into(),
            is_finished: false,
            cutoff_ry: None,
            total_energy_ry: None,
        }
    }
}

/// 收敛曲线上的一点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffPoint {
    #[serde(rename = "cutoff_Ry")]
    pub cutoff_ry: f64,
    #[serde(rename = "energy_Ry")]
    pub energy_ry: f64,
    /// 相对最高截断能的能量差 (eV)
    #[serde(rename = "delta_E_eV")]
    pub delta_ev: f64,
}
