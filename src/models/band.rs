//! # 能带数据模型
//!
//! `Band` 是一条本征值分支上的 (路径距离, 能量) 序列；
//! `BandSet` 是共享同一条 k 路径的能带集合。
//!
//! ## 依赖关系
//! - 被 `parsers/bands.rs` 构造
//! - 被 `align/` 使用

use serde::{Deserialize, Serialize};

/// 单条能带
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// (路径距离, 能量 eV)，路径距离单调不减
    points: Vec<(f64, f64)>,
}

impl Band {
    /// 路径距离出现下降时返回 `None`
    pub fn new(points: Vec<(f64, f64)>) -> Option<Self> {
        if points.windows(2).any(|w| w[1].0 < w[0].0) {
            return None;
        }
        Some(Band { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn energies(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.1)
    }

    /// 路径起点处的能量
    pub fn first_energy(&self) -> Option<f64> {
        self.points.first().map(|p| p.1)
    }

    /// 路径跨度 (min, max)
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.0;
        let last = self.points.last()?.0;
        Some((first, last))
    }
}

/// 共享一条 k 路径的能带集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub bands: Vec<Band>,
}

impl BandSet {
    pub fn new(bands: Vec<Band>) -> Self {
        BandSet { bands }
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// 每条能带上的采样点数（取第一条能带）
    pub fn points_per_band(&self) -> usize {
        self.bands.first().map(Band::len).unwrap_or(0)
    }

    /// 所有能带的能量范围
    pub fn energy_range(&self) -> Option<(f64, f64)> {
        let mut energies = self.bands.iter().flat_map(|b| b.energies()).peekable();
        energies.peek()?;
        Some(energies.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e), hi.max(e))
        }))
    }
}
