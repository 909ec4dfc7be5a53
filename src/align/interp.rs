//! # 路径归一化与线性插值
//!
//! ## 依赖关系
//! - 被 `align/aligner.rs` 使用
//! - 使用 `models/band.rs`

use crate::models::Band;

/// 路径已线性缩放到 [0, 1] 的能带
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBand {
    /// (t, E)，t 单调不减
    points: Vec<(f64, f64)>,
}

impl NormalizedBand {
    /// min-max 缩放；少于两个点或路径跨度为零时返回 `None`
    pub fn from_band(band: &Band, energy_shift: f64) -> Option<Self> {
        if band.len() < 2 {
            return None;
        }
        let (start, end) = band.span()?;
        let span = end - start;
        if !(span > 0.0) {
            return None;
        }

        let points = band
            .points()
            .iter()
            .map(|&(d, e)| ((d - start) / span, e + energy_shift))
            .collect();
        Some(NormalizedBand { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// 归一化路径的覆盖区间
    pub fn extent(&self) -> (f64, f64) {
        let lo = self.points.first().map(|p| p.0).unwrap_or(0.0);
        let hi = self.points.last().map(|p| p.0).unwrap_or(0.0);
        (lo, hi)
    }

    /// 在 t 处线性插值；超出覆盖区间返回 `None`
    ///
    /// 路径上重复的 t（高对称点处的断点）取第一个匹配点的能量。
    pub fn interpolate(&self, t: f64) -> Option<f64> {
        let (lo, hi) = self.extent();
        if t < lo || t > hi {
            return None;
        }

        let i = self.points.partition_point(|p| p.0 < t);
        let (t1, e1) = *self.points.get(i)?;
        if t1 == t || i == 0 {
            return Some(e1);
        }
        let (t0, e0) = self.points[i - 1];
        Some(e0 + (e1 - e0) * (t - t0) / (t1 - t0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(points: &[(f64, f64)]) -> Band {
        Band::new(points.to_vec()).unwrap()
    }

    #[test]
    fn test_normalization_to_unit_interval() {
        let b = band(&[(2.0, 1.0), (4.0, 2.0), (6.0, 3.0)]);
        let n = NormalizedBand::from_band(&b, 0.0).unwrap();
        let t: Vec<f64> = n.points().iter().map(|p| p.0).collect();
        assert_eq!(t, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_degenerate_paths_rejected() {
        assert!(NormalizedBand::from_band(&band(&[(1.0, 1.0)]), 0.0).is_none());
        assert!(NormalizedBand::from_band(&band(&[(1.0, 1.0), (1.0, 2.0)]), 0.0).is_none());
    }

    #[test]
    fn test_interpolation() {
        let n = NormalizedBand::from_band(&band(&[(0.0, 0.0), (1.0, 10.0)]), 0.5).unwrap();
        assert!((n.interpolate(0.25).unwrap() - 3.0).abs() < 1e-12);
        assert!((n.interpolate(1.0).unwrap() - 10.5).abs() < 1e-12);
        assert!(n.interpolate(1.1).is_none());
    }
}
