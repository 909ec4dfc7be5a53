//! # k 点与 k 点网格数据模型
//!
//! 网格一旦生成，其点序即固定；所有输出格式都从同一个 `KMesh` 序列化。
//!
//! ## 依赖关系
//! - 被 `kmesh/` 和 `parsers/pw_out.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 倒格子基矢方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    First,
    Second,
    Third,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::First => 0,
            Axis::Second => 1,
            Axis::Third => 2,
        }
    }

    /// 给定最快轴，返回 (最快, 中间, 最慢) 三个轴
    ///
    /// 中间轴总是与最快轴相邻；最快轴为 `Second` 时取 `First` 为中间轴。
    pub fn nesting(self) -> [Axis; 3] {
        match self {
            Axis::First => [Axis::First, Axis::Second, Axis::Third],
            Axis::Second => [Axis::Second, Axis::First, Axis::Third],
            Axis::Third => [Axis::Third, Axis::Second, Axis::First],
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::First => write!(f, "k1"),
            Axis::Second => write!(f, "k2"),
            Axis::Third => write!(f, "k3"),
        }
    }
}

/// 分数坐标 k 点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KPoint {
    /// 分数坐标，范围 [0, 1)
    pub frac: [f64; 3],
    pub weight: Option<f64>,
}

impl KPoint {
    pub fn new(frac: [f64; 3]) -> Self {
        KPoint { frac, weight: None }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// 在给定小数位数下是否与另一个点相同
    pub fn same_as(&self, other: &KPoint, decimals: u8) -> bool {
        let tol = 0.5 * 10f64.powi(-(decimals as i32));
        self.frac
            .iter()
            .zip(other.frac.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

/// 规则 k 点网格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMesh {
    /// 三个方向的网格数 (N1, N2, N3)
    pub dims: [usize; 3],
    /// 变化最快的轴
    pub fastest: Axis,
    /// 按生成顺序排列的点
    pub points: Vec<KPoint>,
}

impl KMesh {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 均匀权重 1/(N1·N2·N3)
    pub fn uniform_weight(&self) -> f64 {
        1.0 / (self.dims[0] * self.dims[1] * self.dims[2]) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_keeps_middle_adjacent() {
        assert_eq!(Axis::First.nesting(), [Axis::First, Axis::Second, Axis::Third]);
        assert_eq!(Axis::Third.nesting(), [Axis::Third, Axis::Second, Axis::First]);
        assert_eq!(Axis::Second.nesting()[0], Axis::Second);
    }

    #[test]
    fn test_same_as_respects_precision() {
        let a = KPoint::new([0.1, 0.2, 0.3]);
        let b = KPoint::new([0.1000001, 0.2, 0.3]);
        assert!(a.same_as(&b, 6));
        assert!(!a.same_as(&b, 8));
    }
}
