//! # 规则 k 点网格生成
//!
//! 坐标为 index/Ni。最快轴每一步都变化，中间轴每 N(fast) 步变化一次，
//! 最慢轴每 N(fast)·N(mid) 步变化一次。
//!
//! ## 依赖关系
//! - 被 `kmesh/dialect.rs`, `kmesh/patch.rs`, `commands/kmesh.rs` 使用
//! - 使用 `models/kpoint.rs`

use crate::error::{Result, WanbridgeError};
use crate::models::{Axis, KMesh, KPoint};

use log::debug;

/// 网格参数
///
/// 最快轴必须显式给出，不提供默认值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSpec {
    dims: [usize; 3],
    fastest: Axis,
}

impl MeshSpec {
    pub fn new(dims: [usize; 3], fastest: Axis) -> Result<Self> {
        if let Some(pos) = dims.iter().position(|&n| n < 1) {
            return Err(WanbridgeError::ConfigError(format!(
                "mesh dimension N{} must be at least 1 (got {:?})",
                pos + 1,
                dims
            )));
        }
        Ok(MeshSpec { dims, fastest })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn fastest(&self) -> Axis {
        self.fastest
    }

    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 生成网格
    pub fn generate(&self) -> KMesh {
        let [fast, mid, slow] = self.fastest.nesting();
        let n = |axis: Axis| self.dims[axis.index()];
        let weight = 1.0 / self.len() as f64;

        let mut points = Vec::with_capacity(self.len());
        for i_slow in 0..n(slow) {
            for i_mid in 0..n(mid) {
                for i_fast in 0..n(fast) {
                    let mut index = [0usize; 3];
                    index[slow.index()] = i_slow;
                    index[mid.index()] = i_mid;
                    index[fast.index()] = i_fast;

                    let frac = [
                        index[0] as f64 / self.dims[0] as f64,
                        index[1] as f64 / self.dims[1] as f64,
                        index[2] as f64 / self.dims[2] as f64,
                    ];
                    points.push(KPoint::new(frac).with_weight(weight));
                }
            }
        }

        debug!(
            "Generated {}x{}x{} mesh, {} fastest: {} points",
            self.dims[0],
            self.dims[1],
            self.dims[2],
            self.fastest,
            points.len()
        );

        KMesh {
            dims: self.dims,
            fastest: self.fastest,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AXES: [Axis; 3] = [Axis::First, Axis::Second, Axis::Third];

    #[test]
    fn test_zero_dimension_is_config_error() {
        assert!(matches!(
            MeshSpec::new([4, 0, 1], Axis::First),
            Err(WanbridgeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_count_and_uniqueness_for_every_axis() {
        for axis in AXES {
            let mesh = MeshSpec::new([3, 4, 2], axis).unwrap().generate();
            assert_eq!(mesh.len(), 24);

            for (i, a) in mesh.points.iter().enumerate() {
                assert!(a.frac.iter().all(|&x| (0.0..1.0).contains(&x)));
                for b in &mesh.points[i + 1..] {
                    assert!(!a.same_as(b, 8), "duplicate point {:?} for {}", a.frac, axis);
                }
            }
        }
    }

    #[test]
    fn test_first_axis_fastest_order() {
        let mesh = MeshSpec::new([2, 2, 1], Axis::First).unwrap().generate();
        let frac: Vec<[f64; 3]> = mesh.points.iter().map(|p| p.frac).collect();

        assert_eq!(
            frac,
            vec![
                [0.0, 0.0, 0.0],
                [0.5, 0.0, 0.0],
                [0.0, 0.5, 0.0],
                [0.5, 0.5, 0.0],
            ]
        );
    }

    #[test]
    fn test_third_axis_fastest_order() {
        let mesh = MeshSpec::new([2, 1, 2], Axis::Third).unwrap().generate();
        assert_eq!(mesh.points[1].frac, [0.0, 0.0, 0.5]);
        assert_eq!(mesh.points[2].frac, [0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_second_axis_fastest_uses_first_as_middle() {
        let mesh = MeshSpec::new([2, 2, 2], Axis::Second).unwrap().generate();
        assert_eq!(mesh.points[1].frac, [0.0, 0.5, 0.0]);
        assert_eq!(mesh.points[2].frac, [0.5, 0.0, 0.0]);
        assert_eq!(mesh.points[4].frac, [0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_uniform_weights() {
        let mesh = MeshSpec::new([2, 2, 2], Axis::First).unwrap().generate();
        let total: f64 = mesh.points.iter().filter_map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((mesh.uniform_weight() - 0.125).abs() < 1e-15);
    }
}
