//! # 原子结构数据模型
//!
//! 晶胞与原子位置统一以 bohr 存储；解析阶段完成单位换算。
//!
//! ## 依赖关系
//! - 被 `parsers/qe_xml.rs` 使用
//! - 被 `commands/structure.rs` 使用

use serde::{Deserialize, Serialize};

/// 1 Å 对应的 bohr 数
pub const BOHR_PER_ANGSTROM: f64 = 1.0 / 0.529_177_210_903;

/// 源文档中原子位置的单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionUnit {
    Bohr,
    Angstrom,
    /// 以晶胞基矢为单位的分数坐标
    Crystal,
}

impl std::fmt::Display for PositionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionUnit::Bohr => write!(f, "bohr"),
            PositionUnit::Angstrom => write!(f, "angstrom"),
            PositionUnit::Crystal => write!(f, "crystal"),
        }
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素/种类标签
    pub species: String,

    /// 笛卡尔坐标 (bohr)
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(species: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            species: species.into(),
            position,
        }
    }
}

/// 晶胞 + 原子列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicStructure {
    /// 晶格向量矩阵 (3x3)，行向量表示 a1, a2, a3 (bohr)
    pub cell: [[f64; 3]; 3],

    pub atoms: Vec<Atom>,
}

impl AtomicStructure {
    /// 按源单位构造，统一换算为 bohr
    ///
    /// `cell` 与 `positions` 都按 `unit` 解释；`Crystal` 时晶胞视为 bohr，
    /// 位置为分数坐标。
    pub fn from_source(
        cell: [[f64; 3]; 3],
        positions: Vec<(String, [f64; 3])>,
        unit: PositionUnit,
    ) -> Self {
        let scale = match unit {
            PositionUnit::Angstrom => BOHR_PER_ANGSTROM,
            PositionUnit::Bohr | PositionUnit::Crystal => 1.0,
        };
        let cell = cell.map(|row| row.map(|x| x * scale));

        let atoms = positions
            .into_iter()
            .map(|(species, p)| {
                let position = match unit {
                    PositionUnit::Crystal => frac_to_cart(&cell, p),
                    _ => p.map(|x| x * scale),
                };
                Atom::new(species, position)
            })
            .collect();

        AtomicStructure { cell, atoms }
    }

    /// 晶胞体积 (bohr³)
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.cell;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 输出为 pw.x 输入卡片格式
    pub fn to_pw_text(&self) -> String {
        let mut result = String::new();

        result.push_str("CELL_PARAMETERS (bohr)\n");
        for row in &self.cell {
            result.push_str(&format!(
                "{:16.10} {:16.10} {:16.10}\n",
                row[0], row[1], row[2]
            ));
        }

        result.push_str("ATOMIC_POSITIONS (bohr)\n");
        for atom in &self.atoms {
            result.push_str(&format!(
                "{:4} {:16.10} {:16.10} {:16.10}\n",
                atom.species, atom.position[0], atom.position[1], atom.position[2]
            ));
        }

        result
    }
}

fn frac_to_cart(cell: &[[f64; 3]; 3], frac: [f64; 3]) -> [f64; 3] {
    let mut cart = [0.0; 3];
    for (i, f) in frac.iter().enumerate() {
        for (j, c) in cart.iter_mut().enumerate() {
            *c += f * cell[i][j];
        }
    }
    cart
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> [[f64; 3]; 3] {
        [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]
    }

    #[test]
    fn test_angstrom_is_converted_to_bohr() {
        let s = AtomicStructure::from_source(
            cubic(1.0),
            vec![("Te".to_string(), [0.529_177_210_903, 0.0, 0.0])],
            PositionUnit::Angstrom,
        );
        assert!((s.cell[0][0] - BOHR_PER_ANGSTROM).abs() < 1e-9);
        assert!((s.atoms[0].position[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_crystal_positions_use_cell() {
        let s = AtomicStructure::from_source(
            cubic(10.0),
            vec![("W".to_string(), [0.5, 0.25, 0.0])],
            PositionUnit::Crystal,
        );
        assert_eq!(s.atoms[0].position, [5.0, 2.5, 0.0]);
    }

    #[test]
    fn test_volume_cubic() {
        let s = AtomicStructure::from_source(cubic(5.0), vec![], PositionUnit::Bohr);
        assert!((s.volume() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_pw_text_headers() {
        let s = AtomicStructure::from_source(
            cubic(1.0),
            vec![("W".to_string(), [0.0, 0.0, 0.0])],
            PositionUnit::Bohr,
        );
        let text = s.to_pw_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "CELL_PARAMETERS (bohr)");
        assert_eq!(lines[4], "ATOMIC_POSITIONS (bohr)");
        assert!(lines[5].starts_with("W"));
    }
}
