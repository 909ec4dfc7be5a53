//! # Quantum ESPRESSO XML 结构解析器
//!
//! 从 `data-file-schema.xml` 这类带标签的树形文档中提取晶胞与原子位置。
//! 与文本块提取器不同，这里缺少任何必需节点都是致命错误。
//!
//! ## 结构节点格式
//! ```text
//! <atomic_structure nat="3" alat="6.6">
//!   <atomic_positions>
//!     <atom name="W" index="1">0.0 0.0 0.0</atom>
//!   </atomic_positions>
//!   <cell>
//!     <a1>6.6 0.0 0.0</a1>
//!     <a2>0.0 11.9 0.0</a2>
//!     <a3>0.0 0.0 26.4</a3>
//!   </cell>
//! </atomic_structure>
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/structure.rs` 使用
//! - 使用 `models/structure.rs`
//! - 使用 `roxmltree` 解析 XML

use super::read_text;
use crate::error::{Result, WanbridgeError};
use crate::models::{AtomicStructure, PositionUnit};

use log::{debug, warn};
use roxmltree::{Document, Node};
use std::path::Path;

/// 结构节点路径
///
/// `a/b/c` 相对根元素逐级查找子元素；`//a/b` 先在全树中查找第一个 `a`。
/// 元素名按本地名比较，忽略命名空间前缀。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    descendant: bool,
    segments: Vec<String>,
}

impl TreePath {
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        let (descendant, rest) = match pattern.strip_prefix("//") {
            Some(rest) => (true, rest),
            None => (false, pattern.trim_start_matches("./")),
        };

        let segments: Vec<String> = rest
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if segments.is_empty() {
            return Err(WanbridgeError::ConfigError(format!(
                "empty structure path '{}'",
                pattern
            )));
        }

        Ok(TreePath {
            descendant,
            segments,
        })
    }

    fn resolve<'a, 'input>(&self, root: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
        let mut segments = self.segments.iter();
        let mut node = if self.descendant {
            let first = segments.next()?;
            root.descendants()
                .find(|n| n.is_element() && n.tag_name().name() == first.as_str())?
        } else {
            root
        };

        for segment in segments {
            node = child(node, segment)?;
        }
        Some(node)
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.descendant {
            write!(f, "//")?;
        }
        write!(f, "{}", self.segments.join("/"))
    }
}

/// 结构提取配置
#[derive(Debug, Clone)]
pub struct StructureQuery {
    pub path: TreePath,
    /// 源文档中晶胞与位置的单位
    pub unit: PositionUnit,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn parse_triple(text: &str) -> Option<[f64; 3]> {
    let values: Vec<f64> = text
        .split_whitespace()
        .map(|t| t.parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .ok()?;
    match values.as_slice() {
        [x, y, z] => Some([*x, *y, *z]),
        _ => None,
    }
}

/// 从 XML 文本提取结构
pub fn extract_structure(content: &str, document: &str, query: &StructureQuery) -> Result<AtomicStructure> {
    let doc = Document::parse(content)
        .map_err(|e| WanbridgeError::schema(document, format!("malformed XML: {}", e)))?;

    let structure = query.path.resolve(doc.root_element()).ok_or_else(|| {
        WanbridgeError::schema(document, format!("no structure node at '{}'", query.path))
    })?;

    // 晶胞
    let cell_node = child(structure, "cell")
        .ok_or_else(|| WanbridgeError::schema(document, "missing 'cell' element"))?;

    let mut cell = [[0.0; 3]; 3];
    for (row, tag) in cell.iter_mut().zip(["a1", "a2", "a3"]) {
        let vector = child(cell_node, tag)
            .ok_or_else(|| WanbridgeError::schema(document, format!("missing cell vector '{}'", tag)))?;
        *row = parse_triple(vector.text().unwrap_or_default()).ok_or_else(|| {
            WanbridgeError::schema(document, format!("cell vector '{}' is not a numeric triple", tag))
        })?;
    }

    // 原子位置
    let positions_node = child(structure, "atomic_positions")
        .ok_or_else(|| WanbridgeError::schema(document, "missing 'atomic_positions' element"))?;

    let mut positions = Vec::new();
    for (i, atom) in positions_node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "atom")
        .enumerate()
    {
        let name = atom.attribute("name").ok_or_else(|| {
            WanbridgeError::schema(document, format!("atom {} has no 'name' attribute", i + 1))
        })?;
        let position = parse_triple(atom.text().unwrap_or_default()).ok_or_else(|| {
            WanbridgeError::schema(document, format!("atom {} ({}) position is not a numeric triple", i + 1, name))
        })?;
        positions.push((name.to_string(), position));
    }

    if positions.is_empty() {
        warn!("'atomic_positions' in {} holds no atoms", document);
    }
    debug!("Extracted {} atoms from {} at '{}'", positions.len(), document, query.path);

    Ok(AtomicStructure::from_source(cell, positions, query.unit))
}

/// 解析 XML 文件
pub fn parse_structure_file(path: &Path, query: &StructureQuery) -> Result<AtomicStructure> {
    let content = read_text(path)?;
    extract_structure(&content, &path.display().to_string(), query)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<qes:espresso xmlns:qes="http://www.quantum-espresso.org/ns/qes/qes-1.0">
  <input>
    <atomic_structure nat="1">
      <atomic_positions>
        <atom name="X" index="1">9.0 9.0 9.0</atom>
      </atomic_positions>
      <cell>
        <a1>2.0 0.0 0.0</a1>
        <a2>0.0 2.0 0.0</a2>
        <a3>0.0 0.0 2.0</a3>
      </cell>
    </atomic_structure>
  </input>
  <output>
    <atomic_structure nat="1">
      <atomic_positions>
        <atom name="W" index="1">0.0 0.0 0.0</atom>
      </atomic_positions>
      <cell>
        <a1>1.0 0.0 0.0</a1>
        <a2>0.0 1.0 0.0</a2>
        <a3>0.0 0.0 1.0</a3>
      </cell>
    </atomic_structure>
  </output>
</qes:espresso>
"#;

    fn query(path: &str) -> StructureQuery {
        StructureQuery {
            path: TreePath::parse(path).unwrap(),
            unit: PositionUnit::Bohr,
        }
    }

    #[test]
    fn test_identity_cell_and_one_atom() {
        let s = extract_structure(DOC, "test", &query("output/atomic_structure")).unwrap();

        assert_eq!(s.cell, [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.atoms[0].species, "W");
        assert_eq!(s.atoms[0].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_descendant_path_takes_first_match() {
        let s = extract_structure(DOC, "test", &query("//atomic_structure")).unwrap();
        assert_eq!(s.atoms[0].species, "X");
    }

    #[test]
    fn test_missing_atomic_positions_is_schema_error() {
        let doc = r#"<root><atomic_structure><cell>
            <a1>1 0 0</a1><a2>0 1 0</a2><a3>0 0 1</a3>
        </cell></atomic_structure></root>"#;
        let result = extract_structure(doc, "test", &query("atomic_structure"));
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_missing_cell_vector_is_schema_error() {
        let doc = r#"<root><atomic_structure><cell><a1>1 0 0</a1><a2>0 1 0</a2></cell>
            <atomic_positions/></atomic_structure></root>"#;
        let result = extract_structure(doc, "test", &query("atomic_structure"));
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_missing_structure_node_is_schema_error() {
        let result = extract_structure("<root/>", "test", &query("output/atomic_structure"));
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_non_numeric_position_is_schema_error() {
        let doc = r#"<root><atomic_structure><cell>
            <a1>1 0 0</a1><a2>0 1 0</a2><a3>0 0 1</a3></cell>
            <atomic_positions><atom name="W">0.0 abc 0.0</atom></atomic_positions>
        </atomic_structure></root>"#;
        let result = extract_structure(doc, "test", &query("atomic_structure"));
        assert!(matches!(result, Err(WanbridgeError::SchemaError { .. })));
    }

    #[test]
    fn test_empty_path_is_config_error() {
        assert!(matches!(TreePath::parse("//"), Err(WanbridgeError::ConfigError(_))));
    }
}
