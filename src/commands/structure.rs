//! # structure 命令实现
//!
//! 从 QE XML 提取结构，输出 `CELL_PARAMETERS` / `ATOMIC_POSITIONS` 文本。
//!
//! ## 依赖关系
//! - 使用 `cli/structure.rs` 定义的参数
//! - 使用 `parsers/qe_xml.rs`
//! - 使用 `utils/`

use crate::cli::structure::StructureArgs;
use crate::error::Result;
use crate::parsers::qe_xml::{self, StructureQuery, TreePath};
use crate::utils::{self, output};

/// 执行 structure 命令
pub fn execute(args: StructureArgs) -> Result<()> {
    let query = StructureQuery {
        path: TreePath::parse(&args.path)?,
        unit: args.unit.into(),
    };

    let structure = qe_xml::parse_structure_file(&args.input, &query)?;
    utils::write_text(args.output.as_deref(), &structure.to_pw_text())?;

    if let Some(path) = &args.output {
        output::print_success(&format!(
            "{} atoms, cell volume {:.4} bohr^3 -> '{}'",
            structure.atoms.len(),
            structure.volume(),
            path.display()
        ));
    }
    Ok(())
}
