//! # kmesh 命令实现
//!
//! ## 功能
//! - 校验网格参数（在任何文件操作之前）
//! - 生成网格，两种格式写出后读回逐点核对
//! - 写成所选格式
//! - 可选：原地替换 pw.x 输入的 `K_POINTS` 卡片与 `.win` 的 kpoints 块
//!
//! ## 依赖关系
//! - 使用 `cli/kmesh.rs` 定义的参数
//! - 使用 `kmesh/`
//! - 使用 `utils/`

use crate::cli::kmesh::{KmeshArgs, MeshFormat};
use crate::error::{Result, WanbridgeError};
use crate::kmesh::{self, MeshSpec, Precision};
use crate::models::KMesh;
use crate::parsers::read_text;
use crate::utils::{self, output};

use log::info;
use std::path::Path;

/// 执行 kmesh 命令
pub fn execute(args: KmeshArgs) -> Result<()> {
    let dims: [usize; 3] = args.dims.as_slice().try_into().map_err(|_| {
        WanbridgeError::InvalidArgument(format!("expected 3 mesh dimensions, got {}", args.dims.len()))
    })?;
    let spec = MeshSpec::new(dims, args.fastest.into())?;
    let precision = Precision::new(args.precision)?;

    let mesh = spec.generate();
    info!("{} k-points, {} fastest", mesh.len(), spec.fastest());
    kmesh::verify_dialects(&mesh, precision)?;

    let patching = args.pw_input.is_some() || args.win_input.is_some();

    if let Some(path) = &args.pw_input {
        patch_file(path, &mesh, precision, kmesh::patch_pw_input)?;
        output::print_written("K_POINTS card", &path.display().to_string());
    }
    if let Some(path) = &args.win_input {
        patch_file(path, &mesh, precision, kmesh::patch_win_input)?;
        output::print_written("kpoints block + mp_grid", &path.display().to_string());
    }

    // 只做原地替换时不再输出网格
    if patching && args.output.is_none() {
        return Ok(());
    }

    let text = match args.format {
        MeshFormat::Pw => kmesh::to_pw_card(&mesh, precision),
        MeshFormat::Win => kmesh::to_coordinate_block(&mesh, precision),
        MeshFormat::Records => kmesh::to_full_records(&mesh, precision),
    };
    utils::write_text(args.output.as_deref(), &text)?;

    if let Some(path) = &args.output {
        let [n1, n2, n3] = spec.dims();
        output::print_success(&format!(
            "{}x{}x{} mesh ({} points) written to '{}'",
            n1,
            n2,
            n3,
            mesh.len(),
            path.display()
        ));
    }
    Ok(())
}

fn patch_file(
    path: &Path,
    mesh: &KMesh,
    precision: Precision,
    patch: fn(&str, &KMesh, Precision) -> String,
) -> Result<()> {
    let content = read_text(path)?;
    utils::write_text(Some(path), &patch(&content, mesh, precision))
}
