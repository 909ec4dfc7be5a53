//! # 将网格写入已有输入文件
//!
//! - pw.x 输入：替换 `K_POINTS` 卡片（到下一个卡片关键字或文件尾为止），不存在则追加
//! - wannier90 `.win`：替换 `begin kpoints ... end kpoints`，不存在则追加；
//!   同时改写（或插入）`mp_grid`，使其与网格维度一致
//!
//! ## 依赖关系
//! - 被 `commands/kmesh.rs` 使用
//! - 使用 `kmesh/dialect.rs`

use super::dialect::{to_coordinate_block, to_pw_card, Precision};
use crate::models::KMesh;

use log::debug;
use regex::Regex;
use std::sync::OnceLock;

/// pw.x 输入中的卡片关键字
const PW_CARDS: &[&str] = &[
    "ATOMIC_SPECIES",
    "ATOMIC_POSITIONS",
    "K_POINTS",
    "ADDITIONAL_K_POINTS",
    "CELL_PARAMETERS",
    "OCCUPATIONS",
    "CONSTRAINTS",
    "ATOMIC_FORCES",
    "ATOMIC_VELOCITIES",
    "SOLVENTS",
    "HUBBARD",
];

fn win_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)begin\s+kpoints.*?end\s+kpoints[^\n]*\n?").expect("valid kpoints regex"))
}

fn mp_grid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*mp_grid\b.*$").expect("valid mp_grid regex"))
}

/// 行首标识符（到空白、`(` 或 `{` 为止）为卡片关键字时返回该关键字
fn card_keyword(line: &str) -> Option<&'static str> {
    let ident: String = line
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let rest = &line.trim_start()[ident.len()..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t', '(', '{'])) {
        return None;
    }
    let ident = ident.to_uppercase();
    PW_CARDS.iter().copied().find(|card| *card == ident)
}

fn ensure_newline(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

/// 替换 pw.x 输入中的 `K_POINTS` 卡片
pub fn patch_pw_input(content: &str, mesh: &KMesh, precision: Precision) -> String {
    let card = to_pw_card(mesh, precision);

    let mut out = String::with_capacity(content.len() + card.len());
    let mut in_card = false;
    let mut replaced = false;

    for line in content.lines() {
        match card_keyword(line) {
            Some("K_POINTS") => {
                in_card = true;
                if !replaced {
                    out.push_str(&card);
                    replaced = true;
                }
                continue;
            }
            Some(_) => in_card = false,
            None => {}
        }
        if !in_card {
            out.push_str(line);
            out.push('\n');
        }
    }

    if !replaced {
        debug!("No K_POINTS card in input; appending");
        ensure_newline(&mut out);
        out.push_str(&card);
    }
    out
}

/// 替换 `.win` 中的 k 点块并同步 `mp_grid`
pub fn patch_win_input(content: &str, mesh: &KMesh, precision: Precision) -> String {
    let block = to_coordinate_block(mesh, precision);
    let mp_grid = format!("mp_grid = {} {} {}", mesh.dims[0], mesh.dims[1], mesh.dims[2]);

    let mut out = if win_block_regex().is_match(content) {
        win_block_regex()
            .replacen(content, 1, regex::NoExpand(&block))
            .into_owned()
    } else {
        debug!("No kpoints block in .win; appending");
        let mut out = content.to_string();
        ensure_newline(&mut out);
        out.push_str(&block);
        out
    };

    if mp_grid_regex().is_match(&out) {
        out = mp_grid_regex()
            .replace_all(&out, regex::NoExpand(&mp_grid))
            .into_owned();
    } else {
        let at = win_block_regex().find(&out).map(|m| m.start()).unwrap_or(out.len());
        out.insert_str(at, &format!("{}\n\n", mp_grid));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmesh::MeshSpec;
    use crate::models::Axis;

    fn mesh() -> KMesh {
        MeshSpec::new([2, 1, 1], Axis::First).unwrap().generate()
    }

    fn p6() -> Precision {
        Precision::new(6).unwrap()
    }

    #[test]
    fn test_pw_card_replaced_up_to_next_card() {
        let input = "&system\n  ecutwfc = 40\n/\nK_POINTS automatic\n4 4 1 0 0 0\nCELL_PARAMETERS bohr\n1 0 0\n";
        let patched = patch_pw_input(input, &mesh(), p6());

        assert!(!patched.contains("automatic"));
        assert!(patched.contains("K_POINTS crystal\n2\n0.000000  0.000000  0.000000  0.500000\n"));
        assert!(patched.contains("CELL_PARAMETERS bohr\n1 0 0\n"));
        assert!(patched.starts_with("&system\n"));
        assert_eq!(patched.matches("K_POINTS").count(), 1);
    }

    #[test]
    fn test_pw_card_at_end_of_file() {
        let input = "ATOMIC_SPECIES\nW 183.84 W.upf\nK_POINTS {crystal}\n1\n0 0 0 1\n";
        let patched = patch_pw_input(input, &mesh(), p6());
        assert!(patched.ends_with("0.500000  0.000000  0.000000  0.500000\n"));
        assert!(patched.contains("W 183.84 W.upf\n"));
    }

    #[test]
    fn test_pw_card_option_without_space() {
        for header in ["K_POINTS(crystal)", "k_points{automatic}"] {
            let input = format!("&system\n/\n{}\n4 4 1 0 0 0\nATOMIC_POSITIONS(crystal)\nW 0 0 0\n", header);
            let patched = patch_pw_input(&input, &mesh(), p6());

            assert_eq!(patched.to_uppercase().matches("K_POINTS").count(), 1);
            assert!(!patched.contains("4 4 1 0 0 0"));
            assert!(patched.contains("ATOMIC_POSITIONS(crystal)\nW 0 0 0\n"));
        }
    }

    #[test]
    fn test_card_keyword_needs_whole_identifier() {
        assert_eq!(card_keyword("K_POINTS(crystal)"), Some("K_POINTS"));
        assert_eq!(card_keyword("  k_points {tpiba}"), Some("K_POINTS"));
        assert_eq!(card_keyword("K_POINTS_EXTRA crystal"), None);
        assert_eq!(card_keyword("ADDITIONAL_K_POINTS"), Some("ADDITIONAL_K_POINTS"));
    }

    #[test]
    fn test_pw_card_appended_when_absent() {
        let patched = patch_pw_input("&control\n/", &mesh(), p6());
        assert!(patched.starts_with("&control\n/\nK_POINTS crystal\n"));
    }

    #[test]
    fn test_win_block_and_mp_grid_replaced() {
        let input = "num_wann = 4\nmp_grid : 4 4 4\n\nBegin Kpoints\n0.0 0.0 0.0\nEnd Kpoints\n";
        let patched = patch_win_input(input, &mesh(), p6());

        assert!(patched.contains("mp_grid = 2 1 1\n"));
        assert!(!patched.contains("4 4 4"));
        assert!(patched.contains("begin kpoints\n0.000000  0.000000  0.000000\n0.500000  0.000000  0.000000\nend kpoints\n"));
        assert!(!patched.contains("Begin Kpoints"));
    }

    #[test]
    fn test_win_block_and_mp_grid_inserted() {
        let patched = patch_win_input("num_wann = 4", &mesh(), p6());
        assert_eq!(
            patched,
            "num_wann = 4\nmp_grid = 2 1 1\n\nbegin kpoints\n\
             0.000000  0.000000  0.000000\n\
             0.500000  0.000000  0.000000\n\
             end kpoints\n"
        );
    }
}
