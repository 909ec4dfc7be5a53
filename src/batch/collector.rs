//! # 文件收集器
//!
//! 根据输入路径和文件名模式收集待解析的输出文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔的多个模式）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/cutoff.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob::Pattern` 匹配文件名

use crate::error::{Result, WanbridgeError};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器（匹配所有文件）
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    WanbridgeError::InvalidArgument(format!("bad file pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(WanbridgeError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        Ok(files)
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(pattern: &str) -> FileCollector {
        FileCollector::new(PathBuf::from(".")).with_pattern(pattern).unwrap()
    }

    #[test]
    fn test_pattern_match() {
        let c = collector("*_cut_*.out, *.log");
        assert!(c.matches_patterns(Path::new("runs/wte2_cut_40.out")));
        assert!(c.matches_patterns(Path::new("scf.log")));
        assert!(!c.matches_patterns(Path::new("wte2_cut_40.in")));
    }

    #[test]
    fn test_empty_pattern_matches_all() {
        assert!(collector(" , ").matches_patterns(Path::new("anything")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileCollector::new(PathBuf::from(".")).with_pattern("[");
        assert!(matches!(result, Err(WanbridgeError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_directory() {
        let result = FileCollector::new(PathBuf::from("/nonexistent/wanbridge")).collect();
        assert!(matches!(result, Err(WanbridgeError::DirectoryNotFound { .. })));
    }
}
