//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use crate::error::{EmptyResultNotice, MalformedRecordWarning};

use colored::Colorize;

/// 逐行诊断最多显示的条数
const MAX_WARNINGS_SHOWN: usize = 10;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印写出文件消息
pub fn print_written(what: &str, path: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        what.dimmed(),
        "->".cyan(),
        path
    );
}

/// 打印被跳过的数据行
pub fn print_malformed(source: &str, warnings: &[MalformedRecordWarning]) {
    if warnings.is_empty() {
        return;
    }
    print_warning(&format!(
        "{}: skipped {} malformed line(s)",
        source,
        warnings.len()
    ));
    for w in warnings.iter().take(MAX_WARNINGS_SHOWN) {
        println!("       {}", w.to_string().dimmed());
    }
    if warnings.len() > MAX_WARNINGS_SHOWN {
        println!(
            "       {}",
            format!("... and {} more", warnings.len() - MAX_WARNINGS_SHOWN).dimmed()
        );
    }
}

/// 打印空结果提示
pub fn print_notice(source: &str, notice: &EmptyResultNotice) {
    println!("{} {}: {}", "[NOTE]".cyan().bold(), source, notice);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
