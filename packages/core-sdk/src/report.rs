use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::models::Vulnerability;

/**
 * \brief 把漏洞记录序列渲染为确定性的 markdown 文档。
 *
 * 字段顺序固定，空字段照常输出标签；同一输入渲染结果逐字节一致。
 * 文件落盘与控制台打印都走这一个函数，两个出口不存在格式分叉。
 */
pub fn render_markdown(vulnerabilities: &[Vulnerability]) -> String {
    let mut markdown = String::from("# Vulnerability Report\n\n");

    for (i, vuln) in vulnerabilities.iter().enumerate() {
        markdown.push_str(&format!("## {}. {}\n", i + 1, vuln.title));
        markdown.push_str(&format!("**Description**: {}\n\n", vuln.description));
        markdown.push_str(&format!(
            "**Proof of Concept**:\n```\n{}\n```\n\n",
            vuln.proof_of_concept
        ));
        markdown.push_str(&format!("**Severity**: {}\n\n", vuln.severity));
        markdown.push_str(&format!(
            "**Vulnerable Code**:\n```\n{}\n```\n\n",
            vuln.vulnerable_code
        ));
        markdown.push_str(&format!(
            "**Recommended Fix**:\n```\n{}\n```\n\n",
            vuln.recommended_fix
        ));
        markdown.push_str("---\n\n");
    }

    markdown
}

/**
 * \brief 渲染并覆盖写入目标文件。
 */
pub fn save_markdown(vulnerabilities: &[Vulnerability], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render_markdown(vulnerabilities))
        .with_context(|| format!("failed to write markdown file {}", path.display()))?;
    Ok(())
}

/**
 * \brief 渲染并打印到控制台。
 */
pub fn print_markdown(vulnerabilities: &[Vulnerability]) {
    println!("{}", render_markdown(vulnerabilities));
}
