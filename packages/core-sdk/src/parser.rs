use anyhow::{bail, Result};

use crate::models::Vulnerability;

/** \brief 漏洞块之间的分隔标记。 */
pub const SECTION_DELIMITER: &str = "###";

const TITLE_PREFIX: &str = "**Title**:";
const DESCRIPTION_PREFIX: &str = "**Description**:";
const POC_PREFIX: &str = "**Proof of Concept**:";
const SEVERITY_PREFIX: &str = "**Severity**:";
const VULNERABLE_CODE_PREFIX: &str = "**Vulnerable Code**:";
const RECOMMENDED_FIX_PREFIX: &str = "**Recommended Fix**:";

/**
 * \brief 把第二阶段回复解析为漏洞记录列表。
 *
 * 回复按 `###` 切分为块；块内逐行扫描六个字段前缀，字段顺序不限，
 * 重复出现时以靠后者为准。无 Title 的块静默丢弃。整体解析不出任何
 * 记录视为硬错误（与“代码确实无漏洞”不作区分，调用方自行取舍）。
 */
pub fn parse_vulnerabilities(content: &str) -> Result<Vec<Vulnerability>> {
    let mut vulnerabilities = Vec::new();

    for section in content.split(SECTION_DELIMITER) {
        let lines: Vec<&str> = section.trim().lines().map(str::trim).collect();
        let mut vuln = Vulnerability::default();

        for (i, line) in lines.iter().enumerate() {
            if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
                vuln.title = rest.trim().to_string();
            } else if line.starts_with(DESCRIPTION_PREFIX) {
                vuln.description = extract_block(&lines[i..], DESCRIPTION_PREFIX);
            } else if line.starts_with(POC_PREFIX) {
                vuln.proof_of_concept = extract_block(&lines[i..], POC_PREFIX);
            } else if let Some(rest) = line.strip_prefix(SEVERITY_PREFIX) {
                vuln.severity = rest.trim().to_string();
            } else if line.starts_with(VULNERABLE_CODE_PREFIX) {
                vuln.vulnerable_code = extract_block(&lines[i..], VULNERABLE_CODE_PREFIX);
            } else if line.starts_with(RECOMMENDED_FIX_PREFIX) {
                vuln.recommended_fix = extract_block(&lines[i..], RECOMMENDED_FIX_PREFIX);
            }
            // 其余行不属于任何字段，忽略
        }

        if !vuln.title.is_empty() {
            vulnerabilities.push(vuln);
        }
    }

    if vulnerabilities.is_empty() {
        bail!("no vulnerabilities found in the response");
    }
    Ok(vulnerabilities)
}

/**
 * \brief 提取多行字段：前缀行的余下文本加上后续各行，直到遇到下一个
 *        `###` 或 `**` 起始的行为止（该行留给外层循环继续识别）。
 */
fn extract_block(lines: &[&str], prefix: &str) -> String {
    let mut content: Vec<String> = Vec::new();

    let rest = lines[0][prefix.len()..].trim();
    if !rest.is_empty() {
        content.push(rest.to_string());
    }

    for line in &lines[1..] {
        if line.starts_with(SECTION_DELIMITER) || line.starts_with("**") {
            break;
        }
        content.push((*line).to_string());
    }

    content.join("\n")
}
