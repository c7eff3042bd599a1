use anyhow::{Context, Result};

use crate::config::ApiConfig;
use crate::llm;
use crate::models::{Message, Vulnerability};
use crate::parser;
use crate::telemetry;

/** \brief 两个阶段共用的输出 token 预算。 */
const MAX_TOKENS: u32 = 2000;

const INITIAL_PROMPT: &str = "You are a cybersecurity expert. Review this code for vulnerabilities. \
     Provide a high-level summary of potential vulnerabilities you've identified.";

fn detailed_prompt(initial_analysis: &str) -> String {
    format!(
        "Based on the initial analysis: {}\n\n\
         Now, for each identified vulnerability, provide the following details:\n\
         - Title\n\
         - Description\n\
         - Proof of Concept\n\
         - Severity (Critical, High, Medium, Low)\n\
         - Vulnerable Code\n\
         - Recommended Fix",
        initial_analysis
    )
}

/**
 * \brief 两阶段漏洞分析：先要概览，再按固定字段展开，最后解析成记录。
 *
 * 阶段严格串行，第二阶段的提示词内嵌第一阶段的结果；任一阶段失败即
 * 整体失败，不产出部分结果。
 */
pub async fn analyze_code(config: &ApiConfig, code: &str) -> Result<Vec<Vulnerability>> {
    telemetry::log_event("analysis", "starting code analysis");

    let initial = run_stage(config, INITIAL_PROMPT, code)
        .await
        .context("initial analysis failed")?;
    telemetry::log_event("analysis", &format!("initial analysis: {} chars", initial.len()));

    let detailed = run_stage(config, &detailed_prompt(&initial), code)
        .await
        .context("detailed analysis failed")?;

    let vulnerabilities =
        parser::parse_vulnerabilities(&detailed).context("failed to parse vulnerabilities")?;
    telemetry::log_event(
        "analysis",
        &format!("parsed {} vulnerabilities", vulnerabilities.len()),
    );
    Ok(vulnerabilities)
}

async fn run_stage(config: &ApiConfig, prompt: &str, code: &str) -> Result<String> {
    let messages = vec![Message::system(prompt), Message::user(code)];
    llm::chat_once(config, &messages, MAX_TOKENS, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: &str) -> ApiConfig {
        ApiConfig::OpenAi {
            api_base: api_base.to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-3.5-turbo".to_string(),
        }
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "content": content } } ]
        }))
    }

    #[tokio::test]
    async fn test_analyze_code_runs_both_stages_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("high-level summary"))
            .respond_with(reply("one injection issue"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Based on the initial analysis: one injection issue"))
            .respond_with(reply(
                "### 1\n**Title**: SQL Injection\n**Severity**: High\n\
                 **Description**: concat query\n**Recommended Fix**:\nbind params",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let vulns = analyze_code(&config(&server.uri()), "fn main() {}")
            .await
            .expect("analyze");
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].title, "SQL Injection");
        assert_eq!(vulns[0].severity, "High");
        assert_eq!(vulns[0].recommended_fix, "bind params");
    }

    #[tokio::test]
    async fn test_stage_one_failure_aborts_whole_analysis() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = analyze_code(&config(&server.uri()), "fn main() {}")
            .await
            .expect_err("should fail");
        assert!(format!("{:#}", err).contains("initial analysis failed"));
    }

    #[tokio::test]
    async fn test_unparseable_detailed_reply_is_a_hard_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("high-level summary"))
            .respond_with(reply("summary"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Based on the initial analysis"))
            .respond_with(reply("The code looks fine to me."))
            .mount(&server)
            .await;

        let err = analyze_code(&config(&server.uri()), "fn main() {}")
            .await
            .expect_err("should fail");
        assert!(format!("{:#}", err).contains("no vulnerabilities found"));
    }
}
