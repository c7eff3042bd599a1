use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::models::Message;

/** \brief 单次请求超时上限。 */
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/**
 * \brief API 错误响应体结构（OpenAI 与 Azure 共用）。
 */
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/**
 * \brief 非流式 Chat 调用，返回首个 choice 的完整回复文本。
 *
 * OpenAI 与 Azure 仅在 URL 构造与鉴权头上不同，请求与响应处理共用同一条路径。
 * 不做重试：传输失败、非 2xx、解码失败均立即返回错误。
 */
pub async fn chat_once(
    config: &ApiConfig,
    messages: &[Message],
    max_tokens: u32,
    temperature: Option<f64>,
) -> Result<String> {
    config.validate()?;

    let url = request_url(config);
    let mut body = match config {
        ApiConfig::OpenAi { model, .. } => json!({
            "model": model,
            "messages": messages,
            "max_tokens": max_tokens,
        }),
        // Azure 的部署名编码在 URL 里，body 不携带顶层 model
        ApiConfig::Azure { .. } => json!({
            "messages": messages,
            "max_tokens": max_tokens,
        }),
    };
    if let Some(t) = temperature {
        body["temperature"] = json!(t);
    }

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client failed")?;

    let request = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .json(&body);
    let request = match config {
        ApiConfig::OpenAi { api_key, .. } => {
            request.header(AUTHORIZATION, format!("Bearer {}", api_key))
        }
        ApiConfig::Azure { api_key, .. } => request.header("api-key", api_key.as_str()),
    };

    let resp = request.send().await.context("API request failed")?;
    let status = resp.status();
    let text = resp.text().await.context("error reading API response")?;

    if !status.is_success() {
        return Err(api_error(status, &text));
    }

    let v: Value = serde_json::from_str(&text).context("error parsing API response")?;
    extract_content(&v).ok_or_else(|| anyhow!("no content in API response"))
}

fn request_url(config: &ApiConfig) -> String {
    match config {
        ApiConfig::OpenAi { api_base, .. } => {
            format!("{}/v1/chat/completions", api_base.trim_end_matches('/'))
        }
        ApiConfig::Azure {
            endpoint,
            deployment,
            api_version,
            ..
        } => format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            deployment,
            api_version
        ),
    }
}

/**
 * \brief 非 2xx 响应的三级降级：结构化错误 → 空错误对象 → 无法解码。
 */
fn api_error(status: StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(decoded) => {
            if decoded.error.code.is_empty() && decoded.error.message.is_empty() {
                anyhow!(
                    "API returned status code {} but no error message. Raw response: {}",
                    status.as_u16(),
                    body
                )
            } else {
                anyhow!(
                    "API error: {} - {}",
                    decoded.error.code,
                    decoded.error.message
                )
            }
        }
        Err(_) => anyhow!("API returned status code {}: {}", status.as_u16(), body),
    }
}

fn extract_content(v: &Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
