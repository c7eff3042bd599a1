use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/** \brief 默认的 .env 文件名（当前工作目录下）。 */
pub const DEFAULT_ENV_FILE: &str = ".env";

/** \brief OpenAI 默认模型名，可被 OPENAI_MODEL 覆盖。 */
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/** \brief OpenAI 默认 API 基地址，可被 OPENAI_API_BASE 覆盖。 */
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";

const DEFAULT_ENV_TEMPLATE: &str = r#"# Choose which API to use (OpenAI or Azure OpenAI)
# Set USE_OPENAI=true if using OpenAI API
# Set USE_AZURE=true if using Azure OpenAI API
USE_OPENAI=true
USE_AZURE=false

# OpenAI API configuration
OPENAI_API_KEY=your_openai_api_key_here
OPENAI_MODEL=gpt-3.5-turbo

# Azure OpenAI API configuration
AZURE_API_KEY=your_azure_api_key_here
AZURE_API_VERSION=2023-03-15-preview
AZURE_API_ENDPOINT=your_azure_endpoint_here
AZURE_DEPLOYMENT_NAME=your_azure_deployment_name_here
"#;

/**
 * \brief API 凭据配置：二选一，OpenAI 或 Azure OpenAI。
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiConfig {
    OpenAi {
        api_base: String,
        api_key: String,
        model: String,
    },
    Azure {
        endpoint: String,
        api_key: String,
        deployment: String,
        api_version: String,
    },
}

impl ApiConfig {
    /**
     * \brief 供日志展示的 Provider 名称。
     */
    pub fn provider_name(&self) -> &'static str {
        match self {
            ApiConfig::OpenAi { .. } => "OpenAI",
            ApiConfig::Azure { .. } => "Azure OpenAI",
        }
    }

    /**
     * \brief 校验所有必填字段非空，发起任何请求前调用。
     */
    pub fn validate(&self) -> Result<()> {
        match self {
            ApiConfig::OpenAi {
                api_base,
                api_key,
                model,
            } => {
                if api_base.is_empty() {
                    bail!("OpenAI API base URL must be provided");
                }
                if api_key.is_empty() {
                    bail!("OpenAI API key must be provided");
                }
                if model.is_empty() {
                    bail!("OpenAI model must be provided");
                }
            }
            ApiConfig::Azure {
                endpoint,
                api_key,
                deployment,
                api_version,
            } => {
                if endpoint.is_empty()
                    || api_key.is_empty()
                    || deployment.is_empty()
                    || api_version.is_empty()
                {
                    bail!("all Azure OpenAI parameters must be provided");
                }
            }
        }
        Ok(())
    }
}

/**
 * \brief 若 .env 不存在则写入默认模板，返回是否新建。
 */
pub fn ensure_env_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, DEFAULT_ENV_TEMPLATE)
        .with_context(|| format!("create env file {} failed", path.display()))?;
    Ok(true)
}

/**
 * \brief 加载 .env（缺失时先创建默认模板），返回是否新建了文件。
 */
pub fn load_env() -> Result<bool> {
    let created = ensure_env_file(DEFAULT_ENV_FILE)?;
    dotenvy::from_path(DEFAULT_ENV_FILE).context("load .env file failed")?;
    Ok(created)
}

/**
 * \brief 依据 USE_OPENAI / USE_AZURE 开关从环境变量组装配置。
 */
pub fn from_env() -> Result<ApiConfig> {
    let use_openai = env_flag("USE_OPENAI");
    let use_azure = env_flag("USE_AZURE");

    if use_openai {
        let config = ApiConfig::OpenAi {
            api_base: env_or_default("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE),
            api_key: env_or_default("OPENAI_API_KEY", ""),
            model: env_or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
        };
        config.validate()?;
        return Ok(config);
    }

    if use_azure {
        for key in [
            "AZURE_API_KEY",
            "AZURE_API_VERSION",
            "AZURE_API_ENDPOINT",
            "AZURE_DEPLOYMENT_NAME",
        ] {
            if env_or_default(key, "").is_empty() {
                bail!("missing Azure OpenAI configuration: {} is not set in the .env file", key);
            }
        }
        return Ok(ApiConfig::Azure {
            endpoint: env_or_default("AZURE_API_ENDPOINT", ""),
            api_key: env_or_default("AZURE_API_KEY", ""),
            deployment: env_or_default("AZURE_DEPLOYMENT_NAME", ""),
            api_version: env_or_default("AZURE_API_VERSION", ""),
        });
    }

    bail!("API configuration missing: set USE_OPENAI=true or USE_AZURE=true in the .env file")
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).map(|v| v == "true").unwrap_or(false)
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/**
 * \brief JSON 配置文件结构（与 .env 等价的另一种凭据来源）。
 */
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub azure_openai: AzureFileConfig,
    #[serde(default)]
    pub openai: OpenAiFileConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AzureFileConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub deployment_name: String,
    #[serde(default)]
    pub api_version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiFileConfig {
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

/**
 * \brief 从 JSON 文件加载凭据配置。
 */
pub fn load_config_file(path: impl AsRef<Path>) -> Result<FileConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("error opening config file {}", path.display()))?;
    serde_json::from_str(&raw).context("error decoding config file")
}

impl FileConfig {
    /**
     * \brief 转换为 ApiConfig：Azure 字段齐全则优先 Azure，否则退回 OpenAI。
     */
    pub fn into_api_config(self) -> Result<ApiConfig> {
        let azure = &self.azure_openai;
        if !azure.api_key.is_empty() {
            let config = ApiConfig::Azure {
                endpoint: azure.endpoint.clone(),
                api_key: azure.api_key.clone(),
                deployment: azure.deployment_name.clone(),
                api_version: azure.api_version.clone(),
            };
            config.validate()?;
            return Ok(config);
        }

        let model = if self.openai.model.is_empty() {
            DEFAULT_OPENAI_MODEL.to_string()
        } else {
            self.openai.model.clone()
        };
        let api_base = if self.openai.api_base.is_empty() {
            DEFAULT_OPENAI_API_BASE.to_string()
        } else {
            self.openai.api_base.clone()
        };
        let config = ApiConfig::OpenAi {
            api_base,
            api_key: self.openai.api_key,
            model,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = ApiConfig::OpenAi {
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            api_key: String::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        };
        assert!(config.validate().is_err());

        let config = ApiConfig::Azure {
            endpoint: "https://example.openai.azure.com".to_string(),
            api_key: "key".to_string(),
            deployment: String::new(),
            api_version: "2023-03-15-preview".to_string(),
        };
        assert!(config.validate().is_err());

        let config = ApiConfig::OpenAi {
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            api_key: "sk-test".to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
        };
        config.validate().expect("valid openai config");
    }

    #[test]
    fn test_ensure_env_file_creates_template_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");

        let created = ensure_env_file(&path).expect("ensure env");
        assert!(created);
        let content = fs::read_to_string(&path).expect("read env");
        assert!(content.contains("USE_OPENAI=true"));
        assert!(content.contains("AZURE_DEPLOYMENT_NAME"));

        let created_again = ensure_env_file(&path).expect("ensure env again");
        assert!(!created_again);
    }

    #[test]
    fn test_file_config_prefers_azure_when_populated() {
        let raw = r#"{
            "azure_openai": {
                "endpoint": "https://example.openai.azure.com",
                "api_key": "azure-key",
                "deployment_name": "gpt-35",
                "api_version": "2023-03-15-preview"
            },
            "openai": { "api_key": "sk-test" }
        }"#;
        let config: FileConfig = serde_json::from_str(raw).expect("decode config");
        let api = config.into_api_config().expect("into api config");
        assert_eq!(api.provider_name(), "Azure OpenAI");
    }

    #[test]
    fn test_file_config_falls_back_to_openai_with_default_model() {
        let raw = r#"{ "openai": { "api_key": "sk-test" } }"#;
        let config: FileConfig = serde_json::from_str(raw).expect("decode config");
        let api = config.into_api_config().expect("into api config");
        match api {
            ApiConfig::OpenAi {
                api_base,
                api_key,
                model,
            } => {
                assert_eq!(api_base, DEFAULT_OPENAI_API_BASE);
                assert_eq!(api_key, "sk-test");
                assert_eq!(model, DEFAULT_OPENAI_MODEL);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_file_config_rejects_missing_credentials() {
        let raw = r#"{ "openai": { "api_key": "" } }"#;
        let config: FileConfig = serde_json::from_str(raw).expect("decode config");
        assert!(config.into_api_config().is_err());
    }
}
