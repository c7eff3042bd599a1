use serde::{Deserialize, Serialize};

/**
 * \brief 消息结构，与 OpenAI Chat 消息格式对齐。
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /** \brief 角色：system/user/assistant */
    pub role: String,
    /** \brief 内容 */
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/**
 * \brief 单条漏洞记录，由第二阶段分析回复解析得到。
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /** \brief 漏洞标题，非空才视为有效记录 */
    pub title: String,
    /** \brief 漏洞描述 */
    pub description: String,
    /** \brief 利用示例 */
    pub proof_of_concept: String,
    /** \brief 严重等级（Critical/High/Medium/Low，按模型原文保存） */
    pub severity: String,
    /** \brief 受影响代码片段（原样保存） */
    pub vulnerable_code: String,
    /** \brief 修复建议 */
    pub recommended_fix: String,
}
