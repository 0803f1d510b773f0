//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则缺少动作: {rule}")]
    MissingAction { rule: String },

    #[error("无效的规则: {0}")]
    InvalidRule(String),

    #[error("无效的操作数: {operator} 需要 {expected}")]
    InvalidOperand { operator: String, expected: String },

    #[error("无效的正则表达式 '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("无效的事实表: {0}")]
    InvalidFacts(String),

    #[error("不支持的事实值: {key} 的类型为 {found}")]
    UnsupportedFactValue { key: String, found: String },

    #[error("规则动作执行失败: {rule}: {source}")]
    ActionFailed {
        rule: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("规则动作发生 panic: {rule}: {message}")]
    ActionPanicked { rule: String, message: String },

    #[error("规则条件发生 panic: {rule} 第 {index} 个条件: {message}")]
    ConditionPanicked {
        rule: String,
        index: usize,
        message: String,
    },

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 出错的规则名称（与规则无关的错误返回 None）
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            Self::MissingAction { rule }
            | Self::ActionFailed { rule, .. }
            | Self::ActionPanicked { rule, .. }
            | Self::ConditionPanicked { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
