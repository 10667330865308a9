use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 分析错误类型
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AnalysisError {
    #[error("配置错误: {message}")]
    Configuration { message: String, field: Option<String> },

    #[error("网络错误: {message}")]
    Network { message: String, url: Option<String> },

    #[error("HTTP error! status: {status} {reason}")]
    Http { status: u16, reason: String, url: String },

    #[error("{operation}，请求超时 ({timeout_ms}ms)")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{operation}: 达到最大重试次数 ({attempts})")]
    RetriesExhausted { operation: String, attempts: u32 },

    #[error("解析错误: {message}")]
    Parsing { message: String },

    #[error("已有分析任务在运行中")]
    RunInProgress,

    #[error("内部错误: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Network { .. } => true,
            AnalysisError::Timeout { .. } => true,
            AnalysisError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        AnalysisError::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// 创建带字段名的配置错误
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AnalysisError::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// 创建网络错误
    pub fn network(message: impl Into<String>, url: Option<String>) -> Self {
        AnalysisError::Network {
            message: message.into(),
            url,
        }
    }

    /// 创建超时错误
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        AnalysisError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// 创建解析错误
    pub fn parsing(message: impl Into<String>) -> Self {
        AnalysisError::Parsing {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AnalysisError::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::parsing(err.to_string())
    }
}

impl From<url::ParseError> for AnalysisError {
    fn from(err: url::ParseError) -> Self {
        AnalysisError::invalid_field("gitlab_api", format!("无效的 URL: {}", err))
    }
}
