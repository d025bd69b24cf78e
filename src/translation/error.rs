//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误分类

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 前置条件不满足（例如附加时找不到可遍历的根节点）
    #[error("缺少可遍历的根节点: {0}")]
    MissingRoot(String),

    /// 绑定的节点已脱离文档
    #[error("节点已脱离文档: {0}")]
    NodeDetached(String),

    /// 片段边界已失效
    #[error("片段边界无效: {0}")]
    InvalidBoundary(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

impl TranslationError {
    /// 写回时的树形变错误可以在本地恢复（丢弃对应绑定）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TranslationError::NodeDetached(_) | TranslationError::InvalidBoundary(_)
        )
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::MissingRoot(_) => ErrorCategory::Precondition,
            TranslationError::NodeDetached(_) => ErrorCategory::TreeShape,
            TranslationError::InvalidBoundary(_) => ErrorCategory::TreeShape,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::IoError(_) => ErrorCategory::Io,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Precondition,
    TreeShape,
    Parsing,
    Serialization,
    Io,
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析失败: {}", error))
    }
}

impl From<regex::Error> for TranslationError {
    fn from(error: regex::Error) -> Self {
        TranslationError::ConfigError(format!("无效的变量匹配表达式: {}", error))
    }
}

/// 翻译结果类型
pub type TranslationResult<T> = Result<T, TranslationError>;
