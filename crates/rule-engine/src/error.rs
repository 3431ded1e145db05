//! 规则引擎错误类型
//!
//! 仅由严格入口（`RuleParser::try_parse`、`FactTable::from_json_str`）返回；
//! 评估路径上的所有失败都以 `pass = false` 的形式体现。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("事实表无效: {0}")]
    InvalidFacts(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
