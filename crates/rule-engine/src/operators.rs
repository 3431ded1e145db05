//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件比较操作符
///
/// 规则中同时接受符号和单词两种写法，且不区分大小写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterOrEqual,
    LessOrEqual,
    GreaterThan,
    LessThan,
}

impl Operator {
    /// 解析操作符，无法识别时返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let op = match raw.trim().to_ascii_lowercase().as_str() {
            "equals" | "=" => Self::Equals,
            "notequals" | "!=" => Self::NotEquals,
            ">=" | "greaterorequal" => Self::GreaterOrEqual,
            "<=" | "lessorequal" => Self::LessOrEqual,
            ">" | "greaterthan" => Self::GreaterThan,
            "<" | "lessthan" => Self::LessThan,
            _ => return None,
        };
        Some(op)
    }

    /// 是否为数值比较操作符
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Self::Equals | Self::NotEquals)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        };
        write!(f, "{}", s)
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    /// 解析逻辑操作符，缺失或无法识别时返回 `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if raw.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// 归约一组结果：空集合在 AND 下为真，在 OR 下为假
    pub fn reduce<I>(&self, results: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut results = results.into_iter();
        match self {
            Self::And => results.all(|r| r),
            Self::Or => results.any(|r| r),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}
