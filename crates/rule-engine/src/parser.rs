//! 规则解析器
//!
//! 将 JSON 规则文本解析为 [`RuleDocument`]。`parse` 永不失败：空输入、null 或
//! 非法 JSON 都退化为规范空文档（AND，无规则组），由调用方通过日志发现问题。

use crate::error::{Result, RuleError};
use crate::models::{Condition, RuleDocument, RuleGroup, RuleNode};
use crate::operators::LogicalOperator;
use crate::value::FactValue;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

// 标量字段按 JSON 值接收，数字或布尔写成的 id/label/token 也能保留下来
#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    operator: Value,
    #[serde(default)]
    groups: Option<Vec<RawGroup>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGroup {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    label: Value,
    #[serde(default)]
    operator: Value,
    #[serde(default)]
    conditions: Option<Vec<RawCondition>>,
    #[serde(default)]
    groups: Option<Vec<RawGroup>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCondition {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    token: Value,
    #[serde(default)]
    operator: Value,
    #[serde(default)]
    value: Value,
}

/// 标量字段的文本形式：null 为空，字符串原样，其余取 JSON 文本
fn text_field(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// 校验发现的问题（仅提示，不影响评估）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// 规则解析器
pub struct RuleParser;

impl RuleParser {
    /// 解析规则文本，任何失败都退化为空文档
    pub fn parse(raw: &str) -> RuleDocument {
        match Self::try_parse(raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "规则解析失败，使用空规则文档");
                RuleDocument::empty()
            }
        }
    }

    /// 严格解析：空白或 null 输入得到空文档，非法 JSON 返回错误
    pub fn try_parse(raw: &str) -> Result<RuleDocument> {
        if raw.trim().is_empty() {
            return Ok(RuleDocument::empty());
        }

        let value: Value = serde_json::from_str(raw)?;
        Self::try_from_value(&value)
    }

    /// 从已解析的 JSON 值构建文档，同样永不失败
    pub fn from_value(value: &Value) -> RuleDocument {
        Self::try_from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "规则解析失败，使用空规则文档");
            RuleDocument::empty()
        })
    }

    fn try_from_value(value: &Value) -> Result<RuleDocument> {
        match value {
            Value::Null => return Ok(RuleDocument::empty()),
            Value::Object(_) => {}
            other => {
                return Err(RuleError::ParseError(format!(
                    "规则文档必须是 JSON 对象: {}",
                    other
                )));
            }
        }

        let raw = RawDocument::deserialize(value)?;
        // 没有 groups 字段时整体视为空文档，连同书写的操作符一起丢弃
        let Some(raw_groups) = raw.groups else {
            debug!("规则文档缺少 groups，使用空规则文档");
            return Ok(RuleDocument::empty());
        };

        let operator = Self::logical_operator(&text_field(raw.operator), "ROOT");
        let groups = raw_groups
            .into_iter()
            .map(Self::build_group)
            .collect::<Vec<_>>();

        debug!(operator = %operator, groups = groups.len(), "规则文档已解析");
        Ok(RuleDocument::new(operator, groups))
    }

    fn build_group(raw: RawGroup) -> RuleGroup {
        let id = text_field(raw.id);
        let operator = Self::logical_operator(&text_field(raw.operator), &id);
        let mut group = RuleGroup::new(id, text_field(raw.label), operator);

        for cond in raw.conditions.unwrap_or_default() {
            group.nodes.push(RuleNode::Condition(Self::build_condition(cond)));
        }
        for child in raw.groups.unwrap_or_default() {
            group.nodes.push(RuleNode::Group(Self::build_group(child)));
        }

        group
    }

    fn build_condition(raw: RawCondition) -> Condition {
        Condition::new(
            text_field(raw.token),
            text_field(raw.operator),
            FactValue::from(&raw.value),
        )
        .with_id(text_field(raw.id))
    }

    /// 缺失或无法识别的逻辑操作符默认为 AND
    fn logical_operator(raw: &str, owner: &str) -> LogicalOperator {
        if raw.trim().is_empty() {
            return LogicalOperator::And;
        }
        LogicalOperator::parse(raw).unwrap_or_else(|| {
            warn!(owner = %owner, operator = %raw, "无法识别的逻辑操作符，按 AND 处理");
            LogicalOperator::And
        })
    }

    /// 校验规则文档，返回可疑的书写问题
    pub fn validate(doc: &RuleDocument) -> Vec<RuleIssue> {
        let mut issues = Vec::new();
        for (i, group) in doc.groups.iter().enumerate() {
            Self::validate_group(group, &format!("groups[{}]", i), &mut issues);
        }
        issues
    }

    fn validate_group(group: &RuleGroup, path: &str, issues: &mut Vec<RuleIssue>) {
        if group.id.trim().is_empty() && group.label.trim().is_empty() {
            issues.push(RuleIssue {
                path: path.to_string(),
                message: "规则组缺少 id 和 label".to_string(),
            });
        }

        if group.nodes.is_empty() {
            issues.push(RuleIssue {
                path: path.to_string(),
                message: format!(
                    "规则组为空，{} 下恒为 {}",
                    group.operator,
                    group.operator.reduce(std::iter::empty())
                ),
            });
        }

        let mut cond_index = 0;
        let mut group_index = 0;
        for node in &group.nodes {
            match node {
                RuleNode::Condition(cond) => {
                    let cond_path = format!("{}.conditions[{}]", path, cond_index);
                    cond_index += 1;

                    if cond.token.trim().is_empty() {
                        issues.push(RuleIssue {
                            path: cond_path.clone(),
                            message: "条件的 token 不能为空".to_string(),
                        });
                    }
                    if cond.comparator.is_none() {
                        issues.push(RuleIssue {
                            path: cond_path,
                            message: format!("无法识别的操作符 '{}'，条件恒为假", cond.operator),
                        });
                    }
                }
                RuleNode::Group(child) => {
                    let child_path = format!("{}.groups[{}]", path, group_index);
                    group_index += 1;
                    Self::validate_group(child, &child_path, issues);
                }
            }
        }
    }
}
