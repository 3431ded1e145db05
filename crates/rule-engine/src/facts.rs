//! 事实表与 token 标签目录
//!
//! 事实由外部组件一次性提供，评估期间只读；键一律忽略大小写。

use crate::error::{Result, RuleError};
use crate::value::FactValue;
use serde_json::Value;
use std::collections::HashMap;

fn normalize_key(token: &str) -> String {
    token.trim().to_lowercase()
}

/// 事实表
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    facts: HashMap<String, FactValue>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入事实；同名（忽略大小写）的旧值被覆盖
    pub fn insert(&mut self, token: impl AsRef<str>, value: impl Into<FactValue>) {
        self.facts.insert(normalize_key(token.as_ref()), value.into());
    }

    pub fn with(mut self, token: impl AsRef<str>, value: impl Into<FactValue>) -> Self {
        self.insert(token, value);
        self
    }

    /// 查找事实，不存在时返回 `None`
    pub fn get(&self, token: &str) -> Option<&FactValue> {
        self.facts.get(&normalize_key(token))
    }

    /// 查找事实，不存在时解析为 `Null`
    pub fn resolve(&self, token: &str) -> FactValue {
        self.get(token).cloned().unwrap_or_default()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.facts.contains_key(&normalize_key(token))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// 从 JSON 对象构建
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            RuleError::InvalidFacts(format!("期望 JSON 对象，实际为 {}", json_kind(value)))
        })?;

        Ok(map.iter().map(|(k, v)| (k.as_str(), FactValue::from(v))).collect())
    }

    /// 从 JSON 字符串构建
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }
}

impl<K: AsRef<str>, V: Into<FactValue>> FromIterator<(K, V)> for FactTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// token 标签目录
///
/// 为追踪行提供人类可读的 token 描述，与事实表相互独立。
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    labels: HashMap<String, String>,
}

impl TokenCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl AsRef<str>, label: impl Into<String>) {
        self.labels.insert(normalize_key(token.as_ref()), label.into());
    }

    pub fn label(&self, token: &str) -> Option<&str> {
        self.labels.get(&normalize_key(token)).map(String::as_str)
    }

    /// 查找标签，缺失时回退到 token 本身
    pub fn label_or_token<'a>(&'a self, token: &'a str) -> &'a str {
        self.label(token).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TokenCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (k, v) in iter {
            catalog.insert(k, v);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_lookup() {
        let facts = FactTable::new().with("applicableincome", true);
        assert_eq!(facts.get("ApplicableIncome"), Some(&FactValue::Bool(true)));
        assert!(facts.contains("APPLICABLEINCOME"));
        assert_eq!(facts.resolve("missing"), FactValue::Null);
    }

    #[test]
    fn test_later_insert_overrides() {
        let mut facts = FactTable::new();
        facts.insert("Hours", 10);
        facts.insert("hours", 20);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts.get("HOURS"), Some(&FactValue::from(20)));
    }

    #[test]
    fn test_from_json() {
        let facts = FactTable::from_json_value(&json!({
            "applicableincome": true,
            "hours": 24.5,
            "county": "Kent",
            "unknown": null
        }))
        .unwrap();

        assert_eq!(facts.len(), 4);
        assert_eq!(facts.get("county"), Some(&FactValue::from("Kent")));
        assert_eq!(facts.get("unknown"), Some(&FactValue::Null));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let result = FactTable::from_json_str("[1, 2]");
        assert!(matches!(result, Err(RuleError::InvalidFacts(_))));

        let result = FactTable::from_json_str("{not json");
        assert!(matches!(result, Err(RuleError::JsonError(_))));
    }

    #[test]
    fn test_catalog_fallback() {
        let catalog: TokenCatalog = [("ApplicableIncome", "Applicable income present")]
            .into_iter()
            .collect();
        assert_eq!(catalog.label_or_token("applicableincome"), "Applicable income present");
        assert_eq!(catalog.label_or_token("hours"), "hours");
    }
}
