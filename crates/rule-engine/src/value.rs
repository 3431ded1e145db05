//! 值与类型转换层
//!
//! 事实表和规则字面量都被归一化为 [`FactValue`]，相等判断按固定顺序尝试：
//! 布尔 → 数值（精确十进制） → 忽略大小写的字符串。

use bigdecimal::BigDecimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 相等比较策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqualityPolicy {
    /// 双方都能转为布尔即按布尔比较，因此 `2 = 3` 成立
    #[default]
    CoercionOrder,
    /// 至少一侧是原生布尔或 true/false/yes/no 字样时才按布尔比较
    StrictBoolean,
}

/// 运行时值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FactValue {
    #[default]
    Null,
    Bool(bool),
    Number(BigDecimal),
    Text(String),
}

impl FactValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 布尔解释：数值非零为真，字符串接受 true/yes/1 与 false/no/0
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != BigDecimal::from(0)),
            Self::Text(s) => parse_boolean_word(s).or_else(|| match s.trim() {
                "1" => Some(true),
                "0" => Some(false),
                _ => None,
            }),
            Self::Null => None,
        }
    }

    /// 数值解释：字符串按不依赖区域设置的十进制格式解析
    pub fn as_number(&self) -> Option<BigDecimal> {
        match self {
            Self::Number(n) => Some(n.clone()),
            Self::Text(s) => parse_decimal(s),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// 相等比较（默认策略）
    ///
    /// 依次尝试布尔、数值、忽略大小写的字符串，首个双方都能转换的阶段决定结果。
    pub fn loosely_equals(&self, expected: &FactValue) -> bool {
        self.equals_with(expected, EqualityPolicy::default())
    }

    /// 按指定策略比较
    pub fn equals_with(&self, expected: &FactValue, policy: EqualityPolicy) -> bool {
        match (self, expected) {
            (Self::Null, Self::Null) => return true,
            (Self::Null, _) | (_, Self::Null) => return false,
            _ => {}
        }

        let boolean_stage = match policy {
            EqualityPolicy::CoercionOrder => true,
            EqualityPolicy::StrictBoolean => {
                self.is_boolean_typed() || expected.is_boolean_typed()
            }
        };
        if boolean_stage {
            if let (Some(a), Some(b)) = (self.as_boolean(), expected.as_boolean()) {
                return a == b;
            }
        }

        if let (Some(a), Some(b)) = (self.as_number(), expected.as_number()) {
            return a == b;
        }

        self.to_string().to_lowercase() == expected.to_string().to_lowercase()
    }

    fn is_boolean_typed(&self) -> bool {
        match self {
            Self::Bool(_) => true,
            Self::Text(s) => parse_boolean_word(s).is_some(),
            _ => false,
        }
    }

    /// 值的类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

fn parse_boolean_word(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// 接受可选符号、小数点、科学计数法，以及整数部分的千位分隔符（如 `1,000.50`）
fn parse_decimal(s: &str) -> Option<BigDecimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if !s.contains(',') {
        return BigDecimal::from_str(s).ok();
    }

    let (sign, unsigned) = match s.strip_prefix(['-', '+']) {
        Some(rest) => (&s[..1], rest),
        None => ("", s),
    };
    let (integer, rest) = unsigned
        .find(['.', 'e', 'E'])
        .map_or((unsigned, ""), |at| unsigned.split_at(at));

    let mut groups = integer.split(',');
    let head = groups.next()?;
    if head.is_empty() || head.len() > 3 || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits = head.to_string();
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }

    BigDecimal::from_str(&format!("{}{}{}", sign, digits, rest)).ok()
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for FactValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => match serde_json::Number::from_str(&n.to_string()) {
                Ok(number) => number.serialize(serializer),
                Err(_) => serializer.serialize_str(&n.to_string()),
            },
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&Value> for FactValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            // 通过文本表示转换，避免经由 f64 引入误差
            Value::Number(n) => BigDecimal::from_str(&n.to_string())
                .map(Self::Number)
                .unwrap_or_else(|_| Self::Text(n.to_string())),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl From<Value> for FactValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        Self::Number(BigDecimal::from(value))
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        Self::Number(BigDecimal::from(value))
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        if !value.is_finite() {
            return Self::Text(value.to_string());
        }
        BigDecimal::from_str(&value.to_string())
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(value.to_string()))
    }
}

impl From<BigDecimal> for FactValue {
    fn from(value: BigDecimal) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FactValue>> From<Option<T>> for FactValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(s: &str) -> FactValue {
        FactValue::Number(BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn test_as_boolean() {
        assert_eq!(FactValue::Bool(true).as_boolean(), Some(true));
        assert_eq!(FactValue::from(0).as_boolean(), Some(false));
        assert_eq!(num("0.5").as_boolean(), Some(true));
        assert_eq!(FactValue::from("YES").as_boolean(), Some(true));
        assert_eq!(FactValue::from("True").as_boolean(), Some(true));
        assert_eq!(FactValue::from("1").as_boolean(), Some(true));
        assert_eq!(FactValue::from("no").as_boolean(), Some(false));
        assert_eq!(FactValue::from("0").as_boolean(), Some(false));
        assert_eq!(FactValue::from("maybe").as_boolean(), None);
        assert_eq!(FactValue::Null.as_boolean(), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FactValue::from("25").as_number(), Some(BigDecimal::from(25)));
        assert_eq!(
            FactValue::from(" 24.5 ").as_number(),
            BigDecimal::from_str("24.5").ok()
        );
        assert_eq!(FactValue::from("abc").as_number(), None);
        assert_eq!(FactValue::from("").as_number(), None);
        assert_eq!(FactValue::Bool(true).as_number(), None);
        assert_eq!(FactValue::Null.as_number(), None);
    }

    #[test]
    fn test_json_number_keeps_decimal_text() {
        let value = FactValue::from(&json!(24.999999));
        assert_eq!(value, num("24.999999"));
        assert_ne!(value.as_number(), Some(BigDecimal::from(25)));
    }

    #[test]
    fn test_equality_order() {
        // 布尔优先
        assert!(FactValue::Bool(true).loosely_equals(&FactValue::from("yes")));
        assert!(FactValue::from(1).loosely_equals(&FactValue::Bool(true)));
        assert!(FactValue::from("1").loosely_equals(&FactValue::Bool(true)));
        // 数值
        assert!(FactValue::from(100).loosely_equals(&num("100.0")));
        assert!(FactValue::from("100").loosely_equals(&FactValue::from(100)));
        assert!(FactValue::from(2).loosely_equals(&FactValue::from(3)));
        assert!(FactValue::from("1").loosely_equals(&FactValue::from(2)));
        assert!(num("0.5").loosely_equals(&FactValue::from(1)));
        assert!(!FactValue::from(0).loosely_equals(&FactValue::from(3)));
        // 字符串忽略大小写
        assert!(FactValue::from("Hello").loosely_equals(&FactValue::from("hELLO")));
        assert!(!FactValue::from("hello").loosely_equals(&FactValue::from("world")));
    }

    #[test]
    fn test_strict_boolean_policy() {
        let strict = EqualityPolicy::StrictBoolean;
        assert!(!FactValue::from(2).equals_with(&FactValue::from(3), strict));
        assert!(!FactValue::from("1").equals_with(&FactValue::from(2), strict));
        assert!(!num("0.5").equals_with(&FactValue::from(1), strict));
        assert!(FactValue::from(5).equals_with(&FactValue::Bool(true), strict));
        assert!(FactValue::from("yes").equals_with(&FactValue::from("1"), strict));
        assert!(FactValue::from(100).equals_with(&num("100.0"), strict));
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(FactValue::from("1,000").as_number(), Some(BigDecimal::from(1000)));
        assert_eq!(
            FactValue::from("-12,345.50").as_number(),
            BigDecimal::from_str("-12345.50").ok()
        );
        assert_eq!(FactValue::from("1,00").as_number(), None);
        assert_eq!(FactValue::from(",100").as_number(), None);
        assert_eq!(FactValue::from("1.000,5").as_number(), None);
    }

    #[test]
    fn test_null_equality() {
        assert!(FactValue::Null.loosely_equals(&FactValue::Null));
        assert!(!FactValue::Null.loosely_equals(&FactValue::Bool(false)));
        assert!(!FactValue::Null.loosely_equals(&FactValue::from("")));
        assert!(!FactValue::from(0).loosely_equals(&FactValue::Null));
    }

    #[test]
    fn test_reflexive_equality() {
        let values = vec![
            FactValue::Bool(true),
            FactValue::Bool(false),
            FactValue::from(0),
            num("-12.75"),
            FactValue::from("yes"),
            FactValue::from("0"),
            FactValue::from("some text"),
            FactValue::from(""),
            FactValue::Null,
        ];
        for value in values {
            assert!(value.loosely_equals(&value), "{:?} should equal itself", value);
        }
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_value(num("25")).unwrap(), json!(25));
        assert_eq!(serde_json::to_value(FactValue::Null).unwrap(), json!(null));
        assert_eq!(serde_json::to_value(FactValue::from("x")).unwrap(), json!("x"));
        assert_eq!(serde_json::to_value(FactValue::Bool(false)).unwrap(), json!(false));
    }
}
