//! 条件评估器
//!
//! 按操作符分派比较逻辑。任何类型不兼容或无法识别的情况都得到 `false`，不会返回错误。

use crate::facts::FactTable;
use crate::models::Condition;
use crate::operators::Operator;
use crate::value::{EqualityPolicy, FactValue};
use bigdecimal::BigDecimal;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `actual` - 从事实表中取得的值，缺失时为 `Null`
    /// * `operator` - 操作符，`None` 表示无法识别
    /// * `expected` - 规则中定义的期望值
    pub fn evaluate(actual: &FactValue, operator: Option<Operator>, expected: &FactValue) -> bool {
        Self::evaluate_with(actual, operator, expected, EqualityPolicy::default())
    }

    /// 使用指定的相等策略评估条件
    pub fn evaluate_with(
        actual: &FactValue,
        operator: Option<Operator>,
        expected: &FactValue,
        policy: EqualityPolicy,
    ) -> bool {
        let Some(operator) = operator else {
            return false;
        };

        match operator {
            Operator::Equals => actual.equals_with(expected, policy),
            Operator::NotEquals => !actual.equals_with(expected, policy),
            Operator::GreaterOrEqual => Self::compare(actual, expected, |a, b| a >= b),
            Operator::LessOrEqual => Self::compare(actual, expected, |a, b| a <= b),
            Operator::GreaterThan => Self::compare(actual, expected, |a, b| a > b),
            Operator::LessThan => Self::compare(actual, expected, |a, b| a < b),
        }
    }

    /// 在事实表中查找 token 并评估，同时返回实际值
    pub fn evaluate_condition(condition: &Condition, facts: &FactTable) -> (bool, FactValue) {
        Self::evaluate_condition_with(condition, facts, EqualityPolicy::default())
    }

    pub fn evaluate_condition_with(
        condition: &Condition,
        facts: &FactTable,
        policy: EqualityPolicy,
    ) -> (bool, FactValue) {
        let actual = facts.resolve(&condition.token);
        let pass = Self::evaluate_with(&actual, condition.comparator, &condition.value, policy);
        (pass, actual)
    }

    /// 相等比较
    pub fn equals(actual: &FactValue, expected: &FactValue) -> bool {
        actual.loosely_equals(expected)
    }

    /// 数值比较：任一侧无法转为数值即为 false
    fn compare<F>(actual: &FactValue, expected: &FactValue, cmp: F) -> bool
    where
        F: Fn(&BigDecimal, &BigDecimal) -> bool,
    {
        match (actual.as_number(), expected.as_number()) {
            (Some(a), Some(b)) => cmp(&a, &b),
            _ => false,
        }
    }
}
