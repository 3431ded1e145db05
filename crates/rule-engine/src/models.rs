//! 规则模型
//!
//! 文档 → 规则组 → {条件 | 子组} 的树形结构，解析后不可变，可在并发评估间只读共享。

use crate::operators::{LogicalOperator, Operator};
use crate::value::FactValue;
use std::collections::BTreeSet;

/// 规则文档
#[derive(Debug, Clone, Default)]
pub struct RuleDocument {
    pub operator: LogicalOperator,
    pub groups: Vec<RuleGroup>,
}

impl RuleDocument {
    pub fn new(operator: LogicalOperator, groups: Vec<RuleGroup>) -> Self {
        Self { operator, groups }
    }

    /// 规范空文档：AND，无规则组
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 规则中引用的全部 token（小写、去重）
    pub fn required_tokens(&self) -> BTreeSet<String> {
        let mut tokens = BTreeSet::new();
        for group in &self.groups {
            group.collect_tokens(&mut tokens);
        }
        tokens
    }
}

/// 规则节点（条件或子组）
#[derive(Debug, Clone)]
pub enum RuleNode {
    Condition(Condition),
    Group(RuleGroup),
}

/// 规则组
///
/// `nodes` 中条件总是排在子组之前，评估与追踪都依赖这一顺序。
#[derive(Debug, Clone, Default)]
pub struct RuleGroup {
    pub id: String,
    pub label: String,
    pub operator: LogicalOperator,
    pub nodes: Vec<RuleNode>,
}

impl RuleGroup {
    pub fn new(id: impl Into<String>, label: impl Into<String>, operator: LogicalOperator) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            operator,
            nodes: Vec::new(),
        }
    }

    pub fn and(id: impl Into<String>) -> Self {
        Self::new(id, "", LogicalOperator::And)
    }

    pub fn or(id: impl Into<String>) -> Self {
        Self::new(id, "", LogicalOperator::Or)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// 追加条件，保持条件位于子组之前
    pub fn with_condition(mut self, condition: Condition) -> Self {
        let at = self
            .nodes
            .iter()
            .position(|n| matches!(n, RuleNode::Group(_)))
            .unwrap_or(self.nodes.len());
        self.nodes.insert(at, RuleNode::Condition(condition));
        self
    }

    pub fn with_group(mut self, group: RuleGroup) -> Self {
        self.nodes.push(RuleNode::Group(group));
        self
    }

    /// 显示名称：label 为空白时回退到 id
    pub fn display_name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.nodes.iter().filter_map(|n| match n {
            RuleNode::Condition(c) => Some(c),
            RuleNode::Group(_) => None,
        })
    }

    pub fn subgroups(&self) -> impl Iterator<Item = &RuleGroup> {
        self.nodes.iter().filter_map(|n| match n {
            RuleNode::Group(g) => Some(g),
            RuleNode::Condition(_) => None,
        })
    }

    fn collect_tokens(&self, tokens: &mut BTreeSet<String>) {
        for node in &self.nodes {
            match node {
                RuleNode::Condition(c) if !c.token.trim().is_empty() => {
                    tokens.insert(c.token.trim().to_lowercase());
                }
                RuleNode::Condition(_) => {}
                RuleNode::Group(g) => g.collect_tokens(tokens),
            }
        }
    }
}

/// 条件节点
#[derive(Debug, Clone)]
pub struct Condition {
    pub id: String,
    pub token: String,
    /// 规则中书写的原始操作符，用于追踪输出
    pub operator: String,
    /// 解析后的操作符；无法识别时为 `None`，条件恒为假
    pub comparator: Option<Operator>,
    pub value: FactValue,
}

impl Condition {
    pub fn new(token: impl Into<String>, operator: impl Into<String>, value: impl Into<FactValue>) -> Self {
        let operator = operator.into();
        Self {
            id: String::new(),
            token: token.into(),
            comparator: Operator::parse(&operator),
            operator,
            value: value.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
