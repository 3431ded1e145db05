//! 规则执行器
//!
//! 遍历规则树并生成结论、评估追踪和顶层组摘要。
//! 不做短路求值：每个条件都会被评估并记录一行追踪。

use crate::evaluator::ConditionEvaluator;
use crate::facts::{FactTable, TokenCatalog};
use crate::models::{RuleDocument, RuleGroup, RuleNode};
use crate::trace::{
    DiscardTrace, EvalLine, EvaluationResult, GroupSummary, TraceCollector, TraceSink,
};
use crate::value::EqualityPolicy;
use rule_shared::config::EngineConfig;
use tracing::{debug, instrument};

pub const DEFAULT_ROOT_PATH: &str = "ROOT";
pub const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// 规则执行器
///
/// 自身不持有可变状态，可在多个线程间共享；每次调用各自创建追踪收集器。
#[derive(Debug, Clone)]
pub struct RuleExecutor {
    root_path: String,
    path_separator: String,
    catalog: TokenCatalog,
    equality: EqualityPolicy,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            root_path: DEFAULT_ROOT_PATH.to_string(),
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            catalog: TokenCatalog::new(),
            equality: EqualityPolicy::default(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            root_path: config.root_path.clone(),
            path_separator: config.path_separator.clone(),
            catalog: config.token_labels.iter().collect(),
            equality: if config.strict_boolean_equality {
                EqualityPolicy::StrictBoolean
            } else {
                EqualityPolicy::CoercionOrder
            },
        }
    }

    /// 设置 token 标签目录
    pub fn with_catalog(mut self, catalog: TokenCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }

    pub fn with_equality_policy(mut self, policy: EqualityPolicy) -> Self {
        self.equality = policy;
        self
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn equality_policy(&self) -> EqualityPolicy {
        self.equality
    }

    /// 执行完整评估
    ///
    /// 每个顶层组只评估一次，组摘要在该组完成时直接记录。
    #[instrument(skip_all, fields(operator = %doc.operator, groups = doc.groups.len()))]
    pub fn execute(&self, doc: &RuleDocument, facts: &FactTable) -> EvaluationResult {
        let mut collector = TraceCollector::new();
        let mut results = Vec::with_capacity(doc.groups.len());
        let mut group_summaries = Vec::with_capacity(doc.groups.len());

        for (index, group) in doc.groups.iter().enumerate() {
            let pass = self.walk_group(group, facts, &self.root_path, index, &mut collector);
            debug!(
                id = %group.id,
                label = %group.display_name(),
                "CRITERIA SUMMARY => {}",
                if pass { "PASS" } else { "FAIL" }
            );
            group_summaries.push(Self::summarize(group, pass));
            results.push(pass);
        }

        let overall = doc.operator.reduce(results);
        debug!(overall, lines = collector.len(), "规则评估完成");

        EvaluationResult {
            overall,
            lines: collector.into_lines(),
            group_summaries,
        }
    }

    /// 评估整个文档，追踪写入调用方提供的输出端
    pub fn evaluate_document(
        &self,
        doc: &RuleDocument,
        facts: &FactTable,
        sink: &mut dyn TraceSink,
    ) -> bool {
        let results: Vec<bool> = doc
            .groups
            .iter()
            .enumerate()
            .map(|(index, group)| self.walk_group(group, facts, &self.root_path, index, sink))
            .collect();

        doc.operator.reduce(results)
    }

    /// 评估单个规则组
    pub fn evaluate_group(
        &self,
        group: &RuleGroup,
        facts: &FactTable,
        parent_path: &str,
        sink: &mut dyn TraceSink,
    ) -> bool {
        self.walk_group(group, facts, parent_path, 0, sink)
    }

    /// 逐个独立评估顶层组，追踪被丢弃
    ///
    /// 结果与 [`RuleExecutor::execute`] 中的 `group_summaries` 一致。
    pub fn build_group_summaries(
        &self,
        doc: &RuleDocument,
        facts: &FactTable,
    ) -> Vec<GroupSummary> {
        doc.groups
            .iter()
            .map(|group| {
                let pass = self.evaluate_group(group, facts, &self.root_path, &mut DiscardTrace);
                Self::summarize(group, pass)
            })
            .collect()
    }

    fn summarize(group: &RuleGroup, pass: bool) -> GroupSummary {
        GroupSummary {
            id: group.id.clone(),
            label: group.display_name().to_string(),
            pass,
        }
    }

    fn walk_group(
        &self,
        group: &RuleGroup,
        facts: &FactTable,
        parent_path: &str,
        group_index: usize,
        sink: &mut dyn TraceSink,
    ) -> bool {
        let path = format!("{}{}{}", parent_path, self.path_separator, group.display_name());
        let mut results = Vec::with_capacity(group.nodes.len());

        // 条件先于子组：nodes 已按此顺序排列
        for node in &group.nodes {
            let pass = match node {
                RuleNode::Condition(cond) => {
                    let (pass, actual) =
                        ConditionEvaluator::evaluate_condition_with(cond, facts, self.equality);
                    sink.record(EvalLine {
                        path: path.clone(),
                        token: cond.token.clone(),
                        label: self.catalog.label_or_token(&cond.token).to_string(),
                        op: cond.operator.clone(),
                        expected: cond.value.clone(),
                        actual,
                        pass,
                        group_index,
                    });
                    pass
                }
                RuleNode::Group(child) => self.walk_group(child, facts, &path, group_index, sink),
            };
            results.push(pass);
        }

        let result = group.operator.reduce(results);
        debug!(group = %path, operator = %group.operator, result, "规则组评估完成");
        result
    }
}

impl Default for RuleExecutor {
    fn default() -> Self {
        Self::new()
    }
}
