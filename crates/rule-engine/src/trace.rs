//! 评估追踪
//!
//! 按访问顺序（深度优先、条件先于子组、从左到右）记录每个条件的评估行，
//! 不去重、不过滤。

use crate::value::FactValue;
use serde::Serialize;

/// 单个条件的评估记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalLine {
    /// 祖先组名称组成的路径，如 `ROOT > Income > Q1a`
    pub path: String,
    pub token: String,
    /// token 的可读描述
    pub label: String,
    /// 规则中书写的原始操作符
    pub op: String,
    pub expected: FactValue,
    pub actual: FactValue,
    pub pass: bool,
    /// 所属顶层规则组的下标
    #[serde(skip)]
    pub group_index: usize,
}

/// 顶层规则组的通过情况
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub label: String,
    pub pass: bool,
}

/// 追踪输出端
pub trait TraceSink {
    fn record(&mut self, line: EvalLine);
}

/// 累积所有评估行
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    lines: Vec<EvalLine>,
}

impl TraceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[EvalLine] {
        &self.lines
    }

    /// 属于指定顶层组的评估行
    pub fn lines_for_group(&self, group_index: usize) -> impl Iterator<Item = &EvalLine> {
        self.lines.iter().filter(move |l| l.group_index == group_index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<EvalLine> {
        self.lines
    }
}

impl TraceSink for TraceCollector {
    fn record(&mut self, line: EvalLine) {
        self.lines.push(line);
    }
}

/// 丢弃所有评估行
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardTrace;

impl TraceSink for DiscardTrace {
    fn record(&mut self, _line: EvalLine) {}
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub overall: bool,
    pub lines: Vec<EvalLine>,
    pub group_summaries: Vec<GroupSummary>,
}

impl EvaluationResult {
    /// 一行结论
    pub fn message(&self) -> &'static str {
        if self.overall { "Eligible" } else { "Not Eligible" }
    }

    pub fn failed_lines(&self) -> impl Iterator<Item = &EvalLine> {
        self.lines.iter().filter(|l| !l.pass)
    }
}
