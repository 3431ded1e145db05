//! 声明式规则引擎
//!
//! 解析 JSON 编码的布尔规则树，并针对运行时事实表求值：
//! - 规则解析（失败时退化为空文档，不中断调用方）
//! - 跨布尔 / 数值 / 字符串的类型转换与精确十进制比较
//! - AND/OR 规则组归约
//! - 逐条件评估追踪与顶层组摘要

pub mod error;
pub mod evaluator;
pub mod executor;
pub mod facts;
pub mod models;
pub mod operators;
pub mod parser;
pub mod trace;
pub mod value;

pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use executor::RuleExecutor;
pub use facts::{FactTable, TokenCatalog};
pub use models::{Condition, RuleDocument, RuleGroup, RuleNode};
pub use operators::{LogicalOperator, Operator};
pub use parser::{RuleIssue, RuleParser};
pub use trace::{
    DiscardTrace, EvalLine, EvaluationResult, GroupSummary, TraceCollector, TraceSink,
};
pub use value::{EqualityPolicy, FactValue};
