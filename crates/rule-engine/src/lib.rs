//! 事实规则引擎
//!
//! 前向规则评估核心：
//! - 以名称为键的异构事实表
//! - 条件（纯谓词）的合取 + 一个动作组成规则
//! - 按注册顺序评估所有规则，条件短路求值
//! - 失败策略：立即中止或逐条隔离

pub mod action;
pub mod condition;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod facts;
pub mod operators;
pub mod report;
pub mod rule;
pub mod test_utils;

pub use action::{Action, ActionResult};
pub use condition::{AllOf, AnyOf, Condition, FieldCondition, Not};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use fact_rule_shared::config::{EngineConfig, ErrorPolicy};
pub use facts::{FactTable, FactValue};
pub use operators::{Operand, Operator};
pub use report::{EvaluationReport, RuleFailure, RuleOutcome};
pub use rule::{Rule, RuleBuilder, RuleId};
