//! 评估结果

use crate::error::RuleError;
use crate::rule::{Rule, RuleId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 单条规则的评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub fired: bool,
    /// 第一个不满足的条件下标（短路位置）
    pub failed_condition: Option<usize>,
}

impl RuleOutcome {
    pub(crate) fn new(rule: &Rule) -> Self {
        Self {
            rule_id: rule.id(),
            rule_name: rule.name().to_string(),
            fired: false,
            failed_condition: None,
        }
    }
}

/// 执行失败的规则
#[derive(Debug)]
pub struct RuleFailure {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub error: RuleError,
}

/// 一轮评估的结果
#[derive(Debug)]
pub struct EvaluationReport {
    pub evaluated_at: DateTime<Utc>,
    /// 按注册顺序，每条被评估的规则一项
    pub outcomes: Vec<RuleOutcome>,
    pub failures: Vec<RuleFailure>,
    pub trace: Vec<String>,
    pub elapsed_micros: u64,
}

impl EvaluationReport {
    pub(crate) fn new() -> Self {
        Self {
            evaluated_at: Utc::now(),
            outcomes: Vec::new(),
            failures: Vec::new(),
            trace: Vec::new(),
            elapsed_micros: 0,
        }
    }

    /// 按触发顺序返回已触发的规则名称
    pub fn fired(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.fired)
            .map(|o| o.rule_name.as_str())
            .collect()
    }

    pub fn fired_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.fired).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 按名称查找第一条匹配的结果
    pub fn outcome(&self, rule_name: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule_name == rule_name)
    }
}
