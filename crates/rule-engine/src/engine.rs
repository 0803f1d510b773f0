//! 规则引擎
//!
//! 按注册顺序评估所有规则：每条规则的条件按顺序短路求值，全部满足则执行动作；
//! 无论当前规则是否触发都继续评估下一条。

use crate::action::Action;
use crate::condition::Condition;
use crate::error::{Result, RuleError};
use crate::facts::FactTable;
use crate::report::{EvaluationReport, RuleFailure, RuleOutcome};
use crate::rule::{Rule, RuleId};
use fact_rule_shared::config::{EngineConfig, ErrorPolicy};
use fact_rule_shared::observability::metrics as engine_metrics;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// 规则引擎
///
/// 规则只追加、不删除、不重排。`Clone` 得到的副本共享同一规则序列。
#[derive(Clone)]
pub struct RuleEngine {
    rules: Arc<RwLock<Vec<Arc<Rule>>>>,
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            rules: Arc::new(RwLock::new(Vec::new())),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 追加规则（自动命名为 `rule-<序号>`，跳过已被占用的名称）
    ///
    /// 空条件列表合法（无条件规则）；缺少动作在注册时即被拒绝。
    #[instrument(skip(self, conditions, action), fields(conditions = conditions.len()))]
    pub fn add_rule(
        &self,
        conditions: Vec<Arc<dyn Condition>>,
        action: Option<Arc<dyn Action>>,
    ) -> Result<RuleId> {
        let mut rules = self.rules.write();
        let name = next_auto_name(&rules);

        let mut builder = Rule::builder(name).when_all(conditions);
        if let Some(action) = action {
            builder = builder.then_shared(action);
        }

        let rule = builder.build().inspect_err(|e| warn!("规则注册被拒绝: {}", e))?;
        let rule_id = rule.id();
        info!("规则已注册: {}", rule.name());
        rules.push(Arc::new(rule));

        Ok(rule_id)
    }

    /// 追加命名规则
    pub fn add_named_rule(
        &self,
        name: impl Into<String>,
        conditions: Vec<Arc<dyn Condition>>,
        action: Arc<dyn Action>,
    ) -> Result<RuleId> {
        let rule = Rule::builder(name)
            .when_all(conditions)
            .then_shared(action)
            .build()?;
        self.register(rule)
    }

    /// 追加已构建的规则
    ///
    /// 规则名称在引擎内唯一，重名返回 [`RuleError::InvalidRule`]。
    #[instrument(skip(self, rule), fields(rule_id = %rule.id(), rule_name = %rule.name()))]
    pub fn register(&self, rule: Rule) -> Result<RuleId> {
        let mut rules = self.rules.write();
        if rules.iter().any(|r| r.name() == rule.name()) {
            warn!("规则注册被拒绝: 名称重复 {}", rule.name());
            return Err(RuleError::InvalidRule(format!("规则名称重复: {}", rule.name())));
        }

        let rule_id = rule.id();
        info!("规则已注册: {}", rule.name());
        rules.push(Arc::new(rule));
        Ok(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// 按注册顺序返回规则名称
    pub fn rule_names(&self) -> Vec<String> {
        self.rules.read().iter().map(|r| r.name().to_string()).collect()
    }

    /// 按注册顺序返回规则 ID
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules.read().iter().map(|r| r.id()).collect()
    }

    /// 执行一轮评估
    ///
    /// 评估开始时对规则序列取快照，动作中注册的新规则从下一轮开始生效。
    /// `FailFast` 策略下第一个失败立即返回错误，剩余规则不再评估；
    /// `Isolate` 策略下失败记录在 [`EvaluationReport::failures`] 中并继续。
    #[instrument(skip(self, facts), fields(facts = facts.len()))]
    pub fn evaluate(&self, facts: &FactTable) -> Result<EvaluationReport> {
        let start = Instant::now();
        let rules: Vec<Arc<Rule>> = self.rules.read().clone();
        let mut report = EvaluationReport::new();

        for rule in &rules {
            match self.evaluate_rule(rule, facts, &mut report.trace) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => match self.config.error_policy {
                    ErrorPolicy::FailFast => {
                        error!(rule = %rule.name(), "规则执行失败，中止本轮评估: {}", error);
                        self.record(&report, 1, start);
                        return Err(error);
                    }
                    ErrorPolicy::Isolate => {
                        warn!(rule = %rule.name(), "规则执行失败，继续评估: {}", error);
                        report.outcomes.push(RuleOutcome::new(rule));
                        report.failures.push(RuleFailure {
                            rule_id: rule.id(),
                            rule_name: rule.name().to_string(),
                            error,
                        });
                    }
                },
            }
        }

        report.elapsed_micros = start.elapsed().as_micros() as u64;
        self.record(&report, report.failures.len(), start);

        debug!(
            rules = rules.len(),
            fired = report.fired_count(),
            failures = report.failures.len(),
            "评估完成"
        );

        Ok(report)
    }

    /// 评估单条规则：条件短路求值，全部满足则执行动作
    fn evaluate_rule(
        &self,
        rule: &Rule,
        facts: &FactTable,
        trace: &mut Vec<String>,
    ) -> Result<RuleOutcome> {
        let mut outcome = RuleOutcome::new(rule);

        for (index, condition) in rule.conditions().iter().enumerate() {
            let held = self.guard(|| condition.evaluate(facts)).map_err(|message| {
                RuleError::ConditionPanicked {
                    rule: rule.name().to_string(),
                    index,
                    message,
                }
            })?;

            if self.config.trace_enabled {
                trace.push(format!(
                    "{}.conditions[{}]: {} => {}",
                    rule.name(),
                    index,
                    condition.describe(),
                    if held { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }

            if !held {
                if self.config.trace_enabled {
                    trace.push(format!("{}: 短路 - 条件 {} 不满足", rule.name(), index));
                }
                outcome.failed_condition = Some(index);
                return Ok(outcome);
            }
        }

        self.guard(|| rule.fire(facts))
            .map_err(|message| RuleError::ActionPanicked {
                rule: rule.name().to_string(),
                message,
            })?
            .map_err(|source| RuleError::ActionFailed {
                rule: rule.name().to_string(),
                source,
            })?;

        if self.config.trace_enabled {
            trace.push(format!("{}: 已触发", rule.name()));
        }
        debug!(rule = %rule.name(), "规则已触发");

        outcome.fired = true;
        Ok(outcome)
    }

    /// 按配置捕获 panic
    fn guard<T>(&self, f: impl FnOnce() -> T) -> std::result::Result<T, String> {
        if !self.config.catch_panics {
            return Ok(f());
        }
        panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
    }

    fn record(&self, report: &EvaluationReport, failed: usize, start: Instant) {
        let policy = match self.config.error_policy {
            ErrorPolicy::FailFast => "fail_fast",
            ErrorPolicy::Isolate => "isolate",
        };
        engine_metrics::record_evaluation(
            report.fired_count(),
            failed,
            policy,
            start.elapsed().as_secs_f64(),
        );
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 第一个未被占用的 `rule-<n>`，n 从当前规则数加一开始
fn next_auto_name(rules: &[Arc<Rule>]) -> String {
    let mut n = rules.len() + 1;
    loop {
        let name = format!("rule-{}", n);
        if !rules.iter().any(|r| r.name() == name) {
            return name;
        }
        n += 1;
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
