//! 规则定义
//!
//! 规则 = 有序条件的合取 + 一个动作。

use crate::action::{Action, ActionResult};
use crate::condition::Condition;
use crate::error::{Result, RuleError};
use crate::facts::FactTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 规则 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RuleId(Uuid);

impl RuleId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 规则
///
/// 通过 [`Rule::builder`] 构造，构造时即校验动作是否存在。
#[derive(Clone)]
pub struct Rule {
    id: RuleId,
    name: String,
    conditions: Vec<Arc<dyn Condition>>,
    action: Arc<dyn Action>,
    created_at: DateTime<Utc>,
}

impl Rule {
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(name)
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Arc<dyn Condition>] {
        &self.conditions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 所有条件是否都满足（遇到 false 立即返回，无条件规则恒为 true）
    pub fn matches(&self, facts: &FactTable) -> bool {
        self.conditions.iter().all(|c| c.evaluate(facts))
    }

    /// 执行动作
    pub fn fire(&self, facts: &FactTable) -> ActionResult {
        self.action.execute(facts)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions: Vec<String> = self.conditions.iter().map(|c| c.describe()).collect();
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("conditions", &conditions)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// 规则构建器
pub struct RuleBuilder {
    name: String,
    conditions: Vec<Arc<dyn Condition>>,
    action: Option<Arc<dyn Action>>,
}

impl RuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            action: None,
        }
    }

    /// 追加一个条件
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.conditions.push(Arc::new(condition));
        self
    }

    /// 追加一个闭包条件
    pub fn when_fn<F>(self, f: F) -> Self
    where
        F: Fn(&FactTable) -> bool + Send + Sync + 'static,
    {
        self.when(f)
    }

    /// 按顺序追加多个共享条件
    pub fn when_all(mut self, conditions: impl IntoIterator<Item = Arc<dyn Condition>>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn then(self, action: impl Action + 'static) -> Self {
        self.then_shared(Arc::new(action))
    }

    pub fn then_fn<F>(self, f: F) -> Self
    where
        F: Fn(&FactTable) -> ActionResult + Send + Sync + 'static,
    {
        self.then(f)
    }

    pub fn then_shared(mut self, action: Arc<dyn Action>) -> Self {
        self.action = Some(action);
        self
    }

    /// 校验并构建规则
    pub fn build(self) -> Result<Rule> {
        if self.name.trim().is_empty() {
            return Err(RuleError::InvalidRule("规则名称不能为空".to_string()));
        }

        let action = self.action.ok_or_else(|| RuleError::MissingAction {
            rule: self.name.clone(),
        })?;

        Ok(Rule {
            id: RuleId::new(),
            name: self.name,
            conditions: self.conditions,
            action,
            created_at: Utc::now(),
        })
    }
}
