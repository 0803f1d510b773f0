//! 条件
//!
//! 条件是事实表上的纯谓词。闭包可直接作为条件使用，
//! [`FieldCondition`] 提供声明式的字段比较，[`AllOf`]/[`AnyOf`]/[`Not`] 组合子条件。

use crate::error::{Result, RuleError};
use crate::evaluator::ConditionEvaluator;
use crate::facts::{FactTable, FactValue};
use crate::operators::{Operand, Operator};
use regex::Regex;
use std::sync::Arc;

/// 事实表上的纯谓词
///
/// 只能通过共享引用读取事实表；键缺失或类型不符时应返回 `false`。
pub trait Condition: Send + Sync {
    fn evaluate(&self, facts: &FactTable) -> bool;

    /// 用于评估追踪的描述
    fn describe(&self) -> String {
        "predicate".to_string()
    }
}

impl<F> Condition for F
where
    F: Fn(&FactTable) -> bool + Send + Sync,
{
    fn evaluate(&self, facts: &FactTable) -> bool {
        self(facts)
    }
}

/// 将闭包包装为共享条件
pub fn predicate<F>(f: F) -> Arc<dyn Condition>
where
    F: Fn(&FactTable) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 字段条件：`field operator operand`
#[derive(Debug, Clone)]
pub struct FieldCondition {
    field: String,
    operator: Operator,
    operand: Operand,
}

impl FieldCondition {
    /// 创建单值比较条件
    ///
    /// 仅接受单值操作符；区间、列表、正则和存在性检查请使用对应的构造函数。
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<FactValue>) -> Result<Self> {
        let value = value.into();

        let expected = match operator {
            Operator::Eq | Operator::Neq => None,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                value.as_number().is_none().then_some("number")
            }
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                value.as_text().is_none().then_some("text")
            }
            Operator::Between => Some("区间 [min, max]，请使用 FieldCondition::between"),
            Operator::In | Operator::NotIn => Some("列表，请使用 FieldCondition::one_of/none_of"),
            Operator::Regex => Some("正则表达式，请使用 FieldCondition::matches"),
            Operator::Exists | Operator::NotExists => {
                Some("无操作数，请使用 FieldCondition::exists/missing")
            }
        };

        if let Some(expected) = expected {
            return Err(RuleError::InvalidOperand {
                operator: operator.to_string(),
                expected: expected.to_string(),
            });
        }

        Ok(Self::with_operand(field, operator, Operand::Value(value)))
    }

    fn with_operand(field: impl Into<String>, operator: Operator, operand: Operand) -> Self {
        Self {
            field: field.into(),
            operator,
            operand,
        }
    }

    /// 相等比较。数值按绝对误差 `f64::EPSILON` 判等，
    /// 因此量级远小于 1 的数值（如 `1e-20` 与 `0`）视为相等。
    pub fn eq(field: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self::with_operand(field, Operator::Eq, Operand::Value(value.into()))
    }

    pub fn gt(field: impl Into<String>, value: f64) -> Self {
        Self::with_operand(field, Operator::Gt, Operand::Value(value.into()))
    }

    pub fn gte(field: impl Into<String>, value: f64) -> Self {
        Self::with_operand(field, Operator::Gte, Operand::Value(value.into()))
    }

    pub fn lt(field: impl Into<String>, value: f64) -> Self {
        Self::with_operand(field, Operator::Lt, Operand::Value(value.into()))
    }

    pub fn lte(field: impl Into<String>, value: f64) -> Self {
        Self::with_operand(field, Operator::Lte, Operand::Value(value.into()))
    }

    /// 闭区间 [min, max]
    pub fn between(field: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(RuleError::InvalidOperand {
                operator: Operator::Between.to_string(),
                expected: format!("min <= max，实际 [{}, {}]", min, max),
            });
        }
        Ok(Self::with_operand(field, Operator::Between, Operand::Range(min, max)))
    }

    pub fn one_of<V: Into<FactValue>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let items = values.into_iter().map(Into::into).collect();
        Self::with_operand(field, Operator::In, Operand::List(items))
    }

    pub fn none_of<V: Into<FactValue>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let items = values.into_iter().map(Into::into).collect();
        Self::with_operand(field, Operator::NotIn, Operand::List(items))
    }

    /// 正则匹配，模式在构造时编译
    pub fn matches(field: impl Into<String>, pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_operand(field, Operator::Regex, Operand::Pattern(re)))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::with_operand(field, Operator::Exists, Operand::None)
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::with_operand(field, Operator::NotExists, Operand::None)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }
}

impl Condition for FieldCondition {
    fn evaluate(&self, facts: &FactTable) -> bool {
        ConditionEvaluator::evaluate(facts.get(&self.field), self.operator, &self.operand)
    }

    fn describe(&self) -> String {
        if self.operator.is_presence_check() {
            format!("{} {}", self.field, self.operator)
        } else {
            format!("{} {} {}", self.field, self.operator, self.operand)
        }
    }
}

/// AND 组：所有子条件都满足，遇到 false 立即返回
#[derive(Clone, Default)]
pub struct AllOf {
    children: Vec<Arc<dyn Condition>>,
}

impl AllOf {
    pub fn new(children: Vec<Arc<dyn Condition>>) -> Self {
        Self { children }
    }
}

impl Condition for AllOf {
    fn evaluate(&self, facts: &FactTable) -> bool {
        self.children.iter().all(|c| c.evaluate(facts))
    }

    fn describe(&self) -> String {
        describe_group(&self.children, "AND")
    }
}

/// OR 组：任一子条件满足即可，遇到 true 立即返回
#[derive(Clone, Default)]
pub struct AnyOf {
    children: Vec<Arc<dyn Condition>>,
}

impl AnyOf {
    pub fn new(children: Vec<Arc<dyn Condition>>) -> Self {
        Self { children }
    }
}

impl Condition for AnyOf {
    fn evaluate(&self, facts: &FactTable) -> bool {
        self.children.iter().any(|c| c.evaluate(facts))
    }

    fn describe(&self) -> String {
        describe_group(&self.children, "OR")
    }
}

/// 取反
#[derive(Clone)]
pub struct Not {
    inner: Arc<dyn Condition>,
}

impl Not {
    pub fn new(inner: Arc<dyn Condition>) -> Self {
        Self { inner }
    }
}

impl Condition for Not {
    fn evaluate(&self, facts: &FactTable) -> bool {
        !self.inner.evaluate(facts)
    }

    fn describe(&self) -> String {
        format!("NOT {}", self.inner.describe())
    }
}

fn describe_group(children: &[Arc<dyn Condition>], operator: &str) -> String {
    let parts: Vec<String> = children.iter().map(|c| c.describe()).collect();
    format!("({})", parts.join(&format!(" {} ", operator)))
}
