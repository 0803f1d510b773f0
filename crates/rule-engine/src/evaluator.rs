//! 条件评估器
//!
//! 实现各种操作符的评估逻辑。键缺失或类型不匹配一律视为条件不满足，
//! 返回 `false` 而不是错误。

use crate::facts::FactValue;
use crate::operators::{Operand, Operator};

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `field_value` - 从事实表中获取的值
    /// * `operator` - 操作符
    /// * `operand` - 条件中定义的操作数
    pub fn evaluate(field_value: Option<&FactValue>, operator: Operator, operand: &Operand) -> bool {
        // 存在性检查的语义就是判断值是否存在
        match operator {
            Operator::Exists => return field_value.is_some(),
            Operator::NotExists => return field_value.is_none(),
            _ => {}
        }

        let field = match field_value {
            Some(v) => v,
            None => return false,
        };

        match (operator, operand) {
            (Operator::Eq, Operand::Value(expected)) => Self::eq(field, expected) == Some(true),
            (Operator::Neq, Operand::Value(expected)) => Self::eq(field, expected) == Some(false),
            (Operator::Gt, Operand::Value(expected)) => Self::compare(field, expected, |a, b| a > b),
            (Operator::Gte, Operand::Value(expected)) => {
                Self::compare(field, expected, |a, b| a >= b)
            }
            (Operator::Lt, Operand::Value(expected)) => Self::compare(field, expected, |a, b| a < b),
            (Operator::Lte, Operand::Value(expected)) => {
                Self::compare(field, expected, |a, b| a <= b)
            }
            (Operator::Between, Operand::Range(min, max)) => field
                .as_number()
                .is_some_and(|n| n >= *min && n <= *max),
            (Operator::In, Operand::List(items)) => Self::in_list(field, items),
            (Operator::NotIn, Operand::List(items)) => Self::not_in_list(field, items),
            (Operator::Contains, Operand::Value(expected)) => {
                Self::text_pair(field, expected).is_some_and(|(s, sub)| s.contains(sub))
            }
            (Operator::StartsWith, Operand::Value(expected)) => {
                Self::text_pair(field, expected).is_some_and(|(s, prefix)| s.starts_with(prefix))
            }
            (Operator::EndsWith, Operand::Value(expected)) => {
                Self::text_pair(field, expected).is_some_and(|(s, suffix)| s.ends_with(suffix))
            }
            (Operator::Regex, Operand::Pattern(re)) => field.as_text().is_some_and(|s| re.is_match(s)),
            // 操作符与操作数形状不符
            _ => false,
        }
    }

    /// 相等比较，类型不同时返回 None
    fn eq(field: &FactValue, expected: &FactValue) -> Option<bool> {
        match (field, expected) {
            (FactValue::Number(a), FactValue::Number(b)) => Some((a - b).abs() < f64::EPSILON),
            (FactValue::Bool(a), FactValue::Bool(b)) => Some(a == b),
            (FactValue::Text(a), FactValue::Text(b)) => Some(a == b),
            _ => None,
        }
    }

    /// 数值比较，任一侧不是数值时为 false
    fn compare<F>(field: &FactValue, expected: &FactValue, cmp: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        match (field.as_number(), expected.as_number()) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }

    fn in_list(field: &FactValue, items: &[FactValue]) -> bool {
        items.iter().any(|item| Self::eq(field, item) == Some(true))
    }

    /// 每个元素都必须可比较且不相等
    fn not_in_list(field: &FactValue, items: &[FactValue]) -> bool {
        items.iter().all(|item| Self::eq(field, item) == Some(false))
    }

    fn text_pair<'a>(field: &'a FactValue, expected: &'a FactValue) -> Option<(&'a str, &'a str)> {
        Some((field.as_text()?, expected.as_text()?))
    }
}
