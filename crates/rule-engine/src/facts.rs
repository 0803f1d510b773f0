//! 事实表
//!
//! 规则评估的输入：以名称为键的异构值快照。评估期间只读。

use crate::error::{Result, RuleError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

/// 事实值（数值、布尔、文本）
///
/// 键不存在由 [`FactTable::get`] 返回 `None` 表示，不占用变体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl FactValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 获取值的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for FactValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for FactValue {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// 事实表 - 提供给规则引擎的数据
///
/// 反序列化与 [`FactTable::from_json`] 规则一致：`null` 视为缺失，嵌套值被拒绝。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FactTable {
    facts: HashMap<String, FactValue>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加事实
    pub fn with_fact(mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.facts.insert(key.into(), value.into());
        self
    }

    /// 从 JSON 对象创建
    ///
    /// `null` 视为缺失；嵌套的数组和对象不受支持。
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Option<FactValue> {
        self.facts.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<FactValue> {
        self.facts.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.facts.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    /// 读取数值事实，缺失或类型不符时返回 None
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FactValue::as_number)
    }

    /// 读取布尔事实，缺失或类型不符时返回 None
    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FactValue::as_bool)
    }

    /// 读取文本事实，缺失或类型不符时返回 None
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FactValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, FactValue> {
        self.facts.iter()
    }
}

impl<'de> Deserialize<'de> for FactTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        FactTable::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for FactTable {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(RuleError::InvalidFacts(format!(
                    "期望 JSON 对象, 实际 {}",
                    json_type_name(&other)
                )));
            }
        };

        let mut table = FactTable::new();
        for (key, value) in map {
            let fact = match value {
                Value::Null => continue,
                Value::Bool(b) => FactValue::Bool(b),
                Value::String(s) => FactValue::Text(s),
                Value::Number(n) => match n.as_f64() {
                    Some(n) => FactValue::Number(n),
                    None => {
                        return Err(RuleError::UnsupportedFactValue {
                            key,
                            found: n.to_string(),
                        });
                    }
                },
                other => {
                    return Err(RuleError::UnsupportedFactValue {
                        key,
                        found: json_type_name(&other).to_string(),
                    });
                }
            };
            table.facts.insert(key, fact);
        }

        Ok(table)
    }
}

impl<K, V> FromIterator<(K, V)> for FactTable
where
    K: Into<String>,
    V: Into<FactValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = FactTable::new();
        table.extend(iter);
        table
    }
}

impl<K, V> Extend<(K, V)> for FactTable
where
    K: Into<String>,
    V: Into<FactValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.facts.insert(key.into(), value.into());
        }
    }
}

impl<'a> IntoIterator for &'a FactTable {
    type Item = (&'a String, &'a FactValue);
    type IntoIter = hash_map::Iter<'a, String, FactValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
