//! 条件操作符定义

use crate::facts::FactValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // 通用比较
    Eq,
    Neq,

    // 数值比较
    Gt,
    Gte,
    Lt,
    Lte,
    Between,

    // 列表检查
    In,
    NotIn,

    // 文本操作
    Contains,
    StartsWith,
    EndsWith,
    Regex,

    // 存在性检查
    Exists,
    NotExists,
}

impl Operator {
    /// 只检查键是否存在，不需要操作数
    pub fn is_presence_check(&self) -> bool {
        matches!(self, Self::Exists | Self::NotExists)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "regex",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
        };
        write!(f, "{}", s)
    }
}

/// 条件右侧的操作数
#[derive(Debug, Clone)]
pub enum Operand {
    Value(FactValue),
    /// 闭区间 [min, max]
    Range(f64, f64),
    List(Vec<FactValue>),
    /// 构造时已编译的正则表达式
    Pattern(Regex),
    None,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Range(min, max) => write!(f, "[{}, {}]", min, max),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::None => Ok(()),
        }
    }
}
