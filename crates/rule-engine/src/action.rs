//! 规则动作
//!
//! 条件全部满足时执行的副作用。动作只拿到事实表的共享引用，
//! 同一轮评估中不能回写事实表。

use crate::facts::FactTable;
use std::sync::Arc;
use tracing::warn;

pub type ActionResult = anyhow::Result<()>;

/// 规则触发时执行的动作
#[cfg_attr(test, mockall::automock)]
pub trait Action: Send + Sync {
    fn execute(&self, facts: &FactTable) -> ActionResult;
}

impl<F> Action for F
where
    F: Fn(&FactTable) -> ActionResult + Send + Sync,
{
    fn execute(&self, facts: &FactTable) -> ActionResult {
        self(facts)
    }
}

/// 将可能失败的闭包包装为共享动作
pub fn from_fn<F>(f: F) -> Arc<dyn Action>
where
    F: Fn(&FactTable) -> ActionResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 将不会失败的闭包包装为共享动作
pub fn infallible<F>(f: F) -> Arc<dyn Action>
where
    F: Fn(&FactTable) + Send + Sync + 'static,
{
    from_fn(move |facts| {
        f(facts);
        Ok(())
    })
}

/// 输出一条警告日志的动作
pub fn log(message: impl Into<String>) -> Arc<dyn Action> {
    Arc::new(LogAction {
        message: message.into(),
    })
}

struct LogAction {
    message: String,
}

impl Action for LogAction {
    fn execute(&self, facts: &FactTable) -> ActionResult {
        warn!(facts = facts.len(), "{}", self.message);
        Ok(())
    }
}
