//! 测试工具模块
//!
//! 提供集成测试和基准测试使用的事实表样例和可记录触发顺序的动作。

use crate::action::{Action, ActionResult};
use crate::facts::FactTable;
use parking_lot::Mutex;
use std::sync::Arc;

/// 模拟一次传感器轮询得到的事实表
pub fn sensor_facts(temperature: f64) -> FactTable {
    FactTable::new()
        .with_fact("temperature", temperature)
        .with_fact("humidity", 45)
        .with_fact("ac_on", false)
        .with_fact("room", "server-room")
}

/// 生成 `field_0..field_n` 的数值事实表
pub fn numbered_facts(count: usize) -> FactTable {
    (0..count).map(|i| (format!("field_{}", i), i as f64)).collect()
}

/// 记录触发顺序的动作，克隆后共享同一份记录
#[derive(Clone, Default)]
pub struct RecordingAction {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingAction {
    /// 创建一组共享同一份记录的动作
    pub fn shared(log: &Arc<Mutex<Vec<String>>>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
        }
    }

    pub fn new(label: impl Into<String>) -> Self {
        Self::shared(&Arc::default(), label)
    }

    pub fn into_action(self) -> Arc<dyn Action> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().len()
    }
}

impl Action for RecordingAction {
    fn execute(&self, _facts: &FactTable) -> ActionResult {
        self.log.lock().push(self.label.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_action_shares_log() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = RecordingAction::shared(&log, "a");
        let b = RecordingAction::shared(&log, "b");

        b.execute(&FactTable::new()).unwrap();
        a.execute(&FactTable::new()).unwrap();

        assert_eq!(a.calls(), vec!["b", "a"]);
        assert_eq!(b.call_count(), 2);
    }

    #[test]
    fn test_numbered_facts() {
        let facts = numbered_facts(3);
        assert_eq!(facts.len(), 3);
        assert_eq!(facts.number("field_2"), Some(2.0));
    }
}
