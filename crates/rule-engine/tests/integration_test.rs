//! 规则引擎集成测试
//!
//! 测试规则注册、评估、失败策略的完整工作流。

use mockall::mock;
use parking_lot::Mutex;
use rule_engine::action::{self, ActionResult};
use rule_engine::condition::predicate;
use rule_engine::test_utils::{RecordingAction, sensor_facts};
use rule_engine::{
    Action, AnyOf, Condition, EngineConfig, ErrorPolicy, FactTable, FieldCondition, Rule,
    RuleEngine, RuleError,
};
use std::sync::Arc;
use std::thread;

mock! {
    pub Alarm {}

    impl Action for Alarm {
        fn execute(&self, facts: &FactTable) -> ActionResult;
    }
}

fn too_hot() -> Arc<dyn Condition> {
    predicate(|facts| facts.number("temperature").is_some_and(|t| t > 30.0))
}

// ==================== 端到端场景 ====================

#[test]
fn test_temperature_scenario() {
    let mut alarm = MockAlarm::new();
    alarm
        .expect_execute()
        .withf(|facts| facts.number("temperature") == Some(32.0))
        .times(1)
        .returning(|_| Ok(()));

    let engine = RuleEngine::new();
    engine.add_rule(vec![too_hot()], Some(Arc::new(alarm))).unwrap();

    let report = engine
        .evaluate(&FactTable::new().with_fact("temperature", 32.0))
        .unwrap();
    assert_eq!(report.fired_count(), 1);

    let report = engine
        .evaluate(&FactTable::new().with_fact("temperature", 20.0))
        .unwrap();
    assert_eq!(report.fired_count(), 0);

    // 类型不符：条件退化为 false，不报错
    let report = engine
        .evaluate(&FactTable::new().with_fact("temperature", "hot"))
        .unwrap();
    assert_eq!(report.fired_count(), 0);
    assert!(!report.has_failures());
}

#[test]
fn test_temperature_scenario_from_json() {
    let alarm = RecordingAction::new("ac_on");
    let engine = RuleEngine::new();
    engine
        .add_rule(
            vec![Arc::new(FieldCondition::gt("temperature", 30.0))],
            Some(alarm.clone().into_action()),
        )
        .unwrap();

    engine
        .evaluate(&FactTable::from_json(r#"{"temperature": 32.0}"#).unwrap())
        .unwrap();
    engine
        .evaluate(&FactTable::from_json(r#"{"temperature": "hot"}"#).unwrap())
        .unwrap();
    engine.evaluate(&FactTable::new()).unwrap();

    assert_eq!(alarm.call_count(), 1);
}

// ==================== 合取语义 ====================

#[test]
fn test_conjunction() {
    let fired = RecordingAction::new("fired");
    let engine = RuleEngine::new();
    engine
        .add_rule(
            vec![
                Arc::new(FieldCondition::gt("temperature", 30.0)),
                Arc::new(FieldCondition::eq("ac_on", false)),
                Arc::new(FieldCondition::eq("room", "server-room")),
            ],
            Some(fired.clone().into_action()),
        )
        .unwrap();

    engine.evaluate(&sensor_facts(35.0)).unwrap();
    assert_eq!(fired.call_count(), 1);

    // 任一条件不满足都不触发
    engine
        .evaluate(&sensor_facts(35.0).with_fact("ac_on", true))
        .unwrap();
    engine.evaluate(&sensor_facts(25.0)).unwrap();
    assert_eq!(fired.call_count(), 1);
}

#[test]
fn test_unconditional_rule_always_fires() {
    let fired = RecordingAction::new("always");
    let engine = RuleEngine::new();
    engine.add_rule(vec![], Some(fired.clone().into_action())).unwrap();

    engine.evaluate(&FactTable::new()).unwrap();
    engine.evaluate(&sensor_facts(10.0)).unwrap();

    assert_eq!(fired.call_count(), 2);
}

#[test]
fn test_disjunction_via_any_of() {
    let fired = RecordingAction::new("alert");
    let engine = RuleEngine::new();
    let extreme: Arc<dyn Condition> = Arc::new(AnyOf::new(vec![
        Arc::new(FieldCondition::gt("temperature", 40.0)),
        Arc::new(FieldCondition::lt("temperature", 0.0)),
    ]));
    engine.add_rule(vec![extreme], Some(fired.clone().into_action())).unwrap();

    engine.evaluate(&sensor_facts(-5.0)).unwrap();
    engine.evaluate(&sensor_facts(20.0)).unwrap();
    engine.evaluate(&sensor_facts(45.0)).unwrap();

    assert_eq!(fired.call_count(), 2);
}

// ==================== 顺序与独立性 ====================

#[test]
fn test_rules_fire_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = RuleEngine::new();
    for label in ["c", "a", "b"] {
        engine
            .add_rule(vec![], Some(RecordingAction::shared(&log, label).into_action()))
            .unwrap();
    }

    let report = engine.evaluate(&FactTable::new()).unwrap();

    assert_eq!(*log.lock(), vec!["c", "a", "b"]);
    assert_eq!(report.fired(), vec!["rule-1", "rule-2", "rule-3"]);
}

#[test]
fn test_reordering_registration_reorders_firing() {
    let fire_order = |labels: &[&str]| {
        let log = Arc::new(Mutex::new(Vec::new()));
        let engine = RuleEngine::new();
        for label in labels {
            engine
                .add_named_rule(
                    *label,
                    vec![],
                    RecordingAction::shared(&log, *label).into_action(),
                )
                .unwrap();
        }
        engine.evaluate(&FactTable::new()).unwrap();
        let fired = log.lock().clone();
        fired
    };

    assert_eq!(fire_order(&["x", "y", "z"]), vec!["x", "y", "z"]);
    assert_eq!(fire_order(&["z", "x", "y"]), vec!["z", "x", "y"]);
}

#[test]
fn test_rules_are_independent() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = RuleEngine::new();

    engine
        .add_named_rule(
            "cold",
            vec![Arc::new(FieldCondition::lt("temperature", 10.0))],
            RecordingAction::shared(&log, "cold").into_action(),
        )
        .unwrap();
    engine
        .add_named_rule(
            "hot",
            vec![too_hot()],
            RecordingAction::shared(&log, "hot").into_action(),
        )
        .unwrap();
    engine
        .add_named_rule(
            "also_hot",
            vec![too_hot()],
            RecordingAction::shared(&log, "also_hot").into_action(),
        )
        .unwrap();

    let report = engine.evaluate(&sensor_facts(35.0)).unwrap();

    // 前一条未触发、后两条都触发：没有互斥，也没有优先级
    assert_eq!(*log.lock(), vec!["hot", "also_hot"]);
    assert_eq!(report.outcome("cold").unwrap().failed_condition, Some(0));
    assert!(report.outcome("hot").unwrap().fired);
}

#[test]
fn test_evaluation_is_idempotent() {
    let engine = RuleEngine::new();
    engine
        .add_named_rule("hot", vec![too_hot()], action::infallible(|_| {}))
        .unwrap();
    engine
        .add_named_rule(
            "humid",
            vec![Arc::new(FieldCondition::gte("humidity", 60.0))],
            action::infallible(|_| {}),
        )
        .unwrap();

    let facts = sensor_facts(33.0);
    let first = engine.evaluate(&facts).unwrap();
    let second = engine.evaluate(&facts).unwrap();

    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(first.fired(), vec!["hot"]);
}

// ==================== 失败处理 ====================

#[test]
fn test_missing_action_rejected_at_registration() {
    let engine = RuleEngine::new();
    let err = engine.add_rule(vec![too_hot()], None).unwrap_err();

    assert!(matches!(err, RuleError::MissingAction { .. }));
    assert!(engine.is_empty());

    let err = Rule::builder("orphan").when(FieldCondition::exists("temperature")).build();
    assert!(matches!(err, Err(RuleError::MissingAction { .. })));
}

#[test]
fn test_fail_fast_propagates_action_error() {
    let after = RecordingAction::new("after");
    let engine = RuleEngine::new();
    assert_eq!(engine.config().error_policy, ErrorPolicy::FailFast);

    engine
        .add_named_rule(
            "broken",
            vec![],
            action::from_fn(|_| Err(anyhow::anyhow!("display disconnected"))),
        )
        .unwrap();
    engine
        .add_named_rule("after", vec![], after.clone().into_action())
        .unwrap();

    let err = engine.evaluate(&FactTable::new()).unwrap_err();

    assert_eq!(err.rule_name(), Some("broken"));
    assert!(err.to_string().contains("display disconnected"));
    assert_eq!(after.call_count(), 0);
}

#[test]
fn test_isolate_reports_every_failure() {
    let after = RecordingAction::new("after");
    let engine = RuleEngine::with_config(EngineConfig::isolated());

    engine
        .add_named_rule(
            "broken",
            vec![],
            action::from_fn(|_| Err(anyhow::anyhow!("display disconnected"))),
        )
        .unwrap();
    engine
        .add_named_rule(
            "panics",
            vec![predicate(|_| panic!("bad sensor"))],
            action::infallible(|_| {}),
        )
        .unwrap();
    engine
        .add_named_rule("after", vec![], after.clone().into_action())
        .unwrap();

    let report = engine.evaluate(&FactTable::new()).unwrap();

    let failed: Vec<&str> = report.failures.iter().map(|f| f.rule_name.as_str()).collect();
    assert_eq!(failed, vec!["broken", "panics"]);
    assert!(matches!(
        report.failures[1].error,
        RuleError::ConditionPanicked { index: 0, .. }
    ));
    assert_eq!(after.call_count(), 1);
    assert_eq!(report.fired(), vec!["after"]);
}

// ==================== 并发 ====================

#[test]
fn test_shared_engine_across_threads() {
    let fired = RecordingAction::new("hot");
    let engine = RuleEngine::new();
    engine
        .add_rule(vec![too_hot()], Some(fired.clone().into_action()))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || {
                engine.evaluate(&sensor_facts(31.0 + i as f64)).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(fired.call_count(), 4);
}
