//! 指标定义
//!
//! 规则引擎通过 metrics facade 记录指标；未安装 recorder 时这些调用为空操作。

/// 评估轮次总数
pub const RULE_EVALUATIONS_TOTAL: &str = "rule_evaluations_total";
/// 触发的规则总数
pub const RULES_FIRED_TOTAL: &str = "rules_fired_total";
/// 失败的规则总数
pub const RULE_FAILURES_TOTAL: &str = "rule_failures_total";
/// 单轮评估耗时
pub const RULE_EVALUATION_DURATION_SECONDS: &str = "rule_evaluation_duration_seconds";

/// 注册指标描述
pub fn describe_metrics() {
    metrics::describe_counter!(RULE_EVALUATIONS_TOTAL, "Total number of rule evaluation passes");
    metrics::describe_counter!(RULES_FIRED_TOTAL, "Total number of fired rules");
    metrics::describe_counter!(RULE_FAILURES_TOTAL, "Total number of failed rules");
    metrics::describe_histogram!(
        RULE_EVALUATION_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Rule evaluation pass duration in seconds"
    );
}

/// 记录一轮评估
#[inline]
pub fn record_evaluation(fired: usize, failed: usize, policy: &str, duration_secs: f64) {
    metrics::counter!(RULE_EVALUATIONS_TOTAL, "policy" => policy.to_string()).increment(1);
    metrics::counter!(RULES_FIRED_TOTAL).increment(fired as u64);
    if failed > 0 {
        metrics::counter!(RULE_FAILURES_TOTAL, "policy" => policy.to_string()).increment(failed as u64);
    }
    metrics::histogram!(RULE_EVALUATION_DURATION_SECONDS).record(duration_secs);
}
