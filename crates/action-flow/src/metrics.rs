use lazy_static::lazy_static;
use prometheus::{core::Collector, opts, IntCounter, IntCounterVec, Registry};
use tracing::error;

lazy_static! {
    static ref SCRIPT_RUNS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "soulscript_runs_total",
            "Script runs grouped by outcome"
        ),
        &["outcome"]
    )
    .unwrap();
    static ref ACTIONS_DISPATCHED_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "soulscript_actions_dispatched_total",
            "Actions sent to the actor grouped by kind and result"
        ),
        &["action", "result"]
    )
    .unwrap();
    static ref STEP_RETRIES_TOTAL: IntCounter = IntCounter::new(
        "soulscript_step_retries_total",
        "Step re-runs triggered by the retry policy",
    )
    .unwrap();
    static ref STEPS_SKIPPED_TOTAL: IntCounter = IntCounter::new(
        "soulscript_steps_skipped_total",
        "Failed steps swallowed by the skip policy",
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register interpreter metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, SCRIPT_RUNS_TOTAL.clone());
    register(registry, ACTIONS_DISPATCHED_TOTAL.clone());
    register(registry, STEP_RETRIES_TOTAL.clone());
    register(registry, STEPS_SKIPPED_TOTAL.clone());
}

/// `outcome` is `success` or the error kind that ended the run
pub fn record_run(outcome: &str) {
    SCRIPT_RUNS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_action(action: &str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    ACTIONS_DISPATCHED_TOTAL
        .with_label_values(&[action, result])
        .inc();
}

pub fn record_retry() {
    STEP_RETRIES_TOTAL.inc();
}

pub fn record_skip() {
    STEPS_SKIPPED_TOTAL.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let registry = Registry::new();
        register_metrics(&registry);
        register_metrics(&registry);

        record_retry();
        record_action("noop", true);
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"soulscript_step_retries_total".to_string()));
        assert!(names.contains(&"soulscript_actions_dispatched_total".to_string()));
    }
}
