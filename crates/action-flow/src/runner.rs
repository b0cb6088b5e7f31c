//! Script runner: the public entry point of the interpreter

use std::sync::Arc;
use std::time::{Duration, Instant};

use action_primitives::BrowserActor;
use chrono::Utc;
use script_model::{RunRequest, RunResult, Script};
use soulscript_core_types::{RunId, VariableStore};
use tracing::{error, info, info_span, Instrument};

use crate::dispatcher::ActionDispatcher;
use crate::errors::FlowError;
use crate::executor::{ExecutionContext, StepExecutor, DEFAULT_MAX_RETRY};
use crate::metrics;
use crate::strategies::{DefaultFailureHandler, FailureHandler, DEFAULT_RETRY_DELAY};
use crate::validate::validate_script;

/// Tunables of a [`ScriptRunner`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerOptions {
    /// Fixed pause before each retry
    pub retry_delay: Duration,
    /// `max_retry` for steps that do not set one
    pub default_max_retry: u32,
    /// Refuse scripts with static issues before running anything
    pub preflight: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            default_max_retry: DEFAULT_MAX_RETRY,
            preflight: false,
        }
    }
}

/// Runs scripts against one actor
///
/// Every run gets its own [`ExecutionContext`]; the runner itself holds no
/// per-run state.
#[derive(Clone)]
pub struct ScriptRunner {
    executor: StepExecutor,
    options: RunnerOptions,
}

impl ScriptRunner {
    pub fn new(actor: Arc<dyn BrowserActor>) -> Self {
        Self::with_options(actor, RunnerOptions::default())
    }

    pub fn with_options(actor: Arc<dyn BrowserActor>, options: RunnerOptions) -> Self {
        let handler = Arc::new(DefaultFailureHandler::with_delay(options.retry_delay));
        Self::with_failure_handler(actor, handler, options)
    }

    pub fn with_failure_handler(
        actor: Arc<dyn BrowserActor>,
        failure_handler: Arc<dyn FailureHandler>,
        options: RunnerOptions,
    ) -> Self {
        let executor = StepExecutor::new(ActionDispatcher::new(actor), failure_handler)
            .with_default_max_retry(options.default_max_retry);
        Self { executor, options }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    pub(crate) fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    /// Run a request; failures are reported in the result, never as `Err`
    pub async fn run(&self, request: RunRequest) -> RunResult {
        let initial = request
            .initial_variables
            .map(VariableStore::from)
            .unwrap_or_default();
        self.run_script(&request.script, initial).await
    }

    /// Run `script` with the caller's variables
    ///
    /// Script defaults only fill names the caller left unset.
    pub async fn run_script(&self, script: &Script, initial: VariableStore) -> RunResult {
        let run_id = RunId::new();
        let span = info_span!("run", run_id = %run_id, script = %script.name);
        self.run_inner(script, initial).instrument(span).await
    }

    async fn run_inner(&self, script: &Script, initial: VariableStore) -> RunResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(steps = script.steps.len(), "Starting script");

        let mut context = ExecutionContext::new(initial);
        let added = context.variables.merge_defaults(&script.variables);
        info!(defaults = added, "Merged script variables");

        let outcome = match self.preflight(script) {
            Ok(()) => {
                self.executor
                    .execute_steps(&script.steps, &mut context)
                    .await
            }
            Err(err) => Err(err),
        };

        let execution_time = clock.elapsed();
        let error = match outcome {
            Ok(()) => {
                info!(
                    steps_completed = context.steps_completed,
                    elapsed_ms = execution_time.as_millis() as u64,
                    "Script completed successfully"
                );
                metrics::record_run("success");
                None
            }
            Err(err) => {
                error!(
                    steps_completed = context.steps_completed,
                    kind = err.kind().as_str(),
                    error = %err,
                    "Script execution failed"
                );
                metrics::record_run(err.kind().as_str());
                Some(err.to_string())
            }
        };

        RunResult {
            script_name: script.name.clone(),
            success: error.is_none(),
            execution_time,
            steps_completed: context.steps_completed,
            variables: context.variables.into_inner(),
            error,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn preflight(&self, script: &Script) -> Result<(), FlowError> {
        if !self.options.preflight {
            return Ok(());
        }
        let issues = validate_script(script);
        if issues.is_empty() {
            return Ok(());
        }
        let summary = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(FlowError::Preflight(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::{ActorError, ActorResult, DryRunActor};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    /// Fails every click and counts attempts
    #[derive(Default)]
    struct FlakyActor {
        clicks: Mutex<u32>,
    }

    #[async_trait]
    impl BrowserActor for FlakyActor {
        async fn click(&self, selector: &str) -> ActorResult {
            *self.clicks.lock() += 1;
            Err(ActorError::ElementNotFound(selector.to_string()))
        }
    }

    fn fast_options() -> RunnerOptions {
        RunnerOptions {
            retry_delay: Duration::ZERO,
            ..RunnerOptions::default()
        }
    }

    fn script(value: Value) -> Script {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn empty_script_succeeds_with_zero_steps() {
        let runner = ScriptRunner::new(Arc::new(DryRunActor::default()));
        let result = runner
            .run(RunRequest::new(Script::new("empty", vec![])))
            .await;

        assert!(result.success);
        assert_eq!(result.steps_completed, 0);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn scenario_sleep_then_loop_of_noops() {
        let runner = ScriptRunner::new(Arc::new(DryRunActor::default()));
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "scenario",
                "variables": {"x": 1},
                "steps": [
                    {"action": "sleep", "seconds": 0},
                    {"loop_range": [1, 2], "loop_variable": "i",
                     "loop_steps": [{"action": "noop", "save_as": "last_i"}]}
                ]
            }))))
            .await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.variables["last_i"], json!(2));
        assert_eq!(result.variables["x"], json!(1));
        // sleep + two noops + the loop itself
        assert_eq!(result.steps_completed, 4);
    }

    #[tokio::test]
    async fn retry_exhaustion_fails_the_run() {
        let actor = Arc::new(FlakyActor::default());
        let runner = ScriptRunner::with_options(actor.clone(), fast_options());
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "flaky",
                "steps": [
                    {"action": "noop"},
                    {"action": "click", "selector": "#buy", "on_error": "retry", "max_retry": 2}
                ]
            }))))
            .await;

        assert!(!result.success);
        assert_eq!(*actor.clicks.lock(), 3);
        assert_eq!(result.steps_completed, 1);
        let message = result.error.unwrap();
        assert!(message.contains("3 attempt(s)"), "{}", message);
        assert!(message.contains("#buy"), "{}", message);
    }

    #[tokio::test]
    async fn skipped_failure_keeps_the_run_successful() {
        let runner = ScriptRunner::with_options(Arc::new(FlakyActor::default()), fast_options());
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "skippy",
                "steps": [
                    {"action": "click", "selector": "#banner", "on_error": "skip"},
                    {"action": "noop", "save_as": "after"}
                ]
            }))))
            .await;

        assert!(result.success);
        assert_eq!(result.steps_completed, 2);
        assert!(result.variables.contains_key("after"));
    }

    #[tokio::test]
    async fn caller_variables_beat_script_defaults() {
        let runner = ScriptRunner::new(Arc::new(DryRunActor::default()));
        let mut initial = BTreeMap::new();
        initial.insert("user".to_string(), json!("caller"));

        let request = RunRequest::new(script(json!({
            "name": "merge",
            "variables": {"user": "script", "limit": 5},
            "steps": []
        })))
        .with_variables(initial);
        let result = runner.run(request).await;

        assert_eq!(result.variables["user"], json!("caller"));
        assert_eq!(result.variables["limit"], json!(5));
    }

    #[tokio::test]
    async fn unknown_action_aborts_at_run_time() {
        let runner = ScriptRunner::new(Arc::new(DryRunActor::default()));
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "typo",
                "steps": [{"action": "noop"}, {"action": "teleport"}, {"action": "noop"}]
            }))))
            .await;

        assert!(!result.success);
        assert_eq!(result.steps_completed, 1);
        assert_eq!(result.error.as_deref(), Some("Unknown action type: teleport"));
    }

    #[tokio::test]
    async fn preflight_refuses_broken_scripts_before_running() {
        let options = RunnerOptions {
            preflight: true,
            ..fast_options()
        };
        let runner = ScriptRunner::with_options(Arc::new(DryRunActor::default()), options);
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "broken",
                "steps": [{"action": "noop", "save_as": "ran"}, {"action": "navigate"}]
            }))))
            .await;

        assert!(!result.success);
        assert_eq!(result.steps_completed, 0);
        assert!(!result.variables.contains_key("ran"));
        assert!(result.error.unwrap().contains("steps[1]: url is required"));
    }

    #[tokio::test]
    async fn saved_values_feed_later_conditions() {
        let actor = DryRunActor::new(
            action_primitives::DryRunConfig::default()
                .with_fixture("#count", action_primitives::ElementFixture::text("12")),
        );
        let runner = ScriptRunner::new(Arc::new(actor));
        let result = runner
            .run(RunRequest::new(script(json!({
                "name": "branch",
                "steps": [
                    {"action": "get_text", "selector": "#count", "save_as": "count"},
                    {"condition": {"variable": "count", "operator": "greater_equal", "value": "10"},
                     "then_steps": [{"action": "noop", "save_as": "many"}],
                     "else_steps": [{"action": "noop", "save_as": "few"}]}
                ]
            }))))
            .await;

        assert!(result.success);
        assert!(result.variables.contains_key("many"));
        assert!(!result.variables.contains_key("few"));
        assert_eq!(result.steps_completed, 3);
    }
}
