//! Batch execution: a flat list of actions with no control flow

use std::time::Instant;

use script_model::{ActionOutcome, BatchRequest, BatchResult};
use soulscript_core_types::VariableStore;
use tracing::{info, warn};

use crate::dispatcher::ActionDispatcher;
use crate::metrics;
use crate::runner::ScriptRunner;

/// Run every action of `request` in order
///
/// Failures are recorded per action; with `stop_on_error` the first failure
/// ends the batch. Error policies do not apply here.
pub async fn execute_batch(
    dispatcher: &ActionDispatcher,
    request: &BatchRequest,
    variables: VariableStore,
) -> BatchResult {
    let mut variables = variables;
    let mut results = Vec::with_capacity(request.actions.len());
    let mut completed = 0;
    let mut failed = 0;
    let total = Instant::now();

    for action in &request.actions {
        let started = Instant::now();
        match dispatcher.dispatch(action, &mut variables).await {
            Ok(value) => {
                completed += 1;
                results.push(ActionOutcome {
                    success: true,
                    action: action.action.clone(),
                    result: Some(value),
                    error: None,
                    execution_time: started.elapsed(),
                });
            }
            Err(err) => {
                failed += 1;
                warn!(action = %action.action, error = %err, "Batch action failed");
                results.push(ActionOutcome {
                    success: false,
                    action: action.action.clone(),
                    result: None,
                    error: Some(err.to_string()),
                    execution_time: started.elapsed(),
                });
                if request.stop_on_error {
                    break;
                }
            }
        }
    }

    let success = failed == 0;
    metrics::record_run(if success { "success" } else { "batch_failed" });
    info!(completed, failed, "Batch finished");

    BatchResult {
        success,
        results,
        total_time: total.elapsed(),
        completed,
        failed,
        variables: variables.into_inner(),
    }
}

impl ScriptRunner {
    /// Run a batch against this runner's actor
    pub async fn run_batch(&self, request: &BatchRequest, variables: VariableStore) -> BatchResult {
        execute_batch(self.executor().dispatcher(), request, variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::DryRunActor;
    use script_model::ActionStep;
    use serde_json::json;
    use std::sync::Arc;

    fn runner() -> ScriptRunner {
        ScriptRunner::new(Arc::new(DryRunActor::default()))
    }

    #[tokio::test]
    async fn stops_at_first_failure_by_default() {
        let request = BatchRequest::new(vec![
            ActionStep::new("noop").save_as("first"),
            ActionStep::new("click"),
            ActionStep::new("noop").save_as("third"),
        ]);

        let result = runner().run_batch(&request, VariableStore::new()).await;

        assert!(!result.success);
        assert_eq!(result.completed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.results.len(), 2);
        assert_eq!(
            result.results[1].error.as_deref(),
            Some("Validation failed for 'click': selector is required")
        );
        assert!(result.variables.contains_key("first"));
        assert!(!result.variables.contains_key("third"));
    }

    #[tokio::test]
    async fn keeps_going_when_asked() {
        let mut request = BatchRequest::new(vec![
            ActionStep::new("teleport"),
            ActionStep::new("navigate")
                .with_url("https://$host/")
                .save_as("landing"),
        ]);
        request.stop_on_error = false;
        let vars: VariableStore = [("host".to_string(), json!("example.com"))]
            .into_iter()
            .collect();

        let result = runner().run_batch(&request, vars).await;

        assert!(!result.success);
        assert_eq!((result.completed, result.failed), (1, 1));
        assert!(result.results[1].success);
        assert_eq!(result.variables["host"], json!("example.com"));
        assert!(result.variables.contains_key("landing"));
    }

    #[tokio::test]
    async fn empty_batch_succeeds() {
        let result = runner()
            .run_batch(&BatchRequest::new(vec![]), VariableStore::new())
            .await;
        assert!(result.success);
        assert!(result.results.is_empty());
    }
}
