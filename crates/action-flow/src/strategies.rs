//! Failure handling strategies

use async_trait::async_trait;
use script_model::ErrorPolicy;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::errors::FlowError;

/// Delay before re-running a failed step
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Failure handler trait
#[async_trait]
pub trait FailureHandler: Send + Sync {
    /// Decide what happens after `attempt` (1-based) of a step failed
    async fn handle_failure(
        &self,
        step: &str,
        policy: ErrorPolicy,
        error: FlowError,
        attempt: u32,
        max_retry: u32,
    ) -> FailureHandlerResult;

    /// Check if another attempt is allowed
    fn should_retry(&self, policy: ErrorPolicy, attempt: u32, max_retry: u32) -> bool;

    /// Pause before the retry following `attempt`
    fn retry_delay(&self, attempt: u32) -> Duration;
}

/// Result of failure handling
#[derive(Debug)]
pub enum FailureHandlerResult {
    /// Propagate to the enclosing construct
    Abort(FlowError),

    /// Swallow the error; the step counts as completed
    Skip(FlowError),

    /// Run the step again as attempt number `attempt`
    Retry { attempt: u32 },
}

/// Default failure handler: fixed delay between attempts
pub struct DefaultFailureHandler {
    retry_delay: Duration,
}

impl DefaultFailureHandler {
    /// Create a new default failure handler
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_RETRY_DELAY)
    }

    pub fn with_delay(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }
}

impl Default for DefaultFailureHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureHandler for DefaultFailureHandler {
    async fn handle_failure(
        &self,
        step: &str,
        policy: ErrorPolicy,
        error: FlowError,
        attempt: u32,
        max_retry: u32,
    ) -> FailureHandlerResult {
        match policy {
            ErrorPolicy::Abort => {
                error!(step, %error, "Aborting script execution");
                FailureHandlerResult::Abort(error)
            }

            ErrorPolicy::Skip => {
                warn!(step, %error, "Skipping failed step");
                FailureHandlerResult::Skip(error)
            }

            ErrorPolicy::Retry => {
                if !self.should_retry(policy, attempt, max_retry) {
                    error!(step, attempt, %error, "Max retries exceeded");
                    return FailureHandlerResult::Abort(FlowError::RetryExhausted {
                        step: step.to_string(),
                        attempts: attempt,
                        source: Box::new(error),
                    });
                }

                let delay = self.retry_delay(attempt);
                info!(
                    step,
                    attempt,
                    max_retry,
                    retryable = error.actor_error().map(|e| e.is_retryable()),
                    delay_ms = delay.as_millis() as u64,
                    "Retrying step"
                );
                sleep(delay).await;

                FailureHandlerResult::Retry {
                    attempt: attempt + 1,
                }
            }
        }
    }

    fn should_retry(&self, policy: ErrorPolicy, attempt: u32, max_retry: u32) -> bool {
        match policy {
            ErrorPolicy::Retry => attempt <= max_retry,
            _ => false,
        }
    }

    fn retry_delay(&self, _attempt: u32) -> Duration {
        self.retry_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> FlowError {
        FlowError::UnknownAction("teleport".to_string())
    }

    #[test]
    fn test_should_retry() {
        let handler = DefaultFailureHandler::new();

        assert!(!handler.should_retry(ErrorPolicy::Abort, 1, 3));
        assert!(!handler.should_retry(ErrorPolicy::Skip, 1, 3));

        assert!(handler.should_retry(ErrorPolicy::Retry, 1, 2));
        assert!(handler.should_retry(ErrorPolicy::Retry, 2, 2));
        assert!(!handler.should_retry(ErrorPolicy::Retry, 3, 2));
        assert!(!handler.should_retry(ErrorPolicy::Retry, 1, 0));
    }

    #[test]
    fn test_retry_delay_is_fixed() {
        let handler = DefaultFailureHandler::with_delay(Duration::from_millis(250));
        assert_eq!(handler.retry_delay(1), Duration::from_millis(250));
        assert_eq!(handler.retry_delay(5), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_handle_failure_abort() {
        let handler = DefaultFailureHandler::new();
        let result = handler
            .handle_failure("teleport", ErrorPolicy::Abort, failure(), 1, 3)
            .await;

        match result {
            FailureHandlerResult::Abort(err) => assert!(err.to_string().contains("teleport")),
            other => panic!("Expected Abort result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handle_failure_skip() {
        let handler = DefaultFailureHandler::new();
        let result = handler
            .handle_failure("teleport", ErrorPolicy::Skip, failure(), 1, 3)
            .await;

        assert!(matches!(result, FailureHandlerResult::Skip(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_failure_retry() {
        let handler = DefaultFailureHandler::new();

        let result = handler
            .handle_failure("teleport", ErrorPolicy::Retry, failure(), 1, 2)
            .await;
        assert!(matches!(result, FailureHandlerResult::Retry { attempt: 2 }));

        let result = handler
            .handle_failure("teleport", ErrorPolicy::Retry, failure(), 3, 2)
            .await;
        match result {
            FailureHandlerResult::Abort(FlowError::RetryExhausted { attempts, .. }) => {
                assert_eq!(attempts, 3)
            }
            other => panic!("Expected exhausted retry, got {:?}", other),
        }
    }
}
