//! Step executor
//!
//! Walks the step tree in program order. Each step runs inside a bounded
//! attempt loop; failures go through the [`FailureHandler`] with the step's own
//! error policy, so a conditional or loop handles errors raised by its body
//! the same way an action handles its own.

use std::sync::Arc;

use async_recursion::async_recursion;
use script_model::{ConditionalStep, LoopStep, Step, StepKind};
use serde_json::Value;
use soulscript_core_types::VariableStore;
use tracing::{debug, info};

use crate::conditions;
use crate::dispatcher::ActionDispatcher;
use crate::errors::FlowError;
use crate::metrics;
use crate::strategies::{FailureHandler, FailureHandlerResult};

/// `max_retry` used when a step does not set one
pub const DEFAULT_MAX_RETRY: u32 = 3;

/// Mutable state of one run, passed down the recursion by reference
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub variables: VariableStore,
    pub steps_completed: u64,
}

impl ExecutionContext {
    pub fn new(variables: VariableStore) -> Self {
        Self {
            variables,
            steps_completed: 0,
        }
    }
}

/// How a step that did not abort ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Failed, and the skip policy swallowed the error
    Skipped,
}

/// Recursive evaluator of the step tree
#[derive(Clone)]
pub struct StepExecutor {
    dispatcher: ActionDispatcher,
    failure_handler: Arc<dyn FailureHandler>,
    default_max_retry: u32,
}

impl StepExecutor {
    pub fn new(dispatcher: ActionDispatcher, failure_handler: Arc<dyn FailureHandler>) -> Self {
        Self {
            dispatcher,
            failure_handler,
            default_max_retry: DEFAULT_MAX_RETRY,
        }
    }

    pub fn with_default_max_retry(mut self, max_retry: u32) -> Self {
        self.default_max_retry = max_retry;
        self
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Execute steps in order, stopping at the first error that propagates
    pub async fn execute_steps(
        &self,
        steps: &[Step],
        context: &mut ExecutionContext,
    ) -> Result<(), FlowError> {
        for (index, step) in steps.iter().enumerate() {
            debug!("Executing step {}/{}", index + 1, steps.len());
            self.execute_step(step, context).await?;
        }
        Ok(())
    }

    /// Execute one step under its error policy
    #[async_recursion]
    pub async fn execute_step(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
    ) -> Result<StepOutcome, FlowError> {
        let label = step.label();
        let max_retry = step.max_retry.unwrap_or(self.default_max_retry);
        let mut attempt = 1;

        loop {
            let error = match self.execute_once(step, context).await {
                Ok(()) => {
                    context.steps_completed += 1;
                    return Ok(StepOutcome::Completed);
                }
                Err(error) => error,
            };

            match self
                .failure_handler
                .handle_failure(&label, step.on_error, error, attempt, max_retry)
                .await
            {
                FailureHandlerResult::Retry { attempt: next } => {
                    metrics::record_retry();
                    attempt = next;
                }
                FailureHandlerResult::Skip(_) => {
                    metrics::record_skip();
                    context.steps_completed += 1;
                    return Ok(StepOutcome::Skipped);
                }
                FailureHandlerResult::Abort(error) => return Err(error),
            }
        }
    }

    async fn execute_once(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
    ) -> Result<(), FlowError> {
        match &step.kind {
            StepKind::Action(action) => {
                info!(action = %action.action, "Executing action");
                self.dispatcher
                    .dispatch(action, &mut context.variables)
                    .await
                    .map(|_| ())
            }
            StepKind::Conditional(conditional) => {
                self.execute_conditional(conditional, context).await
            }
            StepKind::Loop(repeat) => self.execute_loop(repeat, context).await,
        }
    }

    async fn execute_conditional(
        &self,
        conditional: &ConditionalStep,
        context: &mut ExecutionContext,
    ) -> Result<(), FlowError> {
        let holds = conditions::evaluate(&conditional.condition, &context.variables);
        info!("Condition evaluated to: {}", holds);

        let branch = if holds {
            Some(&conditional.then_steps)
        } else {
            conditional.else_steps.as_ref()
        };
        match branch {
            Some(steps) => self.execute_steps(steps, context).await,
            None => {
                debug!("Condition not met, no else branch");
                Ok(())
            }
        }
    }

    async fn execute_loop(
        &self,
        repeat: &LoopStep,
        context: &mut ExecutionContext,
    ) -> Result<(), FlowError> {
        let (start, end) = repeat
            .bounds()
            .ok_or_else(|| FlowError::LoopRange(repeat.loop_range.clone()))?;
        info!(
            "Starting loop from {} to {} with variable {}",
            start, end, repeat.loop_variable
        );

        for index in start..=end {
            context
                .variables
                .set(repeat.loop_variable.clone(), Value::from(index));
            self.execute_steps(&repeat.loop_steps, context).await?;
        }
        Ok(())
    }
}
