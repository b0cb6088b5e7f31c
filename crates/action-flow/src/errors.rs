//! Script execution error types

use action_primitives::ActorError;
use thiserror::Error;

/// Step execution errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// Required fields for the action kind are missing or malformed
    #[error("Validation failed for '{action}': {reason}")]
    Validation { action: String, reason: String },

    /// Action name outside the vocabulary
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// The actor raised while performing the action
    #[error("Action '{action}' failed: {source}")]
    Dispatch {
        action: String,
        #[source]
        source: ActorError,
    },

    /// Loop range without exactly two bounds
    #[error("loop_range must have exactly 2 elements: [start, end], got {0:?}")]
    LoopRange(Vec<i64>),

    /// Retry policy gave up on a step
    #[error("Step '{step}' failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        step: String,
        attempts: u32,
        #[source]
        source: Box<FlowError>,
    },

    /// The script was refused before any step ran
    #[error("Pre-flight validation failed: {0}")]
    Preflight(String),
}

/// Error taxonomy used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Dispatch,
    RetryExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Dispatch => "dispatch",
            ErrorKind::RetryExhausted => "retry_exhausted",
        }
    }
}

impl FlowError {
    pub(crate) fn validation(action: &str, reason: impl Into<String>) -> Self {
        FlowError::Validation {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            // A malformed loop range is a validation error of the loop step
            FlowError::Validation { .. }
            | FlowError::UnknownAction(_)
            | FlowError::LoopRange(_)
            | FlowError::Preflight(_) => ErrorKind::Validation,
            FlowError::Dispatch { .. } => ErrorKind::Dispatch,
            FlowError::RetryExhausted { .. } => ErrorKind::RetryExhausted,
        }
    }

    /// The actor error at the bottom of the chain, if any
    pub fn actor_error(&self) -> Option<&ActorError> {
        match self {
            FlowError::Dispatch { source, .. } => Some(source),
            FlowError::RetryExhausted { source, .. } => source.actor_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(
            FlowError::validation("navigate", "URL is required").kind(),
            ErrorKind::Validation
        );
        assert_eq!(FlowError::LoopRange(vec![1]).kind(), ErrorKind::Validation);
        assert_eq!(
            FlowError::UnknownAction("teleport".into()).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn exhausted_retry_keeps_the_actor_error() {
        let err = FlowError::RetryExhausted {
            step: "click".into(),
            attempts: 3,
            source: Box::new(FlowError::Dispatch {
                action: "click".into(),
                source: ActorError::ElementNotFound("#buy".into()),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::RetryExhausted);
        assert_eq!(
            err.actor_error(),
            Some(&ActorError::ElementNotFound("#buy".into()))
        );
        assert!(err.to_string().contains("after 3 attempt(s)"));
        assert!(err.to_string().contains("#buy"));
    }
}
