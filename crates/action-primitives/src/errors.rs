//! Error types for browser actor operations

use thiserror::Error;

/// Failures reported by a [`BrowserActor`](crate::BrowserActor)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActorError {
    /// No element matched the selector
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Navigation failed or the URL was rejected
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Navigation timed out waiting for page load
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Page script threw or returned something unusable
    #[error("Script fault: {0}")]
    ScriptFault(String),

    /// Argument accepted by the interpreter but refused by the actor
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tab index outside the open tabs
    #[error("Tab {index} out of range ({open} open)")]
    TabOutOfRange { index: usize, open: usize },

    /// Frame could not be located
    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    /// DevTools protocol or transport failure
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// The actor does not implement this operation
    #[error("Operation not supported by this actor: {0}")]
    Unsupported(&'static str),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActorError {
    /// Transient failures that may succeed when the step is re-run
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActorError::ElementNotFound(_)
                | ActorError::NavTimeout(_)
                | ActorError::WaitTimeout(_)
                | ActorError::CdpIo(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_retryable() {
        assert!(ActorError::WaitTimeout("#x".into()).is_retryable());
        assert!(ActorError::ElementNotFound("#x".into()).is_retryable());
        assert!(!ActorError::InvalidArgument("bad".into()).is_retryable());
        assert!(!ActorError::Unsupported("run_cdp").is_retryable());
    }

    #[test]
    fn messages_carry_context() {
        let err = ActorError::TabOutOfRange { index: 4, open: 2 };
        assert_eq!(err.to_string(), "Tab 4 out of range (2 open)");
    }
}
