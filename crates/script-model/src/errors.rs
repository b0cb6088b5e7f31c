//! Script document error types

use thiserror::Error;

/// Errors raised while reading or shaping a script document
#[derive(Debug, Error)]
pub enum ModelError {
    /// A step carries keys of more than one shape
    #[error("Ambiguous step: mixes {0}")]
    AmbiguousStep(String),

    /// A step carries none of `action`, `condition`, `loop_range`
    #[error("Step has no `action`, `condition` or `loop_range`")]
    MissingShape,

    /// A shape-defining key is absent
    #[error("{shape} step is missing `{field}`")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },

    /// An action field was given on a control-flow step
    #[error("`{field}` is not valid on a {shape} step")]
    UnexpectedField {
        shape: &'static str,
        field: &'static str,
    },

    /// Action name outside the vocabulary
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// Malformed JSON document
    #[error("Invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML document
    #[error("Invalid YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
