//! Conditions for branching steps

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary predicate between a variable and a literal
///
/// Every field is optional in the document; a condition missing its variable
/// or operator simply evaluates to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    /// Name of the variable on the left-hand side
    #[serde(default)]
    pub variable: String,

    #[serde(default)]
    pub operator: Operator,

    /// Literal on the right-hand side; strings are interpolated first
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(variable: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            variable: variable.into(),
            operator,
            value,
        }
    }
}

/// Comparison operators understood by the condition evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Exists,
    NotExists,
    IsEmpty,
    NotEmpty,

    /// Anything else; always evaluates to false
    #[default]
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Operators comparing both sides as floating-point numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterEqual
                | Operator::LessEqual
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::IsEmpty => "is_empty",
            Operator::NotEmpty => "not_empty",
            Operator::Unknown => "unknown",
        }
    }
}
