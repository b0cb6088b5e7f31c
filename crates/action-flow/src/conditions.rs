//! Condition evaluation
//!
//! Evaluation never fails. A condition without a variable name, with an
//! unknown operator, or comparing against a variable that is not set is false.

use script_model::{Condition, Operator};
use serde_json::Value;
use soulscript_core_types::{value_to_string, VariableStore};
use tracing::{debug, warn};

use crate::interpolate::interpolate_value;

/// Evaluate `condition` against the current variables
pub fn evaluate(condition: &Condition, variables: &VariableStore) -> bool {
    if condition.variable.is_empty() {
        warn!("Invalid condition: missing variable");
        return false;
    }

    let actual = variables.get(&condition.variable);
    let expected = interpolate_value(&condition.value, variables);

    let outcome = match condition.operator {
        Operator::Exists => variables.is_defined(&condition.variable),
        Operator::NotExists => !variables.is_defined(&condition.variable),
        Operator::IsEmpty => is_empty(actual),
        Operator::NotEmpty => !is_empty(actual),
        Operator::Unknown => {
            warn!(variable = %condition.variable, "Unknown condition operator");
            false
        }
        operator => match actual {
            Some(actual) => compare(operator, actual, &expected),
            None => false,
        },
    };

    debug!(
        variable = %condition.variable,
        operator = condition.operator.as_str(),
        outcome,
        "condition evaluated"
    );
    outcome
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(value) => value_to_string(value).is_empty(),
    }
}

fn compare(operator: Operator, actual: &Value, expected: &Value) -> bool {
    let actual_text = value_to_string(actual);
    let expected_text = value_to_string(expected);

    if operator.is_numeric() {
        let (Some(left), Some(right)) = (as_number(&actual_text), as_number(&expected_text)) else {
            return false;
        };
        return match operator {
            Operator::GreaterThan => left > right,
            Operator::LessThan => left < right,
            Operator::GreaterEqual => left >= right,
            Operator::LessEqual => left <= right,
            _ => false,
        };
    }

    match operator {
        Operator::Equals => actual_text == expected_text,
        Operator::NotEquals => actual_text != expected_text,
        Operator::Contains => actual_text.contains(&expected_text),
        Operator::NotContains => !actual_text.contains(&expected_text),
        _ => false,
    }
}

fn as_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
