//! Pre-flight validation
//!
//! Static walk over a script's step tree reporting what would certainly fail at
//! run time. Values containing `$` placeholders are only known at run time and
//! are assumed to resolve to something usable.

use std::fmt;

use script_model::{ActionStep, Operator, Script, Step, StepKind};
use serde::Serialize;
use serde_json::Value;

use crate::call::ActionCall;
use crate::errors::FlowError;

/// One problem found in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location such as `steps[2].loop_steps[0]`
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every issue in `script`, in document order
pub fn validate_script(script: &Script) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    validate_steps(&script.steps, "steps", &mut issues);
    issues
}

fn validate_steps(steps: &[Step], prefix: &str, issues: &mut Vec<ValidationIssue>) {
    for (index, step) in steps.iter().enumerate() {
        let path = format!("{}[{}]", prefix, index);
        validate_step(step, &path, issues);
    }
}

fn validate_step(step: &Step, path: &str, issues: &mut Vec<ValidationIssue>) {
    match &step.kind {
        StepKind::Action(action) => {
            if let Err(err) = ActionCall::build(&with_placeholders_filled(action)) {
                report(issues, path, describe(err));
            }
        }
        StepKind::Conditional(conditional) => {
            let condition = &conditional.condition;
            if condition.variable.is_empty() {
                report(issues, path, "condition has no variable".to_string());
            }
            if condition.operator == Operator::Unknown {
                report(issues, path, "condition operator is not recognised".to_string());
            }
            validate_steps(
                &conditional.then_steps,
                &format!("{}.then_steps", path),
                issues,
            );
            if let Some(else_steps) = &conditional.else_steps {
                validate_steps(else_steps, &format!("{}.else_steps", path), issues);
            }
        }
        StepKind::Loop(repeat) => {
            if repeat.bounds().is_none() {
                report(
                    issues,
                    path,
                    FlowError::LoopRange(repeat.loop_range.clone()).to_string(),
                );
            }
            validate_steps(&repeat.loop_steps, &format!("{}.loop_steps", path), issues);
        }
    }
}

fn report(issues: &mut Vec<ValidationIssue>, path: &str, message: String) {
    issues.push(ValidationIssue {
        path: path.to_string(),
        message,
    });
}

fn describe(err: FlowError) -> String {
    match err {
        FlowError::Validation { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// Stand-in for the interpolated step
///
/// Placeholder-bearing parameter values become `"0"`, which satisfies both
/// presence and numeric checks.
fn with_placeholders_filled(step: &ActionStep) -> ActionStep {
    let mut stand_in = step.clone();
    if let Some(params) = stand_in.params.as_mut() {
        for value in params.values_mut() {
            if matches!(value, Value::String(text) if text.contains('$')) {
                *value = Value::String("0".to_string());
            }
        }
    }
    stand_in
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Script {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_script_has_no_issues() {
        let script = parse(json!({
            "name": "ok",
            "steps": [
                {"action": "navigate", "url": "https://$host/"},
                {"action": "scroll", "params": {"y": "$offset"}},
                {"loop_range": [1, 2], "loop_steps": [{"action": "noop"}]}
            ]
        }));
        assert!(validate_script(&script).is_empty());
    }

    #[test]
    fn issues_carry_nested_paths() {
        let script = parse(json!({
            "name": "broken",
            "steps": [
                {"action": "noop"},
                {"condition": {"variable": "x", "operator": "sort_of"},
                 "then_steps": [{"action": "click"}],
                 "else_steps": [{"loop_range": [1], "loop_steps": [{"action": "teleport"}]}]}
            ]
        }));

        let issues = validate_script(&script);
        let paths: Vec<&str> = issues.iter().map(|issue| issue.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "steps[1]",
                "steps[1].then_steps[0]",
                "steps[1].else_steps[0]",
                "steps[1].else_steps[0].loop_steps[0]",
            ]
        );
        assert_eq!(issues[1].message, "selector is required");
        assert!(issues[3].message.contains("teleport"));
    }

    #[test]
    fn random_sleep_bounds_are_checked() {
        let script = parse(json!({
            "name": "sleepy",
            "steps": [{"action": "random_sleep", "min_seconds": 5, "max_seconds": 1}]
        }));
        let issues = validate_script(&script);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "steps[0]: min_seconds must not exceed max_seconds");
    }
}
