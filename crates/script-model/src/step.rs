//! Step model
//!
//! In a document every step is a flat record with explicit keys. The typed
//! model splits that record into [`StepKind::Action`], [`StepKind::Conditional`]
//! or [`StepKind::Loop`]; a record mixing the keys of two shapes is rejected.

use std::collections::BTreeMap;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionKind;
use crate::condition::Condition;
use crate::errors::ModelError;

/// Free-form parameter map of an action step
pub type Params = BTreeMap<String, Value>;

/// Loop variable used when a loop step does not name one
pub const DEFAULT_LOOP_VARIABLE: &str = "i";

/// Per-step failure handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Propagate the error to the enclosing construct
    #[default]
    Abort,

    /// Swallow the error and continue with the next sibling
    Skip,

    /// Re-run the step up to `max_retry` more times, then abort
    Retry,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Abort => "abort",
            ErrorPolicy::Skip => "skip",
            ErrorPolicy::Retry => "retry",
        }
    }
}

/// One step of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepDocument", into = "StepDocument")]
pub struct Step {
    pub kind: StepKind,

    /// What to do when this step (or anything nested in it) fails
    pub on_error: ErrorPolicy,

    /// Extra attempts for [`ErrorPolicy::Retry`]; `None` uses the runner default
    pub max_retry: Option<u32>,
}

/// The three mutually exclusive step shapes
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Action(ActionStep),
    Conditional(ConditionalStep),
    Loop(LoopStep),
}

impl Step {
    pub fn action(step: ActionStep) -> Self {
        Self::from_kind(StepKind::Action(step))
    }

    pub fn conditional(
        condition: Condition,
        then_steps: Vec<Step>,
        else_steps: Option<Vec<Step>>,
    ) -> Self {
        Self::from_kind(StepKind::Conditional(ConditionalStep {
            condition,
            then_steps,
            else_steps,
        }))
    }

    pub fn repeat(
        loop_range: Vec<i64>,
        loop_variable: impl Into<String>,
        loop_steps: Vec<Step>,
    ) -> Self {
        Self::from_kind(StepKind::Loop(LoopStep {
            loop_range,
            loop_variable: loop_variable.into(),
            loop_steps,
        }))
    }

    fn from_kind(kind: StepKind) -> Self {
        Self {
            kind,
            on_error: ErrorPolicy::Abort,
            max_retry: None,
        }
    }

    pub fn with_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    /// Short description used in logs and error messages
    pub fn label(&self) -> String {
        match &self.kind {
            StepKind::Action(action) => action.action.clone(),
            StepKind::Conditional(conditional) => format!(
                "if {} {}",
                conditional.condition.variable,
                conditional.condition.operator.as_str()
            ),
            StepKind::Loop(repeat) => format!(
                "loop {} in {:?}",
                repeat.loop_variable, repeat.loop_range
            ),
        }
    }
}

/// Action step: one call into the browser actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionStep {
    /// Action name from the vocabulary; checked at dispatch time
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<Params>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframe_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// Variable receiving the action's return value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_as: Option<String>,
}

impl ActionStep {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn of(kind: ActionKind) -> Self {
        Self::new(kind.as_str())
    }

    /// Parsed action kind
    pub fn kind(&self) -> Result<ActionKind, ModelError> {
        self.action.parse()
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_seconds(mut self, seconds: f64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value);
        self
    }

    pub fn save_as(mut self, name: impl Into<String>) -> Self {
        self.save_as = Some(name.into());
        self
    }
}

/// Conditional step: run `then_steps` when the condition holds, else `else_steps`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalStep {
    pub condition: Condition,
    pub then_steps: Vec<Step>,
    pub else_steps: Option<Vec<Step>>,
}

/// Loop step over an inclusive integer range
///
/// The range is kept as written; anything other than exactly two bounds is
/// reported when the loop executes.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopStep {
    pub loop_range: Vec<i64>,
    pub loop_variable: String,
    pub loop_steps: Vec<Step>,
}

impl LoopStep {
    /// `(start, end)` when the range has exactly two bounds
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self.loop_range.as_slice() {
            [start, end] => Some((*start, *end)),
            _ => None,
        }
    }
}

/// Flat document form of a step
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StepDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(flatten)]
    fields: ActionFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    then_steps: Option<Vec<Step>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    else_steps: Option<Vec<Step>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    loop_range: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loop_variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    loop_steps: Option<Vec<Step>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_error: Option<ErrorPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_retry: Option<u32>,
}

/// Same fields as [`ActionStep`] minus `action`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
struct ActionFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cookies: Option<Vec<Params>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cookies_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tab_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iframe_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    save_as: Option<String>,
}

impl ActionFields {
    fn into_step(self, action: String) -> ActionStep {
        ActionStep {
            action,
            selector: self.selector,
            url: self.url,
            text: self.text,
            value: self.value,
            attribute: self.attribute,
            script: self.script,
            cookies: self.cookies,
            cookies_text: self.cookies_text,
            seconds: self.seconds,
            min_seconds: self.min_seconds,
            max_seconds: self.max_seconds,
            tab_index: self.tab_index,
            iframe_selector: self.iframe_selector,
            params: self.params,
            save_as: self.save_as,
        }
    }

    fn from_step(step: ActionStep) -> (String, Self) {
        let fields = Self {
            selector: step.selector,
            url: step.url,
            text: step.text,
            value: step.value,
            attribute: step.attribute,
            script: step.script,
            cookies: step.cookies,
            cookies_text: step.cookies_text,
            seconds: step.seconds,
            min_seconds: step.min_seconds,
            max_seconds: step.max_seconds,
            tab_index: step.tab_index,
            iframe_selector: step.iframe_selector,
            params: step.params,
            save_as: step.save_as,
        };
        (step.action, fields)
    }

    /// First action-only field that is set, if any
    fn first_present(&self) -> Option<&'static str> {
        [
            (self.selector.is_some(), "selector"),
            (self.url.is_some(), "url"),
            (self.text.is_some(), "text"),
            (self.value.is_some(), "value"),
            (self.attribute.is_some(), "attribute"),
            (self.script.is_some(), "script"),
            (self.cookies.is_some(), "cookies"),
            (self.cookies_text.is_some(), "cookies_text"),
            (self.seconds.is_some(), "seconds"),
            (self.min_seconds.is_some(), "min_seconds"),
            (self.max_seconds.is_some(), "max_seconds"),
            (self.tab_index.is_some(), "tab_index"),
            (self.iframe_selector.is_some(), "iframe_selector"),
            (self.params.is_some(), "params"),
            (self.save_as.is_some(), "save_as"),
        ]
        .into_iter()
        .find_map(|(present, name)| present.then_some(name))
    }
}

impl TryFrom<StepDocument> for Step {
    type Error = ModelError;

    fn try_from(doc: StepDocument) -> Result<Self, Self::Error> {
        let is_action = doc.action.is_some();
        let is_conditional =
            doc.condition.is_some() || doc.then_steps.is_some() || doc.else_steps.is_some();
        let is_loop =
            doc.loop_range.is_some() || doc.loop_variable.is_some() || doc.loop_steps.is_some();

        let shapes: Vec<&str> = [
            (is_action, "action"),
            (is_conditional, "conditional"),
            (is_loop, "loop"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();

        if shapes.len() > 1 {
            return Err(ModelError::AmbiguousStep(shapes.join(" and ")));
        }

        let on_error = doc.on_error.unwrap_or_default();
        let max_retry = doc.max_retry;

        let kind = if let Some(action) = doc.action {
            StepKind::Action(doc.fields.into_step(action))
        } else if is_conditional {
            reject_action_fields(&doc.fields, "conditional")?;
            StepKind::Conditional(ConditionalStep {
                condition: doc.condition.ok_or(ModelError::MissingField {
                    shape: "conditional",
                    field: "condition",
                })?,
                then_steps: doc.then_steps.ok_or(ModelError::MissingField {
                    shape: "conditional",
                    field: "then_steps",
                })?,
                else_steps: doc.else_steps,
            })
        } else if is_loop {
            reject_action_fields(&doc.fields, "loop")?;
            StepKind::Loop(LoopStep {
                loop_range: doc.loop_range.ok_or(ModelError::MissingField {
                    shape: "loop",
                    field: "loop_range",
                })?,
                loop_variable: doc
                    .loop_variable
                    .unwrap_or_else(|| DEFAULT_LOOP_VARIABLE.to_string()),
                loop_steps: doc.loop_steps.ok_or(ModelError::MissingField {
                    shape: "loop",
                    field: "loop_steps",
                })?,
            })
        } else {
            return Err(ModelError::MissingShape);
        };

        Ok(Step {
            kind,
            on_error,
            max_retry,
        })
    }
}

fn reject_action_fields(fields: &ActionFields, shape: &'static str) -> Result<(), ModelError> {
    match fields.first_present() {
        Some(field) => Err(ModelError::UnexpectedField { shape, field }),
        None => Ok(()),
    }
}

impl From<Step> for StepDocument {
    fn from(step: Step) -> Self {
        let mut doc = StepDocument {
            on_error: match step.on_error {
                ErrorPolicy::Abort => None,
                policy => Some(policy),
            },
            max_retry: step.max_retry,
            ..StepDocument::default()
        };

        match step.kind {
            StepKind::Action(action) => {
                let (name, fields) = ActionFields::from_step(action);
                doc.action = Some(name);
                doc.fields = fields;
            }
            StepKind::Conditional(conditional) => {
                doc.condition = Some(conditional.condition);
                doc.then_steps = Some(conditional.then_steps);
                doc.else_steps = conditional.else_steps;
            }
            StepKind::Loop(repeat) => {
                doc.loop_range = Some(repeat.loop_range);
                doc.loop_variable = Some(repeat.loop_variable);
                doc.loop_steps = Some(repeat.loop_steps);
            }
        }

        doc
    }
}

impl JsonSchema for Step {
    fn schema_name() -> String {
        "Step".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        StepDocument::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;
    use serde_json::json;

    #[test]
    fn parses_action_step() {
        let step: Step = serde_json::from_value(json!({
            "action": "navigate",
            "url": "https://example.com",
            "save_as": "landing"
        }))
        .unwrap();

        match &step.kind {
            StepKind::Action(action) => {
                assert_eq!(action.kind().unwrap(), ActionKind::Navigate);
                assert_eq!(action.url.as_deref(), Some("https://example.com"));
                assert_eq!(action.save_as.as_deref(), Some("landing"));
            }
            other => panic!("expected action step, got {:?}", other),
        }
        assert_eq!(step.on_error, ErrorPolicy::Abort);
        assert_eq!(step.max_retry, None);
    }

    #[test]
    fn parses_conditional_with_nested_steps() {
        let step: Step = serde_json::from_value(json!({
            "condition": {"variable": "count", "operator": "greater_than", "value": "5"},
            "then_steps": [{"action": "click", "selector": "#more"}],
            "else_steps": [{"action": "back"}],
            "on_error": "skip"
        }))
        .unwrap();

        let StepKind::Conditional(conditional) = &step.kind else {
            panic!("expected conditional");
        };
        assert_eq!(conditional.condition.operator, Operator::GreaterThan);
        assert_eq!(conditional.then_steps.len(), 1);
        assert_eq!(conditional.else_steps.as_ref().map(Vec::len), Some(1));
        assert_eq!(step.on_error, ErrorPolicy::Skip);
    }

    #[test]
    fn loop_variable_defaults_to_i() {
        let step: Step = serde_json::from_value(json!({
            "loop_range": [1, 3],
            "loop_steps": [{"action": "noop"}]
        }))
        .unwrap();

        let StepKind::Loop(repeat) = &step.kind else {
            panic!("expected loop");
        };
        assert_eq!(repeat.loop_variable, DEFAULT_LOOP_VARIABLE);
        assert_eq!(repeat.bounds(), Some((1, 3)));
    }

    #[test]
    fn malformed_range_is_kept_for_execution() {
        let step: Step = serde_json::from_value(json!({
            "loop_range": [1, 2, 3],
            "loop_steps": []
        }))
        .unwrap();

        let StepKind::Loop(repeat) = &step.kind else {
            panic!("expected loop");
        };
        assert_eq!(repeat.bounds(), None);
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = serde_json::from_value::<Step>(json!({
            "action": "click",
            "selector": "#a",
            "loop_range": [1, 2],
            "loop_steps": []
        }))
        .unwrap_err();
        assert!(err.to_string().contains("action and loop"), "{}", err);
    }

    #[test]
    fn action_fields_on_loop_are_rejected() {
        let err = serde_json::from_value::<Step>(json!({
            "loop_range": [1, 2],
            "loop_steps": [],
            "selector": "#a"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("`selector`"), "{}", err);
    }

    #[test]
    fn empty_record_is_rejected() {
        let err = serde_json::from_value::<Step>(json!({"on_error": "skip"})).unwrap_err();
        assert!(err.to_string().contains("no `action`"), "{}", err);
    }

    #[test]
    fn conditional_requires_then_steps() {
        let err = serde_json::from_value::<Step>(json!({
            "condition": {"variable": "x", "operator": "exists"}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("then_steps"), "{}", err);
    }

    #[test]
    fn serialization_omits_irrelevant_keys() {
        let body = vec![Step::action(ActionStep::of(ActionKind::Noop))];
        let step = Step::repeat(vec![1, 2], "page", body)
            .with_policy(ErrorPolicy::Retry)
            .with_max_retry(2);

        let encoded = serde_json::to_value(&step).unwrap();
        assert_eq!(
            encoded,
            json!({
                "loop_range": [1, 2],
                "loop_variable": "page",
                "loop_steps": [{"action": "noop"}],
                "on_error": "retry",
                "max_retry": 2
            })
        );
    }

    #[test]
    fn unknown_action_names_still_parse() {
        let step: Step = serde_json::from_value(json!({"action": "teleport"})).unwrap();
        let StepKind::Action(action) = &step.kind else {
            panic!("expected action");
        };
        assert!(action.kind().is_err());
    }
}
