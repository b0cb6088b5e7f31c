//! Script documents and run requests

use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;
use crate::step::Step;

/// Automation script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Script {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Defaults merged under the caller's variables before the run
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,

    /// Opaque browser-session settings, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_config: Option<Value>,

    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            description: None,
            variables: BTreeMap::new(),
            session_config: None,
            steps,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a document in the given format
    pub fn parse(text: &str, format: ScriptFormat) -> Result<Self, ModelError> {
        match format {
            ScriptFormat::Json => Self::from_json_str(text),
            ScriptFormat::Yaml => Self::from_yaml_str(text),
        }
    }

    /// Total number of steps in the tree, nested bodies included
    pub fn step_count(&self) -> usize {
        fn count(steps: &[Step]) -> usize {
            steps
                .iter()
                .map(|step| {
                    1 + match &step.kind {
                        crate::StepKind::Action(_) => 0,
                        crate::StepKind::Conditional(conditional) => {
                            count(&conditional.then_steps)
                                + conditional.else_steps.as_deref().map(count).unwrap_or(0)
                        }
                        crate::StepKind::Loop(repeat) => count(&repeat.loop_steps),
                    }
                })
                .sum()
        }
        count(&self.steps)
    }
}

/// On-disk encodings of a script document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Json,
    Yaml,
}

impl ScriptFormat {
    /// Guess from the file extension; anything that is not YAML is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ScriptFormat::Yaml
            }
            _ => ScriptFormat::Json,
        }
    }
}

/// Caller request: a script plus the variables to seed the run with
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunRequest {
    pub script: Script,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_variables: Option<BTreeMap<String, Value>>,
}

impl RunRequest {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            initial_variables: None,
        }
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, Value>) -> Self {
        self.initial_variables = Some(variables);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCENARIO: &str = r#"{
        "name": "scenario",
        "variables": {"x": 1},
        "steps": [
            {"action": "sleep", "seconds": 0},
            {"loop_range": [1, 2], "loop_variable": "i",
             "loop_steps": [{"action": "noop", "save_as": "last_i"}]}
        ]
    }"#;

    #[test]
    fn parses_json_script() {
        let script = Script::from_json_str(SCENARIO).unwrap();
        assert_eq!(script.name, "scenario");
        assert_eq!(script.variables.get("x"), Some(&json!(1)));
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.step_count(), 3);
    }

    #[test]
    fn parses_yaml_script() {
        let yaml = r##"
name: login
description: sign in and read the banner
variables:
  user: alice
steps:
  - action: navigate
    url: https://example.com/login
  - action: type
    selector: "#user"
    text: $user
  - condition:
      variable: banner
      operator: not_empty
    then_steps:
      - action: get_text
        selector: ".banner"
        save_as: banner_text
"##;
        let script = Script::parse(yaml, ScriptFormat::Yaml).unwrap();
        assert_eq!(script.description.as_deref(), Some("sign in and read the banner"));
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.step_count(), 4);
    }

    #[test]
    fn format_is_detected_from_extension() {
        assert_eq!(ScriptFormat::from_path(Path::new("a.yml")), ScriptFormat::Yaml);
        assert_eq!(ScriptFormat::from_path(Path::new("a.YAML")), ScriptFormat::Yaml);
        assert_eq!(ScriptFormat::from_path(Path::new("a.json")), ScriptFormat::Json);
        assert_eq!(ScriptFormat::from_path(Path::new("script")), ScriptFormat::Json);
    }

    #[test]
    fn empty_steps_are_legal() {
        let script = Script::from_json_str(r#"{"name": "empty", "steps": []}"#).unwrap();
        assert!(script.steps.is_empty());
        assert!(script.variables.is_empty());
    }

    #[test]
    fn builder_matches_the_parsed_document() {
        let built = Script::new("greeting", Vec::new())
            .with_description("says hello")
            .with_variable("who", json!("world"));
        let parsed = Script::from_json_str(
            r#"{"name": "greeting", "description": "says hello",
                "variables": {"who": "world"}, "steps": []}"#,
        )
        .unwrap();
        assert_eq!(built, parsed);

        let encoded = serde_json::to_value(&built).unwrap();
        assert!(encoded.get("session_config").is_none());
    }

    #[test]
    fn run_request_defaults() {
        let request: RunRequest =
            serde_json::from_value(json!({"script": {"name": "n", "steps": []}})).unwrap();
        assert!(request.initial_variables.is_none());
    }
}
