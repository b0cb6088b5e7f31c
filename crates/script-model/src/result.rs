//! Run and batch result records

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::step::ActionStep;

/// Outcome of one script run
///
/// Produced exactly once per run; failures are reported here rather than as
/// errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub script_name: String,

    pub success: bool,

    /// Wall time of the run, serialized as fractional seconds
    #[serde(with = "duration_secs")]
    pub execution_time: Duration,

    /// Steps completed before the run ended
    pub steps_completed: u64,

    /// Variable store at the end of the run
    pub variables: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

/// A list of action steps executed in order, without control flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub actions: Vec<ActionStep>,

    /// Stop at the first failing action
    #[serde(default = "default_stop_on_error")]
    pub stop_on_error: bool,
}

fn default_stop_on_error() -> bool {
    true
}

impl BatchRequest {
    pub fn new(actions: Vec<ActionStep>) -> Self {
        Self {
            actions,
            stop_on_error: true,
        }
    }
}

/// Result of one action inside a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "duration_secs")]
    pub execution_time: Duration,
}

/// Result of a whole batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub results: Vec<ActionOutcome>,
    #[serde(with = "duration_secs")]
    pub total_time: Duration,
    pub completed: usize,
    pub failed: usize,
    /// Variable store after the batch
    pub variables: BTreeMap<String, Value>,
}

/// Durations as fractional seconds on the wire
pub mod duration_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(de::Error::custom(format!(
                "duration must be a non-negative number of seconds, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs).map_err(|err| {
            de::Error::custom(format!("duration of {} seconds is out of range: {}", secs, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_result_serializes_seconds() {
        let now = Utc::now();
        let result = RunResult {
            script_name: "demo".to_string(),
            success: false,
            execution_time: Duration::from_millis(1500),
            steps_completed: 2,
            variables: BTreeMap::new(),
            error: Some("boom".to_string()),
            started_at: now,
            finished_at: now,
        };

        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["execution_time"], json!(1.5));
        assert_eq!(encoded["steps_completed"], json!(2));
        assert_eq!(encoded["error"], json!("boom"));

        let decoded: RunResult = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn batch_request_stops_on_error_by_default() {
        let request: BatchRequest =
            serde_json::from_value(json!({"actions": [{"action": "get_url"}]})).unwrap();
        assert!(request.stop_on_error);
        assert_eq!(request.actions[0].action, "get_url");
    }

    #[test]
    fn negative_durations_are_rejected() {
        let err = serde_json::from_value::<ActionOutcome>(json!({
            "success": true,
            "action": "noop",
            "execution_time": -1.0
        }))
        .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let err = serde_json::from_value::<ActionOutcome>(json!({
            "success": true,
            "action": "noop",
            "execution_time": 1e300
        }))
        .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{}", err);
    }
}
