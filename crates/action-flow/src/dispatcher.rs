//! Action dispatch: interpolate, validate, invoke, save

use std::sync::Arc;

use action_primitives::BrowserActor;
use script_model::ActionStep;
use serde_json::Value;
use soulscript_core_types::VariableStore;
use tracing::{debug, info};

use crate::call::ActionCall;
use crate::errors::FlowError;
use crate::interpolate::interpolate_action;
use crate::metrics;

/// Sends action steps to the actor
///
/// Stateless apart from the actor handle; retries are the executor's concern.
#[derive(Clone)]
pub struct ActionDispatcher {
    actor: Arc<dyn BrowserActor>,
}

impl ActionDispatcher {
    pub fn new(actor: Arc<dyn BrowserActor>) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Arc<dyn BrowserActor> {
        &self.actor
    }

    /// Run one action step
    ///
    /// On success the returned value is also stored under `save_as`.
    pub async fn dispatch(
        &self,
        step: &ActionStep,
        variables: &mut VariableStore,
    ) -> Result<Value, FlowError> {
        let resolved = interpolate_action(step, variables);
        let call = ActionCall::build(&resolved)?;
        let kind = call.kind();
        debug!(action = %kind, ?call, "dispatching action");

        let outcome = call.invoke(self.actor.as_ref()).await;
        metrics::record_action(kind.as_str(), outcome.is_ok());
        let value = outcome.map_err(|source| FlowError::Dispatch {
            action: kind.as_str().to_string(),
            source,
        })?;

        if let Some(name) = &step.save_as {
            info!(action = %kind, variable = %name, "Saved result to variable");
            variables.set(name.clone(), value.clone());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::{ActorError, ActorResult};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BrowserActor for Recorder {
        async fn navigate(&self, url: &str) -> ActorResult {
            self.urls.lock().push(url.to_string());
            Ok(json!(url))
        }

        async fn get_text(&self, selector: &str) -> ActorResult {
            Err(ActorError::ElementNotFound(selector.to_string()))
        }
    }

    #[tokio::test]
    async fn interpolates_then_saves_result() {
        let actor = Arc::new(Recorder::default());
        let dispatcher = ActionDispatcher::new(actor.clone());
        let mut vars: VariableStore = [("host".to_string(), json!("example.com"))]
            .into_iter()
            .collect();

        let step = ActionStep::new("navigate")
            .with_url("https://$host/")
            .save_as("landing");
        let value = dispatcher.dispatch(&step, &mut vars).await.unwrap();

        assert_eq!(value, json!("https://example.com/"));
        assert_eq!(vars.get("landing"), Some(&json!("https://example.com/")));
        assert_eq!(actor.urls.lock().as_slice(), ["https://example.com/"]);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_actor() {
        let actor = Arc::new(Recorder::default());
        let dispatcher = ActionDispatcher::new(actor.clone());
        let mut vars = VariableStore::new();

        let err = dispatcher
            .dispatch(&ActionStep::new("navigate").save_as("x"), &mut vars)
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Validation { .. }));
        assert!(actor.urls.lock().is_empty());
        assert!(!vars.contains("x"));
    }

    #[tokio::test]
    async fn actor_failure_is_a_dispatch_error() {
        let dispatcher = ActionDispatcher::new(Arc::new(Recorder::default()));
        let mut vars = VariableStore::new();

        let err = dispatcher
            .dispatch(
                &ActionStep::new("get_text").with_selector("#gone").save_as("t"),
                &mut vars,
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.actor_error(),
            Some(&ActorError::ElementNotFound("#gone".into()))
        );
        assert!(!vars.contains("t"));
    }
}
