//! Script interpretation layer
//!
//! Walks a [`script_model::Script`] step tree against a
//! [`action_primitives::BrowserActor`]: variable interpolation, conditional
//! branches, counted loops and per-step error policies (abort, skip, retry).

pub mod batch;
pub mod call;
pub mod conditions;
pub mod dispatcher;
pub mod errors;
pub mod executor;
pub mod interpolate;
pub mod metrics;
pub mod runner;
pub mod strategies;
pub mod validate;

pub use batch::execute_batch;
pub use call::ActionCall;
pub use conditions::evaluate;
pub use dispatcher::ActionDispatcher;
pub use errors::{ErrorKind, FlowError};
pub use executor::{ExecutionContext, StepExecutor, StepOutcome, DEFAULT_MAX_RETRY};
pub use interpolate::{interpolate, interpolate_value};
pub use runner::{RunnerOptions, ScriptRunner};
pub use strategies::{
    DefaultFailureHandler, FailureHandler, FailureHandlerResult, DEFAULT_RETRY_DELAY,
};
pub use validate::{validate_script, ValidationIssue};
