//! Script document model
//!
//! Declarative automation scripts are trees of steps. Each step is exactly one
//! of three shapes: an action dispatched to the browser actor, a conditional
//! with `then`/`else` bodies, or an inclusive integer loop. This crate owns the
//! typed model, the document (JSON/YAML) form, and the run/batch records the
//! interpreter produces.

pub mod action;
pub mod condition;
pub mod errors;
pub mod result;
pub mod script;
pub mod step;

pub use action::{ActionGroup, ActionKind};
pub use condition::{Condition, Operator};
pub use errors::ModelError;
pub use result::{ActionOutcome, BatchRequest, BatchResult, RunResult};
pub use script::{RunRequest, Script, ScriptFormat};
pub use step::{
    ActionStep, ConditionalStep, ErrorPolicy, LoopStep, Params, Step, StepKind,
    DEFAULT_LOOP_VARIABLE,
};
