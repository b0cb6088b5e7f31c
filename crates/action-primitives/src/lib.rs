//! Browser actor capability
//!
//! This crate defines what a browser session must offer to the script
//! interpreter:
//! - [`BrowserActor`]: one async operation per action kind
//! - [`ActorError`]: failures an actor may report
//! - parameter types for the few operations that take structured input
//! - [`DryRunActor`]: an in-memory simulated browser for dry runs and tests

mod actor;
mod dry_run;
pub mod errors;
pub mod types;

pub use actor::{pick_duration, ActorResult, BrowserActor};
pub use dry_run::{DryRunActor, DryRunConfig, ElementFixture};
pub use errors::*;
pub use types::*;
