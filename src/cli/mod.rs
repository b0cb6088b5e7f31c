pub mod actions;
pub mod app;
pub mod batch;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod output;
pub mod run;
pub mod runtime;
pub mod schema;
pub mod validate;
pub mod vars;

pub use actions::cmd_actions;
pub use batch::{cmd_batch, BatchArgs};
pub use run::{cmd_run, RunArgs};
pub use schema::cmd_schema;
pub use validate::{cmd_validate, ValidateArgs};
