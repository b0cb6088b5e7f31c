use clap::Subcommand;

use super::batch::BatchArgs;
use super::run::RunArgs;
use super::validate::ValidateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run an automation script against the simulated browser
    Run(RunArgs),

    /// Execute a flat list of actions
    Batch(BatchArgs),

    /// Check a script without running it
    Validate(ValidateArgs),

    /// List the action vocabulary and required fields
    Actions,

    /// Print the JSON schema of the script document
    Schema,
}
