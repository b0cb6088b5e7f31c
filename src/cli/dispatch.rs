use super::actions::cmd_actions;
use super::batch::cmd_batch;
use super::env::CliArgs;
use super::run::cmd_run;
use super::schema::cmd_schema;
use super::validate::cmd_validate;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

/// Run the selected command; `Ok(false)` means it finished but reported failure
pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<bool> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Batch(args) => cmd_batch(args, ctx).await,
        Commands::Validate(args) => cmd_validate(args, ctx).await,
        Commands::Actions => cmd_actions(ctx.output()).map(|()| true),
        Commands::Schema => cmd_schema(ctx.output()).map(|()| true),
    }
}
