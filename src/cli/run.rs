use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use humantime::format_duration;
use script_model::{RunResult, Script, ScriptFormat};
use soulscript_core_types::value_to_string;
use tokio::fs;
use tokio::time::timeout;
use tracing::{debug, info};

use super::context::CliContext;
use super::output::{emit, OutputFormat};
use super::vars::collect_variables;
use crate::metrics;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Script file to execute (JSON, or YAML by extension)
    pub script: PathBuf,

    /// Script variable (name=value); overrides the script's defaults
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// JSON or YAML file with script variables
    #[arg(long, value_name = "FILE")]
    pub vars_file: Option<PathBuf>,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub emit_metrics: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<bool> {
    let script = load_script(&args.script).await?;
    let variables = collect_variables(args.vars_file.as_ref(), &args.vars).await?;
    debug!(config = %ctx.config_path().display(), variables = variables.len(), "Prepared run");

    let runner = ctx.runner();
    let run = runner.run_script(&script, variables);
    let result = match ctx.config().runner.timeout() {
        Some(limit) => match timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => bail!(
                "script '{}' did not finish within {}",
                script.name,
                format_duration(limit)
            ),
        },
        None => run.await,
    };
    info!(success = result.success, steps_completed = result.steps_completed, "Run finished");

    emit(ctx.output(), &result, || print_run_result(&result))?;
    if args.emit_metrics {
        print_metrics(ctx.output())?;
    }
    Ok(result.success)
}

pub async fn load_script(path: &Path) -> Result<Script> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading script {}", path.display()))?;
    Script::parse(&content, ScriptFormat::from_path(path))
        .with_context(|| format!("parsing script {}", path.display()))
}

fn print_run_result(result: &RunResult) {
    let status = if result.success { "success" } else { "failed" };
    println!("Script:          {}", result.script_name);
    println!("Status:          {}", status);
    println!("Steps completed: {}", result.steps_completed);
    println!("Execution time:  {}", format_duration(result.execution_time));
    if let Some(error) = &result.error {
        println!("Error:           {}", error);
    }
    if !result.variables.is_empty() {
        println!("Variables:");
        for (name, value) in &result.variables {
            println!("  {} = {}", name, value_to_string(value));
        }
    }
}

/// Machine formats keep stdout parseable, so the exposition goes to stderr
fn print_metrics(output: OutputFormat) -> Result<()> {
    let text = metrics::render()?;
    if output.is_human() {
        println!();
        print!("{}", text);
    } else {
        eprint!("{}", text);
    }
    Ok(())
}
