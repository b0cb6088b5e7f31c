use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use humantime::format_duration;
use script_model::{BatchRequest, BatchResult, ScriptFormat};
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;

use super::context::CliContext;
use super::output::emit;
use super::vars::collect_variables;

#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// Batch document: `actions`, optional `stop_on_error` and `variables`
    pub file: PathBuf,

    /// Variable (name=value); overrides the document's `variables`
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BatchDocument {
    #[serde(flatten)]
    request: BatchRequest,
    #[serde(default)]
    variables: BTreeMap<String, Value>,
}

pub async fn cmd_batch(args: BatchArgs, ctx: &CliContext) -> Result<bool> {
    let document = load_batch(&args.file).await?;
    let mut variables = collect_variables(None, &args.vars).await?;
    variables.merge_defaults(&document.variables);

    let result = ctx.runner().run_batch(&document.request, variables).await;

    emit(ctx.output(), &result, || print_batch_result(&result))?;
    Ok(result.success)
}

async fn load_batch(path: &Path) -> Result<BatchDocument> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading batch {}", path.display()))?;
    let document = match ScriptFormat::from_path(path) {
        ScriptFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("parsing batch {}", path.display()))?,
        ScriptFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("parsing batch {}", path.display()))?,
    };
    Ok(document)
}

fn print_batch_result(result: &BatchResult) {
    for (index, outcome) in result.results.iter().enumerate() {
        let mark = if outcome.success { "ok" } else { "FAILED" };
        match &outcome.error {
            Some(error) => println!("[{}] {} {}: {}", index, outcome.action, mark, error),
            None => println!("[{}] {} {}", index, outcome.action, mark),
        }
    }
    println!(
        "{} completed, {} failed in {}",
        result.completed,
        result.failed,
        format_duration(result.total_time)
    );
}
