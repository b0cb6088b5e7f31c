use std::path::PathBuf;

use action_flow::{validate_script, ValidationIssue};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::context::CliContext;
use super::output::emit;
use super::run::load_script;

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Script file to check
    pub script: PathBuf,
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    script: &'a str,
    steps: usize,
    valid: bool,
    issues: &'a [ValidationIssue],
}

pub async fn cmd_validate(args: ValidateArgs, ctx: &CliContext) -> Result<bool> {
    let script = load_script(&args.script).await?;
    let issues = validate_script(&script);
    let report = ValidationReport {
        script: &script.name,
        steps: script.step_count(),
        valid: issues.is_empty(),
        issues: &issues,
    };

    emit(ctx.output(), &report, || {
        if issues.is_empty() {
            println!("{}: {} step(s), no issues", script.name, report.steps);
        } else {
            println!("{}: {} issue(s)", script.name, issues.len());
            for issue in &issues {
                println!("  {}", issue);
            }
        }
    })?;
    Ok(report.valid)
}
