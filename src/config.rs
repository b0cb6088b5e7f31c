//! Configuration management module
//!
//! `config.yaml` has two sections: `runner` (interpreter tunables) and
//! `dry_run` (the simulated browser). Every field has a default, so an empty
//! or missing file is a valid configuration.

use std::env;
use std::time::Duration;

use action_flow::{RunnerOptions, DEFAULT_MAX_RETRY, DEFAULT_RETRY_DELAY};
use action_primitives::DryRunConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_RETRY_DELAY_MS: &str = "SOULSCRIPT_RETRY_DELAY_MS";
pub const ENV_PREFLIGHT: &str = "SOULSCRIPT_PREFLIGHT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runner: RunnerConfig,
    pub dry_run: DryRunConfig,
}

/// Interpreter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Pause before each retry, in milliseconds
    pub retry_delay_ms: u64,
    /// `max_retry` for steps that leave it out
    pub default_max_retry: u32,
    /// Validate the whole script before running any step
    pub preflight: bool,
    /// Upper bound on a whole run; unbounded when absent
    pub timeout_secs: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            default_max_retry: DEFAULT_MAX_RETRY,
            preflight: false,
            timeout_secs: None,
        }
    }
}

impl RunnerConfig {
    pub fn options(&self) -> RunnerOptions {
        RunnerOptions {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            default_max_retry: self.default_max_retry,
            preflight: self.preflight,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Environment variables win over the file
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = env::var(ENV_RETRY_DELAY_MS) {
            self.runner.retry_delay_ms = raw.trim().parse().with_context(|| {
                format!("{} must be an integer, got '{}'", ENV_RETRY_DELAY_MS, raw)
            })?;
            info!(
                retry_delay_ms = self.runner.retry_delay_ms,
                "Retry delay overridden from environment"
            );
        }

        if let Ok(raw) = env::var(ENV_PREFLIGHT) {
            self.runner.preflight = parse_flag(&raw).with_context(|| {
                format!("{} must be true or false, got '{}'", ENV_PREFLIGHT, raw)
            })?;
            info!(preflight = self.runner.preflight, "Pre-flight overridden from environment");
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
