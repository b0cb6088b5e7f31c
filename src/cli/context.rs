use std::path::{Path, PathBuf};
use std::sync::Arc;

use action_flow::ScriptRunner;
use action_primitives::DryRunActor;

use super::output::OutputFormat;
use crate::config::Config;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    /// Fresh runner over a fresh simulated browser
    pub fn runner(&self) -> ScriptRunner {
        let actor = Arc::new(DryRunActor::new(self.config.dry_run.clone()));
        ScriptRunner::with_options(actor, self.config.runner.options())
    }
}
