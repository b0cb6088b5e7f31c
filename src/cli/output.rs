use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_human(self) -> bool {
        matches!(self, OutputFormat::Human)
    }
}

/// Print `payload` in the machine formats, or call `human` for the text form
pub fn emit<T, F>(output: OutputFormat, payload: &T, human: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(),
{
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(payload)?),
        OutputFormat::Human => human(),
    }
    Ok(())
}
