use anyhow::Result;
use schemars::schema_for;
use script_model::Script;

use super::output::{emit, OutputFormat};

/// JSON schema of the script document; `human` prints it as JSON too
pub fn cmd_schema(output: OutputFormat) -> Result<()> {
    let schema = schema_for!(Script);
    let pretty = serde_json::to_string_pretty(&schema)?;
    emit(output, &schema, || println!("{}", pretty))
}
