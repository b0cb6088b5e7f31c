//! Caller-supplied variables for `run` and `batch`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use script_model::ScriptFormat;
use serde_json::Value;
use soulscript_core_types::VariableStore;
use tokio::fs;

/// Variables from `--vars-file`, then `--var` pairs on top
pub async fn collect_variables(file: Option<&PathBuf>, pairs: &[String]) -> Result<VariableStore> {
    let mut variables = match file {
        Some(path) => read_vars_file(path).await?,
        None => VariableStore::new(),
    };
    for pair in pairs {
        let (name, value) = parse_pair(pair)?;
        variables.set(name, value);
    }
    Ok(variables)
}

async fn read_vars_file(path: &Path) -> Result<VariableStore> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading variables file {}", path.display()))?;
    let map: BTreeMap<String, Value> = match ScriptFormat::from_path(path) {
        ScriptFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("parsing variables file {}", path.display()))?,
        ScriptFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("parsing variables file {}", path.display()))?,
    };
    Ok(map.into())
}

/// `name=value`; the value is read as JSON when it parses, else kept as text
pub fn parse_pair(pair: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = pair.split_once('=') else {
        bail!("variable '{}' must look like name=value", pair);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("variable '{}' has an empty name", pair);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
