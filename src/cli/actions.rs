use anyhow::Result;
use script_model::ActionKind;
use serde::Serialize;

use super::output::{emit, OutputFormat};

#[derive(Serialize)]
struct ActionEntry {
    action: &'static str,
    group: &'static str,
    required: &'static [&'static str],
}

pub fn cmd_actions(output: OutputFormat) -> Result<()> {
    let entries: Vec<ActionEntry> = ActionKind::ALL
        .iter()
        .map(|kind| ActionEntry {
            action: kind.as_str(),
            group: kind.group().as_str(),
            required: kind.required_fields(),
        })
        .collect();

    emit(output, &entries, || {
        let mut group = "";
        for entry in &entries {
            if entry.group != group {
                group = entry.group;
                println!("{}:", group);
            }
            if entry.required.is_empty() {
                println!("  {}", entry.action);
            } else {
                println!("  {:<24} requires {}", entry.action, entry.required.join(", "));
            }
        }
    })
}
