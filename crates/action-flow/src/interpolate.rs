//! `$name` placeholder substitution
//!
//! A single left-to-right pass over the input. At each `$` the longest
//! variable name that matches at that position is replaced by the variable's
//! string form; a `$` that matches no variable is kept as written. Replacement
//! text is never rescanned, so `$a` holding `"$b"` stays `"$b"`.

use std::borrow::Cow;

use script_model::{ActionStep, Params};
use serde_json::Value;
use soulscript_core_types::{value_to_string, VariableStore};

/// Substitute placeholders in one string
pub fn interpolate<'a>(text: &'a str, variables: &VariableStore) -> Cow<'a, str> {
    if !text.contains('$') || variables.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match longest_match(after, variables) {
            Some((name, value)) => {
                out.push_str(&value_to_string(value));
                rest = &after[name.len()..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn longest_match<'v>(text: &str, variables: &'v VariableStore) -> Option<(&'v str, &'v Value)> {
    variables
        .iter()
        .filter(|(name, _)| !name.is_empty() && text.starts_with(name.as_str()))
        .max_by_key(|(name, _)| name.len())
        .map(|(name, value)| (name.as_str(), value))
}

/// Interpolate a value: strings are substituted, everything else passes through
pub fn interpolate_value(value: &Value, variables: &VariableStore) -> Value {
    match value {
        Value::String(text) => Value::String(interpolate(text, variables).into_owned()),
        other => other.clone(),
    }
}

fn interpolate_field(field: &Option<String>, variables: &VariableStore) -> Option<String> {
    field
        .as_deref()
        .map(|text| interpolate(text, variables).into_owned())
}

fn interpolate_params(params: &Params, variables: &VariableStore) -> Params {
    params
        .iter()
        .map(|(key, value)| (key.clone(), interpolate_value(value, variables)))
        .collect()
}

/// Copy of an action step with every string-bearing field substituted
///
/// Covers the top-level string fields, the top-level values of `params` and of
/// each cookie record. The action name and `save_as` are left alone.
pub fn interpolate_action(step: &ActionStep, variables: &VariableStore) -> ActionStep {
    ActionStep {
        action: step.action.clone(),
        selector: interpolate_field(&step.selector, variables),
        url: interpolate_field(&step.url, variables),
        text: interpolate_field(&step.text, variables),
        value: interpolate_field(&step.value, variables),
        attribute: interpolate_field(&step.attribute, variables),
        script: interpolate_field(&step.script, variables),
        cookies: step.cookies.as_ref().map(|cookies| {
            cookies
                .iter()
                .map(|cookie| interpolate_params(cookie, variables))
                .collect()
        }),
        cookies_text: interpolate_field(&step.cookies_text, variables),
        seconds: step.seconds,
        min_seconds: step.min_seconds,
        max_seconds: step.max_seconds,
        tab_index: step.tab_index,
        iframe_selector: interpolate_field(&step.iframe_selector, variables),
        params: step
            .params
            .as_ref()
            .map(|params| interpolate_params(params, variables)),
        save_as: step.save_as.clone(),
    }
}
