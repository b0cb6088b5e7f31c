//! Shared primitives for the SoulScript interpreter crates.
//!
//! The [`VariableStore`] is the single mutable mapping a script run owns. It is
//! keyed by variable name and holds arbitrary JSON values; iteration order is
//! the sorted key order so that snapshots and interpolation are deterministic.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Identifier attached to a single script run for log correlation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name → value mapping owned by exactly one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    values: BTreeMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Insert or overwrite a variable, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// True when the key is present, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// True when the key is present and its value is not `null`.
    pub fn is_defined(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(value) if !value.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Fill in every default the store does not already hold.
    ///
    /// Existing entries always win over `defaults`. Returns how many entries
    /// were added.
    pub fn merge_defaults<'a, I>(&mut self, defaults: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut added = 0;
        for (name, value) in defaults {
            if let btree_map::Entry::Vacant(slot) = self.values.entry(name.clone()) {
                slot.insert(value.clone());
                added += 1;
            }
        }
        added
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.values
    }
}

impl From<BTreeMap<String, Value>> for VariableStore {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Map<String, Value>> for VariableStore {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            values: map.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, Value)> for VariableStore {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariableStore {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Textual form of a value as used by interpolation and string comparisons.
///
/// Strings are taken verbatim; every other value uses its compact JSON form
/// (`10`, `2.5`, `true`, `null`, `[1,2]`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_defaults_keeps_existing_entries() {
        let mut store = VariableStore::new();
        store.set("user", json!("caller"));

        let mut defaults = Map::new();
        defaults.insert("user".to_string(), json!("script"));
        defaults.insert("limit".to_string(), json!(5));

        let added = store.merge_defaults(&defaults);

        assert_eq!(added, 1);
        assert_eq!(store.get("user"), Some(&json!("caller")));
        assert_eq!(store.get("limit"), Some(&json!(5)));
    }

    #[test]
    fn snapshot_is_detached_from_the_store() {
        let mut store = VariableStore::new();
        store.set("b", json!(1));
        store.set("a", json!(2));

        let before = store.snapshot();
        store.set("c", json!(3));

        assert_eq!(before.len(), 2);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn null_values_are_present_but_not_defined() {
        let mut store = VariableStore::new();
        store.set("maybe", Value::Null);

        assert!(store.contains("maybe"));
        assert!(!store.is_defined("maybe"));
        assert!(!store.is_defined("missing"));
    }

    #[test]
    fn string_form_of_values() {
        assert_eq!(value_to_string(&json!("abc")), "abc");
        assert_eq!(value_to_string(&json!(10)), "10");
        assert_eq!(value_to_string(&json!(2.5)), "2.5");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&Value::Null), "null");
        assert_eq!(value_to_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn store_serializes_as_plain_object() {
        let store: VariableStore = vec![
            ("b".to_string(), json!(2)),
            ("a".to_string(), json!("x")),
        ]
        .into_iter()
        .collect();

        let encoded = serde_json::to_string(&store).unwrap();
        assert_eq!(encoded, r#"{"a":"x","b":2}"#);
    }
}
