//! Structural diff between two config snapshots.

use crate::config::{Config, PageConfig};
use crate::schema::FieldDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One changed attribute, with both sides as JSON values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub key: String,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
}

/// Per-field modification: which attributes of a same-named field changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub name: String,
    pub changes: Vec<ValueChange>,
}

/// Field membership and page-config differences between two snapshots.
/// A pure reorder of the same field set is reported via `reordered` only,
/// never as per-field modifications.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<FieldChange>,
    pub reordered: bool,
    pub page_changes: Vec<ValueChange>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.modified.is_empty()
            && !self.reordered
            && self.page_changes.is_empty()
    }
}

pub fn diff_configs(a: &Config, b: &Config) -> Diff {
    let mut diff = Diff::default();

    let by_name_a: HashMap<&str, &FieldDescriptor> =
        a.fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let by_name_b: HashMap<&str, &FieldDescriptor> =
        b.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    for field in &b.fields {
        if !by_name_a.contains_key(field.name.as_str()) {
            diff.added.push(field.name.clone());
        }
    }
    for field in &a.fields {
        if !by_name_b.contains_key(field.name.as_str()) {
            diff.removed.push(field.name.clone());
        }
    }

    for field in &a.fields {
        if let Some(other) = by_name_b.get(field.name.as_str()) {
            let changes = diff_values("", field, *other);
            if !changes.is_empty() {
                diff.modified.push(FieldChange {
                    name: field.name.clone(),
                    changes,
                });
            }
        }
    }

    // Order is compared over the common fields only, separately from set
    // membership.
    let order_a: Vec<&str> = a
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|n| by_name_b.contains_key(n))
        .collect();
    let order_b: Vec<&str> = b
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|n| by_name_a.contains_key(n))
        .collect();
    diff.reordered = order_a != order_b;

    diff.page_changes = diff_page(&a.page, &b.page);
    diff
}

/// Flatten both sides to JSON and report keys whose values differ. Nested
/// objects contribute dotted keys (e.g. "display.inList").
fn diff_values<T: Serialize>(prefix: &str, a: &T, b: &T) -> Vec<ValueChange> {
    let a = serde_json::to_value(a).unwrap_or(serde_json::Value::Null);
    let b = serde_json::to_value(b).unwrap_or(serde_json::Value::Null);
    let mut flat_a = HashMap::new();
    let mut flat_b = HashMap::new();
    flatten(prefix, &a, &mut flat_a);
    flatten(prefix, &b, &mut flat_b);

    let mut keys: Vec<&String> = flat_a.keys().chain(flat_b.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut changes = Vec::new();
    for key in keys {
        let before = flat_a.get(key).cloned().unwrap_or(serde_json::Value::Null);
        let after = flat_b.get(key).cloned().unwrap_or(serde_json::Value::Null);
        if before != after {
            changes.push(ValueChange {
                key: key.clone(),
                before,
                after,
            });
        }
    }
    changes
}

fn diff_page(a: &PageConfig, b: &PageConfig) -> Vec<ValueChange> {
    diff_values("", a, b)
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut HashMap<String, serde_json::Value>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}
