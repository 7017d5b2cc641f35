//! Config validation: all rules are independent and collected, never fail-fast.

use crate::config::types::Config;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One failed validation rule, keyed by the field (or config-level key) it
/// concerns. Surfaced as a list; a config is applied whole or not at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, code: &str, message: String) -> Self {
        ValidationError {
            field: field.into(),
            code: code.into(),
            message,
        }
    }
}

/// Collect every rule violation in `config`. An empty result means the config
/// may be snapshotted and deployed.
pub fn validate(config: &Config) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.module_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "moduleName",
            "module_name_missing",
            "module name must not be empty".into(),
        ));
    } else {
        let slug_safe = Regex::new(r"^[A-Za-z][A-Za-z0-9 _-]*$").expect("static pattern");
        if !slug_safe.is_match(&config.module_name) {
            errors.push(ValidationError::new(
                "moduleName",
                "module_name_not_slug_safe",
                format!("module name '{}' is not slug-safe", config.module_name),
            ));
        }
    }

    if config.fields.is_empty() {
        errors.push(ValidationError::new(
            "fields",
            "no_fields",
            "config must contain at least one field".into(),
        ));
        return errors;
    }

    if !config.fields.iter().any(|f| f.display.in_list) {
        errors.push(ValidationError::new(
            "fields",
            "no_list_field",
            "at least one field must be shown in the list page".into(),
        ));
    }

    // A table of only auto-increment columns is read-only by design and may
    // legally have no form fields.
    let all_auto = config.fields.iter().all(|f| f.is_auto_increment);
    if !all_auto && !config.fields.iter().any(|f| f.display.in_form) {
        errors.push(ValidationError::new(
            "fields",
            "no_form_field",
            "at least one field must be editable in the form".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for field in &config.fields {
        if !seen.insert(field.name.as_str()) && reported.insert(field.name.as_str()) {
            errors.push(ValidationError::new(
                &field.name,
                "duplicate_field_name",
                format!("field name '{}' is used more than once", field.name),
            ));
        }
    }

    errors
}
