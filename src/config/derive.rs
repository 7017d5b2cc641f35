//! Deterministic derivations from the module name, plus the schemaless fallback.

use crate::config::types::Config;
use crate::schema::{DisplayFlags, FieldDescriptor, LogicalType, QueryOperator, ValidationRule};

/// Module name lower-cased with non-alphanumerics stripped. Pure, so
/// re-generation from an unchanged config is idempotent.
pub fn slug(module_name: &str) -> String {
    module_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// API route prefix for the generated module.
pub fn api_prefix(module_name: &str) -> String {
    format!("/api/{}", slug(module_name))
}

/// Package namespace the emitted code lives in.
pub fn package_name(module_name: &str) -> String {
    format!("modules.{}", slug(module_name))
}

/// Fallback config when no table schema is available: a minimal id/name pair.
pub fn build_default(module_name: &str, table_name: &str) -> Config {
    let mut config = Config::new(module_name, table_name, "default", "system");
    config.fields = vec![
        FieldDescriptor {
            name: "id".into(),
            source_type: "bigint".into(),
            logical_type: LogicalType::Number,
            nullable: false,
            is_primary_key: true,
            is_auto_increment: true,
            display: DisplayFlags {
                in_list: true,
                in_form: false,
                in_search: true,
            },
            query_operator: QueryOperator::Eq,
            rules: Vec::new(),
        },
        FieldDescriptor {
            name: "name".into(),
            source_type: "varchar".into(),
            logical_type: LogicalType::String,
            nullable: false,
            is_primary_key: false,
            is_auto_increment: false,
            display: DisplayFlags {
                in_list: true,
                in_form: true,
                in_search: true,
            },
            query_operator: QueryOperator::Like,
            rules: vec![ValidationRule::required("name")],
        },
    ];
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate;

    #[test]
    fn slug_strips_and_lowercases() {
        assert_eq!(slug("User Account"), "useraccount");
        assert_eq!(slug("order-items_v2"), "orderitemsv2");
        assert_eq!(api_prefix("User Account"), "/api/useraccount");
        assert_eq!(package_name("User Account"), "modules.useraccount");
    }

    #[test]
    fn derivation_is_idempotent() {
        let config = build_default("Orders", "orders");
        let first = (api_prefix(&config.module_name), package_name(&config.module_name));
        let second = (api_prefix(&config.module_name), package_name(&config.module_name));
        assert_eq!(first, second);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = build_default("Orders", "orders");
        assert!(validate(&config).is_empty());
        assert_eq!(config.fields.len(), 2);
        assert!(!config.fields[0].display.in_form);
    }
}
