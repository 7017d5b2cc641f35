//! Column metadata -> field descriptors. Pure and deterministic, no I/O.

use crate::schema::types::{
    ColumnInfo, DisplayFlags, FieldDescriptor, LogicalType, QueryOperator, ValidationRule,
};

/// Map introspected columns to field descriptors with default display, query
/// and validation policy. Returns an empty list for empty input; callers must
/// treat an empty field set as a generation precondition failure, not a
/// mapper error.
pub fn map_columns(columns: &[ColumnInfo]) -> Vec<FieldDescriptor> {
    columns.iter().map(map_column).collect()
}

fn map_column(col: &ColumnInfo) -> FieldDescriptor {
    let logical_type = infer_logical_type(&col.type_);
    let display = DisplayFlags {
        in_list: true,
        in_form: !col.is_auto_increment,
        in_search: col.is_primary || col.name == "name" || col.name.ends_with("_name"),
    };

    let mut rules = Vec::new();
    if !col.nullable && !col.is_auto_increment {
        rules.push(ValidationRule::required(&col.name));
    }

    FieldDescriptor {
        name: col.name.clone(),
        source_type: col.type_.clone(),
        logical_type,
        nullable: col.nullable,
        is_primary_key: col.is_primary,
        is_auto_increment: col.is_auto_increment,
        display,
        query_operator: default_operator(logical_type, col.is_primary),
        rules,
    }
}

/// Logical type from the raw type string, first match wins.
pub fn infer_logical_type(raw: &str) -> LogicalType {
    let lower = raw.to_lowercase();
    if ["int", "float", "double", "decimal"].iter().any(|k| lower.contains(k)) {
        LogicalType::Number
    } else if lower.contains("date") || lower.contains("time") {
        LogicalType::Date
    } else if lower.contains("boolean") {
        LogicalType::Boolean
    } else if lower.contains("text") {
        LogicalType::Text
    } else {
        LogicalType::String
    }
}

fn default_operator(logical_type: LogicalType, is_primary: bool) -> QueryOperator {
    match logical_type {
        LogicalType::String | LogicalType::Text if !is_primary => QueryOperator::Like,
        _ => QueryOperator::Eq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, type_: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            type_: type_.into(),
            length: None,
            nullable: true,
            is_primary: false,
            is_auto_increment: false,
            default_value: None,
            comment: None,
        }
    }

    #[test]
    fn type_inference_precedence() {
        assert_eq!(infer_logical_type("bigint"), LogicalType::Number);
        assert_eq!(infer_logical_type("decimal(10,2)"), LogicalType::Number);
        assert_eq!(infer_logical_type("double precision"), LogicalType::Number);
        assert_eq!(infer_logical_type("timestamp with time zone"), LogicalType::Date);
        assert_eq!(infer_logical_type("date"), LogicalType::Date);
        assert_eq!(infer_logical_type("boolean"), LogicalType::Boolean);
        assert_eq!(infer_logical_type("text"), LogicalType::Text);
        assert_eq!(infer_logical_type("character varying"), LogicalType::String);
    }

    #[test]
    fn int_wins_over_time_in_precedence() {
        // "point" contains neither; "interval" contains "int" and must be Number
        assert_eq!(infer_logical_type("interval"), LogicalType::Number);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(map_columns(&[]).is_empty());
    }

    #[test]
    fn auto_increment_pk_is_hidden_from_form() {
        let mut id = col("id", "bigint");
        id.is_primary = true;
        id.is_auto_increment = true;
        id.nullable = false;
        let fields = map_columns(&[id]);
        assert!(!fields[0].display.in_form);
        assert!(fields[0].display.in_list);
        assert!(fields[0].display.in_search);
        // auto-increment columns never get a required rule
        assert!(fields[0].rules.is_empty());
        assert_eq!(fields[0].query_operator, QueryOperator::Eq);
    }

    #[test]
    fn name_columns_default_to_search() {
        let fields = map_columns(&[col("name", "varchar"), col("user_name", "varchar"), col("bio", "text")]);
        assert!(fields[0].display.in_search);
        assert!(fields[1].display.in_search);
        assert!(!fields[2].display.in_search);
        assert_eq!(fields[0].query_operator, QueryOperator::Like);
        assert_eq!(fields[2].query_operator, QueryOperator::Like);
    }

    #[test]
    fn required_rule_for_non_nullable() {
        let mut name = col("name", "varchar");
        name.nullable = false;
        let email = col("email", "varchar");
        let fields = map_columns(&[name, email]);
        assert_eq!(fields[0].rules.len(), 1);
        assert_eq!(fields[0].rules[0].kind, "required");
        assert_eq!(fields[0].rules[0].message, "name is required");
        assert!(fields[1].rules.is_empty());
    }
}
