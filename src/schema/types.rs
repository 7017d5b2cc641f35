//! Field model types: raw column metadata and the typed descriptors derived from it.

use serde::{Deserialize, Serialize};

/// One column as reported by table introspection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    /// Raw database type string (e.g. "bigint", "character varying").
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub is_auto_increment: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Closed set of types the generator emits code for. Derived from the raw
/// type string, never stored as free text past this point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Number,
    /// Long string, rendered as a multi-line widget.
    Text,
    Date,
    Boolean,
    String,
}

/// Operator used when the field participates in list-page search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryOperator {
    Eq,
    Like,
    LeftLike,
    RightLike,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Between,
    In,
}

/// Where the field shows up in the generated pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFlags {
    pub in_list: bool,
    pub in_form: bool,
    pub in_search: bool,
}

/// One validation rule attached to a field. `params` carries rule-specific
/// payload (e.g. a max length, a pattern).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl ValidationRule {
    pub fn required(field: &str) -> Self {
        ValidationRule {
            kind: "required".into(),
            message: format!("{} is required", field),
            params: None,
        }
    }
}

/// One column's generation metadata. Field order within a config is display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    /// Raw DB type string the logical type was derived from.
    pub source_type: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub display: DisplayFlags,
    pub query_operator: QueryOperator,
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}
