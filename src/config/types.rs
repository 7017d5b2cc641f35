//! Module definition types: the versioned unit of truth.

use crate::schema::FieldDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// List-page settings for the generated module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConfig {
    pub title: String,
    pub page_size: u32,
    /// Row operations exposed on the list page (e.g. "edit", "delete").
    #[serde(default)]
    pub operations: Vec<String>,
}

/// Form settings for the generated module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub layout: String,
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub list: ListConfig,
    pub form: FormConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            list: ListConfig {
                title: String::new(),
                page_size: 20,
                operations: vec!["edit".into(), "delete".into()],
            },
            form: FormConfig {
                layout: "horizontal".into(),
                width: 600,
            },
        }
    }
}

/// Editable definition of a generated module. Field order is display order.
///
/// A config is a plain value: a version snapshot deep-copies it, and edits
/// after a snapshot produce a new draft rather than mutating history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub id: Uuid,
    /// Non-empty and slug-safe; api prefix and package name derive from it.
    pub module_name: String,
    pub table_name: String,
    pub datasource_id: String,
    pub fields: Vec<FieldDescriptor>,
    pub page: PageConfig,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Config {
    pub fn new(module_name: &str, table_name: &str, datasource_id: &str, author: &str) -> Self {
        let mut page = PageConfig::default();
        page.list.title = module_name.to_string();
        Config {
            id: Uuid::new_v4(),
            module_name: module_name.into(),
            table_name: table_name.into(),
            datasource_id: datasource_id.into(),
            fields: Vec::new(),
            page,
            author: author.into(),
            created_at: Utc::now(),
        }
    }
}
