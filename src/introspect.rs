//! Table introspection: raw column metadata for the schema mapper.

use crate::error::AppError;
use crate::schema::ColumnInfo;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait TableIntrospector: Send + Sync {
    async fn list_columns(&self, datasource_id: &str, table_name: &str) -> Result<Vec<ColumnInfo>, AppError>;
}

/// Reads `information_schema` on a PostgreSQL pool. The datasource id names
/// the schema to look in ("default" maps to `public`).
pub struct PgIntrospector {
    pool: PgPool,
}

impl PgIntrospector {
    pub fn new(pool: PgPool) -> Self {
        PgIntrospector { pool }
    }
}

const COLUMNS_SQL: &str = r#"
SELECT
    c.column_name,
    c.data_type,
    c.character_maximum_length,
    (c.is_nullable = 'YES') AS nullable,
    c.column_default,
    (c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%') AS auto_increment,
    EXISTS (
        SELECT 1
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON kcu.constraint_name = tc.constraint_name
         AND kcu.table_schema = tc.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND tc.table_schema = c.table_schema
          AND tc.table_name = c.table_name
          AND kcu.column_name = c.column_name
    ) AS is_primary,
    col_description(
        (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass,
        c.ordinal_position::int
    ) AS comment
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position
"#;

#[async_trait]
impl TableIntrospector for PgIntrospector {
    async fn list_columns(&self, datasource_id: &str, table_name: &str) -> Result<Vec<ColumnInfo>, AppError> {
        let schema = if datasource_id.is_empty() || datasource_id == "default" {
            "public"
        } else {
            datasource_id
        };
        tracing::debug!(schema = %schema, table = %table_name, "introspecting table");
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(schema)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await?;

        let columns = rows
            .iter()
            .map(|row| ColumnInfo {
                name: row.get("column_name"),
                type_: row.get("data_type"),
                length: row.get::<Option<i32>, _>("character_maximum_length").map(|n| n as u32),
                nullable: row.get("nullable"),
                is_primary: row.get("is_primary"),
                is_auto_increment: row.get("auto_increment"),
                default_value: row.get("column_default"),
                comment: row.get("comment"),
            })
            .collect();
        Ok(columns)
    }
}
