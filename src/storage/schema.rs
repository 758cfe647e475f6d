//! Schema synthesis for the stats table.
//!
//! The stats schema differs between HAProxy versions, so the table is
//! declared from the feed header at runtime. Column names are interpolated
//! into the DDL (they are restricted to `[A-Za-z0-9_-]` by [`ColumnName`]);
//! cell values are only ever bound as parameters of the insert template.

use crate::feed::ColumnName;

/// Name of the single table holding the loaded feed.
pub const TABLE_NAME: &str = "metrics";

/// DDL and insert template synthesized for one feed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatements {
    /// `CREATE TABLE` with one untyped column per header field.
    pub ddl: String,
    /// `INSERT` with one positional placeholder per column.
    pub insert: String,
}

impl SchemaStatements {
    /// Synthesize both statements for the given columns, in order.
    pub fn for_columns(columns: &[ColumnName]) -> Self {
        Self {
            ddl: create_table_ddl(columns),
            insert: insert_template(columns),
        }
    }
}

/// `CREATE TABLE metrics ([c1], [c2], ...)` without type affinity.
pub fn create_table_ddl(columns: &[ColumnName]) -> String {
    let columns = columns
        .iter()
        .map(ColumnName::quoted)
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {TABLE_NAME} ({columns})")
}

/// `INSERT INTO metrics VALUES (?, ?, ...)`.
pub fn insert_template(columns: &[ColumnName]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO {TABLE_NAME} VALUES ({placeholders})")
}
