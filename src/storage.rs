//! Storage Layer
//!
//! Embedded, process-local SQLite store rebuilt on every run:
//! - **Schema**: DDL and insert template synthesized from the feed header
//! - **Store**: In-memory database loaded once, then queried read-only
//!
//! # Components
//!
//! - [`SchemaStatements`]: Synthesized `CREATE TABLE` / `INSERT` pair
//! - [`StatsStore`]: Load and query facade over a single-connection pool
//! - [`StorageError`]: Load and query failures

mod error;
mod schema;
mod store;

pub use error::StorageError;
pub use schema::{SchemaStatements, TABLE_NAME, create_table_ddl, insert_template};
pub use store::StatsStore;
