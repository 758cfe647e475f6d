//! In-memory SQLite store using sqlx.
//!
//! One store holds one loaded feed and lives for one check run. SQLite keeps
//! a separate database per `:memory:` connection, so the pool is pinned to a
//! single connection that is never reaped.

use std::str::FromStr;

use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, TypeInfo, ValueRef};

use crate::feed::{Cell, StatsFeed};
use crate::storage::StorageError;
use crate::storage::schema::SchemaStatements;

/// Connection URL for a private in-memory database.
const MEMORY_URL: &str = "sqlite::memory:";

/// Bind one cell as the next positional parameter.
fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    cell: &'q Cell,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match cell {
        Cell::Null => query.bind(None::<i64>),
        Cell::Integer(v) => query.bind(*v),
        Cell::Float(v) => query.bind(*v),
        Cell::Text(v) => query.bind(v.as_str()),
    }
}

/// Decode a result column by its storage class.
fn decode_cell(row: &SqliteRow, index: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }

    let cell = match raw.type_info().name() {
        "INTEGER" => Cell::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Cell::Float(row.try_get_unchecked::<f64, _>(index)?),
        "TEXT" => Cell::Text(row.try_get_unchecked::<String, _>(index)?),
        _ => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Cell::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    };
    Ok(cell)
}

/// Embedded relational store for one stats snapshot.
///
/// Load fully (via [`StatsStore::load`] or [`StatsStore::initialize`] +
/// [`StatsStore::insert`]) before issuing any [`StatsStore::query`].
#[derive(Clone)]
pub struct StatsStore {
    pool: SqlitePool,
}

impl std::fmt::Debug for StatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsStore").finish_non_exhaustive()
    }
}

impl StatsStore {
    /// Open an empty in-memory store.
    pub async fn open() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(MEMORY_URL).map_err(StorageError::Connect)?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Open a store and load a parsed feed into it.
    ///
    /// All rows are inserted inside one transaction; any rejected statement
    /// aborts the load and nothing is committed.
    pub async fn load(feed: &StatsFeed) -> Result<Self, StorageError> {
        let statements = SchemaStatements::for_columns(feed.columns());
        let store = Self::open().await?;
        store.initialize(&statements.ddl).await?;

        let mut tx = store.pool.begin().await.map_err(StorageError::SchemaLoad)?;
        for (index, row) in feed.rows().iter().enumerate() {
            row.iter()
                .fold(sqlx::query(&statements.insert), |q, cell| bind_cell(q, cell))
                .execute(&mut *tx)
                .await
                .map_err(|source| StorageError::RowInsert {
                    row: index + 1,
                    source,
                })?;
        }
        tx.commit().await.map_err(StorageError::SchemaLoad)?;

        tracing::debug!(
            columns = feed.columns().len(),
            rows = feed.rows().len(),
            "Stats feed loaded"
        );
        Ok(store)
    }

    /// Execute a data-definition statement.
    pub async fn initialize(&self, ddl: &str) -> Result<(), StorageError> {
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(StorageError::SchemaLoad)?;
        Ok(())
    }

    /// Execute the insert template once with the row's cells bound in order.
    ///
    /// A rejected row is a [`StorageError::SchemaLoad`]; only [`StatsStore::load`]
    /// knows the row's position in the feed.
    pub async fn insert(&self, template: &str, row: &[Cell]) -> Result<(), StorageError> {
        row.iter()
            .fold(sqlx::query(template), |q, cell| bind_cell(q, cell))
            .execute(&self.pool)
            .await
            .map_err(StorageError::SchemaLoad)?;
        Ok(())
    }

    /// Run a read query with positional parameters, returning rows of cells.
    pub async fn query(&self, sql: &str, params: &[Cell]) -> Result<Vec<Vec<Cell>>, StorageError> {
        let rows = params
            .iter()
            .fold(sqlx::query(sql), |q, cell| bind_cell(q, cell))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Query)?;

        rows.iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| decode_cell(row, i))
                    .collect::<Result<Vec<Cell>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::Query)
    }

    /// Close the store, dropping the database.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the store is closed.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ColumnName;
    use crate::storage::schema::{create_table_ddl, insert_template};

    const FIXTURE: &[u8] = include_bytes!("../../tests/fixtures/haproxy_stats.csv");

    fn columns(names: &[&str]) -> Vec<ColumnName> {
        names.iter().map(|n| ColumnName::parse(n).unwrap()).collect()
    }

    async fn count(store: &StatsStore, sql: &str) -> i64 {
        let rows = store.query(sql, &[]).await.unwrap();
        rows[0][0].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_store_open_and_close() {
        let store = StatsStore::open().await.unwrap();
        assert!(!store.is_closed());

        let rows = store.query("SELECT 1", &[]).await.unwrap();
        assert_eq!(rows, vec![vec![Cell::Integer(1)]]);

        store.close().await;
        assert!(store.is_closed());
    }

    #[tokio::test]
    async fn test_initialize_and_insert() {
        let cols = columns(&["one", "two", "three", "four"]);
        let store = StatsStore::open().await.unwrap();
        store.initialize(&create_table_ddl(&cols)).await.unwrap();

        let row = vec![
            Cell::Text("1".into()),
            Cell::Text("2".into()),
            Cell::Text("3".into()),
            Cell::Text("4".into()),
        ];
        store.insert(&insert_template(&cols), &row).await.unwrap();

        assert_eq!(count(&store, "SELECT count(*) FROM metrics").await, 1);
    }

    #[tokio::test]
    async fn test_load_fixture() {
        let feed = StatsFeed::parse(FIXTURE).unwrap();
        let store = StatsStore::load(&feed).await.unwrap();

        assert_eq!(count(&store, "SELECT count(*) FROM metrics").await, 6);
        assert_eq!(
            count(&store, "SELECT count(*) FROM metrics WHERE smax = 10").await,
            1
        );
    }

    #[tokio::test]
    async fn test_cells_keep_their_type() {
        let feed = StatsFeed::parse(b"# a,b,c,d\n1,2.5,UP,\n").unwrap();
        let store = StatsStore::load(&feed).await.unwrap();

        let rows = store
            .query("SELECT typeof(a), typeof(b), typeof(c), typeof(d) FROM metrics", &[])
            .await
            .unwrap();
        let types: Vec<String> = rows[0].iter().map(Cell::to_string).collect();
        assert_eq!(types, ["integer", "real", "text", "null"]);

        let rows = store.query("SELECT a, b, c, d FROM metrics", &[]).await.unwrap();
        assert_eq!(
            rows[0],
            vec![
                Cell::Integer(1),
                Cell::Float(2.5),
                Cell::Text("UP".into()),
                Cell::Null
            ]
        );
    }

    #[tokio::test]
    async fn test_values_are_bound_not_interpolated() {
        let payload = "'); DROP TABLE metrics; --";
        let cols = columns(&["pxname"]);
        let store = StatsStore::open().await.unwrap();
        store.initialize(&create_table_ddl(&cols)).await.unwrap();
        store
            .insert(&insert_template(&cols), &[Cell::Text(payload.into())])
            .await
            .unwrap();

        let rows = store.query("SELECT pxname FROM metrics", &[]).await.unwrap();
        assert_eq!(rows, vec![vec![Cell::Text(payload.into())]]);
    }

    #[tokio::test]
    async fn test_duplicate_columns_fail_schema_load() {
        let feed = StatsFeed::parse(b"# a,a\n1,2\n").unwrap();
        let err = StatsStore::load(&feed).await.unwrap_err();
        assert!(matches!(err, StorageError::SchemaLoad(_)));
        assert!(err.is_schema_load());
    }

    #[tokio::test]
    async fn test_wrong_arity_insert_fails() {
        let cols = columns(&["a", "b"]);
        let store = StatsStore::open().await.unwrap();
        store.initialize(&create_table_ddl(&cols)).await.unwrap();

        let err = store
            .insert("INSERT INTO metrics VALUES (?, ?, ?)", &[Cell::Null, Cell::Null, Cell::Null])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::SchemaLoad(_)));
        assert!(err.is_schema_load());
    }

    #[tokio::test]
    async fn test_insert_rejected_row_is_schema_load() {
        // Second row violates the NOT NULL column added below
        let feed = StatsFeed::parse(b"# a,b\n1,2\n3,\n").unwrap();
        let store = StatsStore::open().await.unwrap();
        store
            .initialize("CREATE TABLE metrics ([a], [b] NOT NULL)")
            .await
            .unwrap();

        let template = SchemaStatements::for_columns(feed.columns()).insert;
        store.insert(&template, &feed.rows()[0]).await.unwrap();
        let err = store.insert(&template, &feed.rows()[1]).await.unwrap_err();
        assert!(matches!(err, StorageError::SchemaLoad(_)));
    }

    #[tokio::test]
    async fn test_missing_column_fails_query() {
        let feed = StatsFeed::parse(b"# a\n1\n").unwrap();
        let store = StatsStore::load(&feed).await.unwrap();

        let err = store.query("SELECT [missing] FROM metrics", &[]).await.unwrap_err();
        assert!(matches!(err, StorageError::Query(_)));
    }

    #[tokio::test]
    async fn test_query_binds_parameters() {
        let feed = StatsFeed::parse(b"# a\n1\n").unwrap();
        let store = StatsStore::load(&feed).await.unwrap();

        let rows = store
            .query("SELECT ? AS host, a FROM metrics", &[Cell::Text("lb-1".into())])
            .await
            .unwrap();
        assert_eq!(rows[0], vec![Cell::Text("lb-1".into()), Cell::Integer(1)]);
    }
}
