//! SQLite-backed store (dev/tests, or single-node deployments).
//!
//! An in-memory database lives only as long as its connection, so in-memory
//! stores are pinned to a single pooled connection that never expires.

use std::str::FromStr;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::instrument;

use crudline_core::{Record, Value};

use super::{Dialect, Statement, Store, StoreError, check_pool_size, decode_row, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", 1).await
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let max_connections = check_pool_size(max_connections)?;
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Connect(format!("sqlite: {e}")))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connect(format!("sqlite: {e}")))?;
        Ok(Self::new(pool))
    }
}

fn bind_args<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<String>),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

#[async_trait]
impl Store for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    #[instrument(skip_all, fields(sql = %statement.sql), err)]
    async fn execute(&self, statement: &Statement) -> Result<u64, StoreError> {
        let result = bind_args(sqlx::query(&statement.sql), &statement.args)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("execute", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip_all, fields(sql = %statement.sql), err)]
    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError> {
        let mut rows = bind_args(sqlx::query(&statement.sql), &statement.args).fetch(&self.pool);

        let mut records = Vec::new();
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| map_sqlx_error("query", e))?
        {
            records.push(decode_row(&row, &statement.columns)?);
        }
        Ok(records)
    }

    #[instrument(skip_all, fields(sql = %statement.sql), err)]
    async fn query_one(&self, statement: &Statement) -> Result<Option<Record>, StoreError> {
        let row = bind_args(sqlx::query(&statement.sql), &statement.args)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("query_one", e))?;
        row.map(|r| decode_row(&r, &statement.columns)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}
