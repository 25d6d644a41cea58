//! Postgres-backed store.
//!
//! Uses an SQLx connection pool, which is `Send + Sync` and shared across
//! requests. Each statement checks out a connection for its own duration;
//! there are no multi-statement transactions.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tracing::instrument;

use crudline_core::{Record, Value};

use super::{Dialect, Statement, Store, StoreError, check_pool_size, decode_row, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(check_pool_size(max_connections)?)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connect(format!("postgres: {e}")))?;
        Ok(Self::new(pool))
    }
}

fn bind_args<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &'q [Value],
) -> Query<'q, Postgres, PgArguments> {
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
impl Store for PgStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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
