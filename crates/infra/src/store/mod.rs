//! Relational store abstraction.
//!
//! The mapping layer talks to the database only through [`Store`]: one
//! parameterized [`Statement`] in, affected-row counts or decoded
//! [`Record`]s out. Adapters own the driver, the pool and row decoding.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (unique / foreign key / not null / check violation) | `Constraint` |
//! | Database (other) | `Query` |
//! | PoolTimedOut, PoolClosed, Io, Tls | `Connect` |
//! | ColumnDecode, ColumnNotFound, Decode | `Decode` |
//! | Other | `Query` |

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crudline_core::{Column, Record, Value};

pub mod postgres;
pub mod sql;
pub mod sqlite;

pub use postgres::PgStore;
pub use sql::{Dialect, SqlTemplates};
pub use sqlite::SqliteStore;

/// A parameterized statement plus the columns its result rows carry.
///
/// `columns` is empty for statements that return no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
    pub columns: Vec<Column>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
            columns: Vec::new(),
        }
    }

    /// Declare the columns each returned row holds, in select order.
    pub fn returning(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }
}

/// Store operation error.
///
/// These are infrastructure errors. The mapping layer decides whether a
/// failure counts as a read or a write failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Connect(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("statement failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),
}

/// Relational persistence collaborator.
///
/// Every method is a suspension point. Dropping the returned future
/// abandons the in-flight statement.
#[async_trait]
pub trait Store: Send + Sync {
    /// Placeholder and DDL flavor this store speaks.
    fn dialect(&self) -> Dialect;

    /// Run a statement that returns no rows; yields the affected-row count.
    async fn execute(&self, statement: &Statement) -> Result<u64, StoreError>;

    /// Run a statement and drain every row it produces.
    ///
    /// Fails on the first row that cannot be decoded, or on a cursor error
    /// after the last row.
    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError>;

    /// Run a statement expected to produce at most one row.
    async fn query_one(&self, statement: &Statement) -> Result<Option<Record>, StoreError>;

    /// Round-trip to the database.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, StoreError> {
        (**self).execute(statement).await
    }

    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError> {
        (**self).query(statement).await
    }

    async fn query_one(&self, statement: &Statement) -> Result<Option<Record>, StoreError> {
        (**self).query_one(statement).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}

/// Connect to the store named by a database URL.
///
/// `postgres://` / `postgresql://` select [`PgStore`]; `sqlite:` selects
/// [`SqliteStore`].
pub async fn connect(database_url: &str, max_connections: u32) -> Result<Arc<dyn Store>, StoreError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        let store = PgStore::connect(database_url, max_connections).await?;
        Ok(Arc::new(store))
    } else if database_url.starts_with("sqlite:") {
        let store = SqliteStore::connect(database_url, max_connections).await?;
        Ok(Arc::new(store))
    } else {
        Err(StoreError::Connect(format!(
            "unsupported database url scheme: {database_url}"
        )))
    }
}

/// Create the resource table if it does not exist yet.
pub async fn bootstrap<S>(store: &S, ddl: &str) -> Result<(), StoreError>
where
    S: Store + ?Sized,
{
    store.execute(&Statement::new(ddl, Vec::new())).await?;
    Ok(())
}

/// sqlx panics on a zero-capacity pool; refuse it up front.
pub(crate) fn check_pool_size(max_connections: u32) -> Result<u32, StoreError> {
    if max_connections == 0 {
        return Err(StoreError::Connect(
            "max_connections must be at least 1".to_string(),
        ));
    }
    Ok(max_connections)
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    use sqlx::error::ErrorKind;

    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::Constraint(msg),
                _ => StoreError::Query(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Connect(format!("connection pool unavailable in {operation}: {err}"))
        }
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Connect(format!("connection error in {operation}: {err}"))
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreError::Decode(format!("{operation}: {err}")),
        _ => StoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}

/// Decode one driver row into a [`Record`] following the declared columns.
///
/// Generic over the sqlx backend; the column kinds decide which Rust type is
/// requested for each position.
pub(crate) fn decode_row<R>(row: &R, columns: &[Column]) -> Result<Record, StoreError>
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
    Option<i64>: for<'r> sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    Option<String>: for<'r> sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    use crudline_core::ColumnKind;

    let mut record = Record::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Int => row.try_get::<Option<i64>, _>(idx).map(Value::from),
            ColumnKind::Text => row.try_get::<Option<String>, _>(idx).map(Value::from),
        }
        .map_err(|e| StoreError::Decode(format!("column `{}`: {e}", column.name)))?;
        record.push(column.name, value);
    }
    Ok(record)
}
