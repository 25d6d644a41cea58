//! Generic CRUD mapping from resource operations to store statements.
//!
//! One [`ResourceMapper`] serves one [`Resource`]. Each operation issues
//! exactly one parameterized statement and maps every store failure to a
//! [`ServiceError`] kind, logging it with the operation and identifier.
//!
//! Update and delete do not check existence first: zero affected rows is a
//! success, reported through [`WriteOutcome`].

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crudline_core::{Column, Resource, Value};

use crate::error::ServiceError;
use crate::store::{self, SqlTemplates, Statement, Store, StoreError};

/// Result of an update or delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: u64,
}

impl WriteOutcome {
    pub fn matched(&self) -> bool {
        self.rows_affected > 0
    }
}

pub struct ResourceMapper<R, S = Arc<dyn Store>> {
    store: S,
    sql: Arc<SqlTemplates>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S: Clone> Clone for ResourceMapper<R, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sql: self.sql.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R, S> ResourceMapper<R, S>
where
    R: Resource,
    S: Store,
{
    /// Bind a resource to a store; SQL is rendered once for the store's dialect.
    pub fn new(store: S) -> Self {
        let sql = SqlTemplates::for_resource::<R>(store.dialect());
        Self {
            store,
            sql: Arc::new(sql),
            _resource: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the resource table if it is missing.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        store::bootstrap(&self.store, &self.sql.create_table).await
    }

    #[instrument(skip_all, fields(resource = R::NAME))]
    pub async fn create(&self, input: R::Input) -> Result<R::Id, ServiceError> {
        Self::check(&input, "create")?;

        let statement = Statement::new(self.sql.insert.clone(), R::field_values(&input))
            .returning(vec![Column::int(R::ID_COLUMN)]);

        // Drain the RETURNING row set so the insert always runs to completion.
        let record = match self.store.query(&statement).await.map(|rows| rows.into_iter().next()) {
            Ok(Some(record)) => record,
            Ok(None) => {
                let e = StoreError::Query("insert returned no id".to_string());
                error!(error = %e, "error inserting {} into store", R::NAME);
                return Err(ServiceError::StoreWriteFailed(e));
            }
            Err(e) => {
                error!(error = %e, "error inserting {} into store", R::NAME);
                return Err(ServiceError::StoreWriteFailed(e));
            }
        };

        let id = record.int(R::ID_COLUMN).map_err(|e| {
            error!(error = %e, "error reading generated {} id", R::NAME);
            ServiceError::StoreWriteFailed(StoreError::Decode(e.to_string()))
        })?;
        let id = R::Id::from(id);
        info!(%id, "{} created", R::NAME);
        Ok(id)
    }

    /// Every row, in store order. One undecodable row fails the whole list.
    #[instrument(skip_all, fields(resource = R::NAME))]
    pub async fn list_all(&self) -> Result<Vec<R>, ServiceError> {
        let statement = Statement::new(self.sql.select_all.clone(), Vec::new()).returning(R::columns());

        let records = self.store.query(&statement).await.map_err(|e| {
            error!(error = %e, "error querying {} rows from store", R::NAME);
            ServiceError::StoreReadFailed(e)
        })?;

        records
            .iter()
            .map(|record| {
                R::from_record(record).map_err(|e| {
                    error!(error = %e, "error scanning {} row", R::NAME);
                    ServiceError::StoreReadFailed(StoreError::Decode(e.to_string()))
                })
            })
            .collect()
    }

    #[instrument(skip_all, fields(resource = R::NAME, %id))]
    pub async fn read_one(&self, id: R::Id) -> Result<R, ServiceError> {
        let statement = Statement::new(self.sql.select_one.clone(), vec![Value::Int(id.into())])
            .returning(R::columns());

        let record = self
            .store
            .query_one(&statement)
            .await
            .map_err(|e| {
                error!(error = %e, "error querying {} from store", R::NAME);
                ServiceError::StoreReadFailed(e)
            })?
            .ok_or_else(|| {
                debug!("{} not found", R::NAME);
                ServiceError::NotFound {
                    resource: R::NAME,
                    id: id.to_string(),
                }
            })?;

        R::from_record(&record).map_err(|e| {
            error!(error = %e, "error scanning {} row", R::NAME);
            ServiceError::StoreReadFailed(StoreError::Decode(e.to_string()))
        })
    }

    #[instrument(skip_all, fields(resource = R::NAME, %id))]
    pub async fn update(&self, id: R::Id, input: R::Input) -> Result<WriteOutcome, ServiceError> {
        Self::check(&input, "update")?;

        let mut args = R::field_values(&input);
        args.push(Value::Int(id.into()));
        let statement = Statement::new(self.sql.update.clone(), args);

        info!("updating {}", R::NAME);
        let rows_affected = self.store.execute(&statement).await.map_err(|e| {
            error!(error = %e, "error updating {} in store", R::NAME);
            ServiceError::StoreWriteFailed(e)
        })?;

        let outcome = WriteOutcome { rows_affected };
        if !outcome.matched() {
            debug!("update matched no {} rows", R::NAME);
        }
        Ok(outcome)
    }

    #[instrument(skip_all, fields(resource = R::NAME, %id))]
    pub async fn delete(&self, id: R::Id) -> Result<WriteOutcome, ServiceError> {
        let statement = Statement::new(self.sql.delete.clone(), vec![Value::Int(id.into())]);

        let rows_affected = self.store.execute(&statement).await.map_err(|e| {
            error!(error = %e, "error deleting {} from store", R::NAME);
            ServiceError::StoreWriteFailed(e)
        })?;

        let outcome = WriteOutcome { rows_affected };
        if !outcome.matched() {
            debug!("delete matched no {} rows", R::NAME);
        }
        Ok(outcome)
    }

    fn check(input: &R::Input, operation: &'static str) -> Result<(), ServiceError> {
        R::validate(input).map_err(|e| {
            warn!(operation, error = %e, "rejected {} input", R::NAME);
            ServiceError::InvalidInput(e.to_string())
        })
    }
}
