//! Request-scoped error taxonomy shared by the resource mapper and the cache
//! passthrough. The HTTP layer renders each kind to a status code.

use thiserror::Error;

use crate::cache::CacheError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing request data; nothing reached the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("store read failed: {0}")]
    StoreReadFailed(#[source] StoreError),

    #[error("store write failed: {0}")]
    StoreWriteFailed(#[source] StoreError),

    #[error("cache read failed: {0}")]
    CacheReadFailed(#[source] CacheError),
}

impl ServiceError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
