//! Key-value cache abstraction and the read-only passthrough built on it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::error::ServiceError;

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisCache;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connect(String),

    #[error("cache command error: {0}")]
    Command(String),
}

/// Key-value read collaborator.
///
/// Absence is `Ok(None)`, never an error; the cache owns expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}

#[async_trait]
impl<C> Cache for Arc<C>
where
    C: Cache + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        (**self).ping().await
    }
}

/// In-memory cache for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), CacheError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| CacheError::Command("lock poisoned".to_string()))?;
        map.insert(key.into(), value.into());
        Ok(())
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let map = self
            .inner
            .read()
            .map_err(|_| CacheError::Command("lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Read-only passthrough of one fixed cache key.
#[derive(Clone)]
pub struct CachePassthrough {
    cache: Arc<dyn Cache>,
    key: String,
}

impl CachePassthrough {
    pub fn new(cache: Arc<dyn Cache>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Fetch the configured key; a missing key yields an empty string.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn fetch(&self) -> Result<String, ServiceError> {
        match self.cache.get(&self.key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                debug!("cache key absent");
                Ok(String::new())
            }
            Err(e) => {
                error!(error = %e, "error getting value from cache");
                Err(ServiceError::CacheReadFailed(e))
            }
        }
    }
}
