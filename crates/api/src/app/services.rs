//! Service wiring: store + cache adapters behind the resource mapper.
//!
//! Built once at startup from [`AppConfig`] and shared with handlers through
//! an `Extension<Arc<AppServices>>`. Holds no per-request state.

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crudline_customers::Customer;
use crudline_infra::{
    cache::{Cache, CachePassthrough, InMemoryCache},
    config::AppConfig,
    resource::ResourceMapper,
    store::{self, SqliteStore, Store},
};

pub type CustomerMapper = ResourceMapper<Customer, Arc<dyn Store>>;

#[derive(Clone)]
pub struct AppServices {
    pub customers: CustomerMapper,
    pub cache: CachePassthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl HealthStatus {
    fn of<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() { Self::Up } else { Self::Down }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub store: HealthStatus,
    pub cache: HealthStatus,
}

impl AppServices {
    pub fn new(customers: CustomerMapper, cache: CachePassthrough) -> Self {
        Self { customers, cache }
    }

    /// Private in-memory SQLite store (table bootstrapped) + the given cache.
    pub async fn in_memory(cache: Arc<dyn Cache>, cache_key: &str) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().await?);
        let customers = CustomerMapper::new(store);
        customers.bootstrap().await?;
        Ok(Self::new(customers, CachePassthrough::new(cache, cache_key)))
    }

    /// Ping the store and the cache concurrently.
    pub async fn health(&self) -> HealthReport {
        let (store, cache) = tokio::join!(self.customers.store().ping(), self.cache.cache().ping());

        if let Err(e) = &store {
            tracing::warn!(error = %e, "store health check failed");
        }
        if let Err(e) = &cache {
            tracing::warn!(error = %e, "cache health check failed");
        }

        let store = HealthStatus::of(&store);
        let cache = HealthStatus::of(&cache);
        let status = if store == HealthStatus::Up && cache == HealthStatus::Up {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };
        HealthReport { status, store, cache }
    }
}

/// Build services from configuration: connect the store named by
/// `DATABASE_URL` (creating the customers table if needed) and the cache.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = store::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    tracing::info!(dialect = ?store.dialect(), "connected to database");

    let customers = CustomerMapper::new(store);
    customers
        .bootstrap()
        .await
        .context("failed to create customers table")?;

    let cache = build_cache(config).await?;
    Ok(AppServices::new(
        customers,
        CachePassthrough::new(cache, config.cache_key.clone()),
    ))
}

#[cfg(feature = "redis")]
async fn build_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    match &config.redis_url {
        Some(url) => {
            let cache = crudline_infra::cache::RedisCache::connect(url)
                .await
                .context("failed to connect to redis")?;
            tracing::info!("connected to redis");
            Ok(Arc::new(cache))
        }
        None => {
            tracing::warn!("REDIS_URL not set; using empty in-memory cache");
            Ok(Arc::new(InMemoryCache::new()))
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache(config: &AppConfig) -> anyhow::Result<Arc<dyn Cache>> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL ignored: built without the `redis` feature");
    }
    Ok(Arc::new(InMemoryCache::new()))
}
