//! Infrastructure layer: relational store, key-value cache, configuration,
//! and the generic resource mapper that ties a resource to a store.

pub mod cache;
pub mod config;
pub mod error;
pub mod resource;
pub mod store;

pub use cache::{Cache, CacheError, CachePassthrough, InMemoryCache};
pub use config::{AppConfig, ConfigError};
pub use error::ServiceError;
pub use resource::{ResourceMapper, WriteOutcome};
pub use store::{Dialect, PgStore, SqliteStore, Statement, Store, StoreError};
