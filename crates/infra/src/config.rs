//! Configuration loading and representation.
//!
//! Everything comes from environment variables. [`AppConfig::from_lookup`]
//! takes any lookup function so tests never touch the process environment.

use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HTTP_PORT: u16 = 9000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CACHE_KEY: &str = "test";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// `None` selects the in-memory cache.
    pub redis_url: Option<String>,
    pub cache_key: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            redis_url: None,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            http_port: parse_var(&get, "HTTP_PORT")?.unwrap_or(defaults.http_port),
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_var(&get, "DB_MAX_CONNECTIONS")?
                .map_or(defaults.db_max_connections, NonZeroU32::get),
            redis_url: get("REDIS_URL"),
            cache_key: get("CACHE_KEY").unwrap_or(defaults.cache_key),
            request_timeout: parse_var(&get, "REQUEST_TIMEOUT_SECS")?
                .map_or(defaults.request_timeout, |secs: NonZeroU64| Duration::from_secs(secs.get())),
        })
    }
}

/// Parse a set variable; unset yields `None`.
///
/// Pool size and timeout parse as non-zero types, so `0` is invalid.
fn parse_var<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.cache_key, "test");
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HTTP_PORT", "8081"),
            ("DATABASE_URL", "postgres://app@db/app"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("REDIS_URL", "redis://cache:6379"),
            ("CACHE_KEY", "greeting"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.http_port, 8081);
        assert_eq!(config.database_url, "postgres://app@db/app");
        assert_eq!(config.db_max_connections, 4);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.cache_key, "greeting");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_port_falls_back_to_default() {
        let config = AppConfig::from_lookup(lookup(&[("HTTP_PORT", "")])).unwrap();
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("HTTP_PORT", "ninety")])).unwrap_err();
        match err {
            ConfigError::Invalid { var, value, .. } => {
                assert_eq!(var, "HTTP_PORT");
                assert_eq!(value, "ninety");
            }
        }
    }

    #[test]
    fn zero_pool_size_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        match err {
            ConfigError::Invalid { var, value, .. } => {
                assert_eq!(var, "DB_MAX_CONNECTIONS");
                assert_eq!(value, "0");
            }
        }
    }

    #[test]
    fn zero_timeout_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        match err {
            ConfigError::Invalid { var, value, .. } => {
                assert_eq!(var, "REQUEST_TIMEOUT_SECS");
                assert_eq!(value, "0");
            }
        }
    }
}
