//! Process configuration, read from environment variables.
//!
//! | variable | default | meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `DATABASE_URL` | unset | Postgres URL; unset selects the in-memory store |
//! | `DB_MAX_CONNECTIONS` | `10` | pool size |
//! | `DB_ACQUIRE_TIMEOUT_SECS` | `5` | wait for a pooled connection |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use stationflow_infra::db::PoolSettings;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs against the in-memory store.
    pub database: Option<PoolSettings>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let database = match get("DATABASE_URL") {
            Some(url) => {
                let mut settings = PoolSettings::new(url);
                settings.max_connections =
                    parse_or(&get, "DB_MAX_CONNECTIONS", settings.max_connections)?;
                let secs = parse_or(
                    &get,
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    settings.acquire_timeout.as_secs(),
                )?;
                settings.acquire_timeout = Duration::from_secs(secs);
                Some(settings)
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            database,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
