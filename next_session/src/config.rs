//! Central configuration for the next_session crate

use std::env;
use std::time::Duration;

use crate::session::{CookieConfig, SessionError};

/// Idle time after which a session record is discarded. Default: 30 minutes
pub const DEFAULT_MAX_SESSION_AGE: Duration = Duration::from_secs(30 * 60);

/// Period of the in-memory store's expiry sweep. Default: 10 seconds
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Which backend holds the session records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    /// Process-local map, swept in the background.
    #[default]
    Memory,
    /// Redis server reachable at `url` (e.g. `redis://localhost:6379/0`).
    Redis { url: String },
}

/// Complete configuration for a [`crate::SessionManager`].
///
/// Build it with [`SessionConfig::default`] for the reference settings or
/// [`SessionConfig::from_env`] to honour the `NEXT_SESSION_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub cookie: CookieConfig,
    pub max_session_age: Duration,
    pub sweep_interval: Duration,
    pub store: StoreConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: CookieConfig::default(),
            max_session_age: DEFAULT_MAX_SESSION_AGE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            store: StoreConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Read the configuration from `NEXT_SESSION_*` environment variables.
    ///
    /// Malformed numbers and booleans fall back to their defaults with a warning.
    /// An unknown store type, or a Redis store without a URL, is an error.
    pub fn from_env() -> Result<Self, SessionError> {
        let store = parse_store_config(
            env::var("NEXT_SESSION_STORE_TYPE").ok().as_deref(),
            env::var("NEXT_SESSION_STORE_URL").ok().as_deref(),
        )?;

        let config = Self {
            cookie: CookieConfig::from_env(),
            max_session_age: parse_seconds(
                "NEXT_SESSION_MAX_AGE",
                env::var("NEXT_SESSION_MAX_AGE").ok().as_deref(),
                DEFAULT_MAX_SESSION_AGE,
            ),
            sweep_interval: parse_seconds(
                "NEXT_SESSION_SWEEP_INTERVAL",
                env::var("NEXT_SESSION_SWEEP_INTERVAL").ok().as_deref(),
                DEFAULT_SWEEP_INTERVAL,
            ),
            store,
        };

        tracing::debug!(
            cookie_name = %config.cookie.name,
            max_session_age = ?config.max_session_age,
            sweep_interval = ?config.sweep_interval,
            "Loaded session configuration from environment"
        );
        Ok(config)
    }
}

pub(crate) fn parse_store_config(
    store_type: Option<&str>,
    store_url: Option<&str>,
) -> Result<StoreConfig, SessionError> {
    match store_type.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("memory") => Ok(StoreConfig::Memory),
        Some("redis") => match store_url {
            Some(url) if !url.trim().is_empty() => Ok(StoreConfig::Redis {
                url: url.trim().to_string(),
            }),
            _ => Err(SessionError::Config(
                "NEXT_SESSION_STORE_URL must be set for the redis store".to_string(),
            )),
        },
        Some(other) => Err(SessionError::Config(format!(
            "Unsupported store type: {other}. Supported types are 'memory' and 'redis'"
        ))),
    }
}

/// Parse a positive number of seconds. Zero is rejected since it would disable expiry.
pub(crate) fn parse_seconds(var: &str, value: Option<&str>, default: Duration) -> Duration {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!("Invalid value for {var}: {raw:?}, using default {default:?}");
            default
        }
    }
}

pub(crate) fn parse_bool(var: &str, value: Option<&str>, default: bool) -> bool {
    let Some(raw) = value else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            tracing::warn!("Invalid value for {var}: {raw:?}, using default {default}");
            default
        }
    }
}
