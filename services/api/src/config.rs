//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// How requests are grouped when they are counted against the rate limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitScope {
    /// Every caller shares one key, so the limit applies to the whole deployment.
    Global,
    /// The peer IP address is appended to the key.
    PerClient,
}

/// Credentials for the hosted Upstash Redis REST endpoint.
#[derive(Clone, Debug)]
pub struct UpstashCredentials {
    pub rest_url: String,
    pub rest_token: String,
}

/// Rate-limiter settings.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    pub key: String,
    pub scope: RateLimitScope,
    /// When absent the in-process fixed-window limiter is used.
    pub upstash: Option<UpstashCredentials>,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub static_dir: PathBuf,
    pub cors_allow_origin: Option<String>,
    pub rate_limit: RateLimitConfig,
}

/// `DATABASE_URL` values with this prefix select the in-process note store.
pub const MEMORY_DATABASE_PREFIX: &str = "memory:";

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5001".to_string());
        let mut bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;
        if let Some(port) = lookup("PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?;
            bind_address.set_port(port);
        }

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./public"));
        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").filter(|s| !s.is_empty());

        // --- Load Rate Limiter Settings ---
        let max_requests = parse_or(&lookup, "RATE_LIMIT_REQUESTS", 100u32)?;
        let window_secs = parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 60u64)?;
        if max_requests == 0 || window_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "RATE_LIMIT_REQUESTS/RATE_LIMIT_WINDOW_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let key = lookup("RATE_LIMIT_KEY").unwrap_or_else(|| "notes-api".to_string());
        let scope_str = lookup("RATE_LIMIT_SCOPE").map(|s| s.to_lowercase());
        let scope = match scope_str.as_deref() {
            None | Some("global") => RateLimitScope::Global,
            Some("client") => RateLimitScope::PerClient,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "RATE_LIMIT_SCOPE".to_string(),
                    format!("'{}' is not one of 'global', 'client'", other),
                ))
            }
        };
        let upstash = match (lookup("UPSTASH_REDIS_REST_URL"), lookup("UPSTASH_REDIS_REST_TOKEN")) {
            (Some(rest_url), Some(rest_token)) => Some(UpstashCredentials {
                rest_url,
                rest_token,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingVar("UPSTASH_REDIS_REST_TOKEN".to_string()))
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingVar("UPSTASH_REDIS_REST_URL".to_string()))
            }
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            static_dir,
            cors_allow_origin,
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
                key,
                scope,
                upstash,
            },
        })
    }

    /// True when `DATABASE_URL` asks for the in-process store.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_DATABASE_PREFIX)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "memory://")])).unwrap();
        assert_eq!(config.bind_address.port(), 5001);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.static_dir, PathBuf::from("./public"));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.rate_limit.key, "notes-api");
        assert_eq!(config.rate_limit.scope, RateLimitScope::Global);
        assert!(config.rate_limit.upstash.is_none());
        assert!(config.uses_memory_store());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn port_overrides_bind_address() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("BIND_ADDRESS", "127.0.0.1:3000"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080".parse().unwrap());
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn rate_limit_settings_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("RATE_LIMIT_REQUESTS", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "10"),
            ("RATE_LIMIT_SCOPE", "client"),
            ("UPSTASH_REDIS_REST_URL", "https://example.upstash.io"),
            ("UPSTASH_REDIS_REST_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(10));
        assert_eq!(config.rate_limit.scope, RateLimitScope::PerClient);
        assert_eq!(
            config.rate_limit.upstash.unwrap().rest_url,
            "https://example.upstash.io"
        );
    }

    #[test]
    fn half_configured_upstash_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("UPSTASH_REDIS_REST_URL", "https://example.upstash.io"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "UPSTASH_REDIS_REST_TOKEN"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("RATE_LIMIT_SCOPE", "per-user"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "RATE_LIMIT_SCOPE"));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("RATE_LIMIT_REQUESTS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));
    }
}
