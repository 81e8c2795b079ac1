//! Configuration Module
//!
//! Connection, provider and expiration settings for the cache facade.
//! Built programmatically or loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::CacheError;
use crate::report::ErrorSink;

/// Host used when the connection parameters name none.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port used when the connection parameters name none.
pub const DEFAULT_PORT: u16 = 6379;

// == Provider Type ==
/// Supported provider types. Only Redis is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderType {
    #[default]
    Redis,
}

impl ProviderType {
    /// Name accepted in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Redis => "redis-provider",
        }
    }
}

impl FromStr for ProviderType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redis-provider" => Ok(ProviderType::Redis),
            other => Err(CacheError::Config(format!(
                "Only the redis provider is enabled at this time, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Connection Parameters ==
/// Backend connection parameters. All fields are optional.
///
/// An explicit `url` takes precedence over the individual fields.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    /// Full connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Logical database index
    pub db: i64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionParams {
    /// Parameters for a host and port, everything else defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    /// Parameters for a connection URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Host to connect to, falling back to [`DEFAULT_HOST`].
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port to connect to, falling back to [`DEFAULT_PORT`].
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host())
            .field("port", &self.port())
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// == Provider Settings ==
/// How the expiration is attached to a scalar write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryMode {
    /// Write first, then issue EXPIRE on the same key (two round-trips).
    #[default]
    FollowUp,
    /// Write value and expiration together with `SET ... EX`.
    Atomic,
}

/// Provider runtime settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Expiration in seconds applied to every write. Must be positive if set.
    pub max_time: Option<u64>,
    pub expiry_mode: ExpiryMode,
}

// == Cache Config ==
/// Cache configuration.
///
/// Constructed once and treated as immutable after it is handed to the cache.
#[derive(Clone, Default)]
pub struct CacheConfig {
    pub connection: ConnectionParams,
    /// Error sink. When absent, precondition failures are returned to the caller.
    pub logger: Option<Arc<dyn ErrorSink>>,
    /// Requested provider type, validated by `Cache::new`
    pub provider_type: Option<String>,
    pub settings: ProviderSettings,
}

impl CacheConfig {
    /// Creates a configuration for the given connection parameters.
    pub fn new(connection: ConnectionParams) -> Self {
        Self {
            connection,
            ..Self::default()
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorSink>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = Some(provider_type.into());
        self
    }

    pub fn with_max_time(mut self, seconds: u64) -> Self {
        self.settings.max_time = Some(seconds);
        self
    }

    pub fn with_expiry_mode(mut self, mode: ExpiryMode) -> Self {
        self.settings.expiry_mode = mode;
        self
    }

    /// Resolves the configured provider type.
    ///
    /// Fails with a configuration error for anything but the redis provider.
    pub fn resolve_provider_type(&self) -> Result<ProviderType, CacheError> {
        match &self.provider_type {
            Some(name) => name.parse(),
            None => Ok(ProviderType::default()),
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_URL` - Full connection URL (overrides host/port)
    /// - `CACHE_HOST` - Backend host (default: 127.0.0.1)
    /// - `CACHE_PORT` - Backend port (default: 6379)
    /// - `CACHE_DB` - Database index (default: 0)
    /// - `CACHE_USERNAME` / `CACHE_PASSWORD` - Credentials
    /// - `CACHE_PROVIDER` - Provider type (must be `redis-provider`)
    /// - `CACHE_MAX_TIME` - Expiration in seconds (default: none)
    pub fn from_env() -> Self {
        let connection = ConnectionParams {
            url: env::var("CACHE_URL").ok(),
            host: env::var("CACHE_HOST").ok(),
            port: env::var("CACHE_PORT").ok().and_then(|v| v.parse().ok()),
            db: env::var("CACHE_DB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            username: env::var("CACHE_USERNAME").ok(),
            password: env::var("CACHE_PASSWORD").ok(),
        };

        Self {
            connection,
            logger: None,
            provider_type: env::var("CACHE_PROVIDER").ok(),
            settings: ProviderSettings {
                max_time: env::var("CACHE_MAX_TIME").ok().and_then(|v| v.parse().ok()),
                expiry_mode: ExpiryMode::default(),
            },
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("connection", &self.connection)
            .field("logger", &self.logger.is_some())
            .field("provider_type", &self.provider_type)
            .field("settings", &self.settings)
            .finish()
    }
}
