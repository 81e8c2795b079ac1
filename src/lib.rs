//! Keyed Cache - composite-key JSON cache over a key-value store
//!
//! Stores scalar JSON values and structured objects in Redis under keys
//! composed from identifier fragments, with optional uniform expiration.
//!
//! ```no_run
//! use keyed_cache::{Cache, CacheConfig, ConnectionParams};
//! use serde_json::json;
//!
//! # async fn run() -> keyed_cache::Result<()> {
//! let config = CacheConfig::new(ConnectionParams::new("127.0.0.1", 6379)).with_max_time(300);
//! let mut cache = Cache::new(config)?;
//! cache.initialize().await?;
//!
//! let saved = cache.save_value(&["user".into(), 42.into()], json!(100)).await?;
//! assert!(!saved.is_reported());
//! let outcome = cache.get_value(&["user".into(), 42.into()]).await?;
//! assert_eq!(outcome.into_completion().transpose()?.flatten(), Some(json!(100)));
//!
//! cache.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod facade;
pub mod key;
pub mod provider;
pub mod report;
pub mod tasks;

/// Structured object stored on the object path.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use config::{CacheConfig, ConnectionParams, ExpiryMode, ProviderSettings, ProviderType};
pub use error::{BackendError, CacheError, Completion, Result};
pub use facade::{Cache, Outcome};
pub use key::{CompositeKey, KeyFragment, KEY_DELIMITER};
pub use provider::{CacheProvider, RedisProvider};
pub use report::{ErrorSink, TracingSink};
pub use tasks::spawn_cleanup_task;
