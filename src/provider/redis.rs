//! Redis Provider
//!
//! Implements [`CacheProvider`] on top of a [`KvBackend`]: JSON encoding,
//! the object-in-one-hash-field layout and the expiration policy.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::codec;
use super::CacheProvider;
use crate::backend::{Connector, KvBackend};
use crate::config::{CacheConfig, ConnectionParams, ExpiryMode, ProviderSettings};
use crate::error::{CacheError, Completion, Result};
use crate::report::ErrorPolicy;
use crate::JsonObject;

const CONNECT_STAGE: &str = "Failed to establish a connection with the backend";
const QUIT_STAGE: &str = "Failed to close the backend connection";

// == Redis Provider ==
/// Provider adapter for the `redis-provider` type.
pub struct RedisProvider {
    connection: ConnectionParams,
    settings: ProviderSettings,
    policy: ErrorPolicy,
    connector: Arc<dyn Connector>,
    backend: Option<Box<dyn KvBackend>>,
}

impl RedisProvider {
    // == Constructor ==
    /// Creates an unconnected provider.
    ///
    /// Fails with a configuration error if `max_time` is set to zero.
    pub fn new(config: &CacheConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        if config.settings.max_time == Some(0) {
            return Err(CacheError::Config(
                "max_time must be a positive number of seconds".to_string(),
            ));
        }

        Ok(Self {
            connection: config.connection.clone(),
            settings: config.settings,
            policy: ErrorPolicy::new(config.logger.clone()),
            connector,
            backend: None,
        })
    }

    /// Returns true while a backend connection is open.
    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Completion<&dyn KvBackend> {
        self.backend.as_deref().ok_or(CacheError::NotConnected)
    }

    /// Best-effort EXPIRE after a successful write. A failure here leaves the
    /// key without expiration and is only logged.
    async fn apply_expiry(&self, backend: &dyn KvBackend, key: &str) {
        let Some(seconds) = self.settings.max_time else {
            return;
        };

        match backend.expire(key, seconds).await {
            Ok(true) => debug!("Set {}s expiration on '{}'", seconds, key),
            Ok(false) => warn!("Key '{}' vanished before its expiration could be set", key),
            Err(err) => warn!("Failed to set expiration on '{}': {}", key, err),
        }
    }
}

#[async_trait]
impl CacheProvider for RedisProvider {
    async fn initialize(&mut self) -> Result<()> {
        match self.connector.connect(&self.connection).await {
            Ok(backend) => {
                info!("Cache provider connected");
                self.backend = Some(backend);
                Ok(())
            }
            Err(err) => self
                .policy
                .absorb(CacheError::from(err).in_stage(CONNECT_STAGE)),
        }
    }

    async fn save_value(&self, key: &str, value: Value) -> Completion<Value> {
        if codec::is_empty_value(&value) {
            debug!("Skipping write of empty value for '{}'", key);
            return Ok(Value::Null);
        }

        let backend = self.backend()?;
        let payload = codec::encode_value(&value)?;

        match (self.settings.max_time, self.settings.expiry_mode) {
            (Some(seconds), ExpiryMode::Atomic) => {
                backend.set_ex(key, &payload, seconds).await?;
            }
            _ => {
                backend.set(key, &payload).await?;
                self.apply_expiry(backend, key).await;
            }
        }

        debug!("Saved value under '{}'", key);
        Ok(value)
    }

    async fn get_value(&self, key: &str) -> Completion<Option<Value>> {
        let backend = self.backend()?;
        let raw = backend.get(key).await?;
        codec::decode_value(raw)
    }

    async fn save_object(&self, key: &str, object: JsonObject) -> Completion<JsonObject> {
        let backend = self.backend()?;
        let fields = codec::encode_object(&object)?;

        backend.hset_all(key, &fields).await?;
        self.apply_expiry(backend, key).await;

        debug!("Saved object under '{}'", key);
        Ok(object)
    }

    async fn get_object(&self, key: &str) -> Completion<Option<JsonObject>> {
        let backend = self.backend()?;
        let fields = backend.hget_all(key).await?;
        codec::decode_object(fields)
    }

    async fn delete_entry(&self, key: &str) -> Completion<u64> {
        let backend = self.backend()?;
        let removed = backend.del(key).await?;
        debug!("Deleted '{}' ({} removed)", key, removed);
        Ok(removed)
    }

    async fn quit(&mut self) -> Result<()> {
        let Some(backend) = self.backend.take() else {
            return self
                .policy
                .absorb(CacheError::NotConnected.in_stage(QUIT_STAGE));
        };

        match backend.quit().await {
            Ok(()) => {
                info!("Cache provider disconnected");
                Ok(())
            }
            Err(err) => self
                .policy
                .absorb(CacheError::from(err).in_stage(QUIT_STAGE)),
        }
    }
}

impl std::fmt::Debug for RedisProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisProvider")
            .field("connection", &self.connection)
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .field("connected", &self.is_connected())
            .finish()
    }
}
