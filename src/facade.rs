//! Cache Facade
//!
//! Public entry point: validates configuration, composes keys from
//! identifier fragments and delegates storage to the active provider.
//!
//! # Error routing
//! Every data operation returns `Result<Outcome<T>>`:
//! - precondition failures (bad key, not initialized) go through the error
//!   policy: `Err` without a sink, `Ok(Outcome::Reported)` with one;
//! - backend failures arrive as `Ok(Outcome::Completed(Err(..)))` whether or
//!   not a sink is configured, and are never reported to the sink.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{Connector, RedisConnector};
use crate::config::{CacheConfig, ProviderType};
use crate::error::{CacheError, Completion, Result};
use crate::key::{CompositeKey, KeyFragment};
use crate::provider::{CacheProvider, RedisProvider};
use crate::report::ErrorPolicy;
use crate::JsonObject;

const SETUP_STAGE: &str = "Failed to setup the cache functionality";

// == Outcome ==
/// What became of an operation that passed (or was excused from) the
/// error policy.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// The backend call ran; carries its reply or the backend's error.
    Completed(Completion<T>),
    /// A precondition failed and was reported to the error sink. No
    /// completion is delivered.
    Reported,
}

impl<T> Outcome<T> {
    /// The completion, or `None` if the failure went to the error sink.
    pub fn into_completion(self) -> Option<Completion<T>> {
        match self {
            Outcome::Completed(completion) => Some(completion),
            Outcome::Reported => None,
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Outcome::Reported)
    }
}

// == Cache ==
/// Keyed JSON cache over a single provider connection.
pub struct Cache {
    config: CacheConfig,
    provider_type: ProviderType,
    policy: ErrorPolicy,
    connector: Arc<dyn Connector>,
    provider: Option<Box<dyn CacheProvider>>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache that connects to Redis on `initialize`.
    ///
    /// Fails with a configuration error when a provider type other than
    /// `redis-provider` is requested. No connection is opened.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_connector(config, Arc::new(RedisConnector))
    }

    /// Creates a cache that opens its backend through `connector`.
    pub fn with_connector(config: CacheConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        let provider_type = config.resolve_provider_type()?;
        let policy = ErrorPolicy::new(config.logger.clone());

        Ok(Self {
            config,
            provider_type,
            policy,
            connector,
            provider: None,
        })
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.is_some()
    }

    // == Initialize ==
    /// Builds the provider from the stored configuration and connects it.
    ///
    /// Failures are prefixed with the setup stage and routed through the
    /// error policy. Calling this again replaces the current provider.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.build_provider().await {
            Ok(provider) => {
                if self.provider.replace(provider).is_some() {
                    debug!("Replaced existing {} provider", self.provider_type);
                }
                Ok(())
            }
            Err(err) => self.policy.absorb(err.in_stage(SETUP_STAGE)),
        }
    }

    async fn build_provider(&self) -> Result<Box<dyn CacheProvider>> {
        let mut provider = match self.provider_type {
            ProviderType::Redis => RedisProvider::new(&self.config, self.connector.clone())?,
        };
        provider.initialize().await?;
        Ok(Box::new(provider))
    }

    // == Save Value ==
    /// Stores a scalar/JSON value under the composed key.
    ///
    /// The completion echoes the input value, not a re-read of the backend.
    pub async fn save_value(&self, fragments: &[KeyFragment], value: Value) -> Result<Outcome<Value>> {
        let (provider, key) = match self.prepare(fragments) {
            Ok(prepared) => prepared,
            Err(err) => return self.reported(err),
        };

        let completion = provider.save_value(key.as_str(), value.clone()).await;
        Ok(Outcome::Completed(completion.map(|_| value)))
    }

    // == Get Value ==
    /// Reads a scalar/JSON value; completes with `None` for an absent key.
    pub async fn get_value(&self, fragments: &[KeyFragment]) -> Result<Outcome<Option<Value>>> {
        let (provider, key) = match self.prepare(fragments) {
            Ok(prepared) => prepared,
            Err(err) => return self.reported(err),
        };

        Ok(Outcome::Completed(provider.get_value(key.as_str()).await))
    }

    // == Save Object ==
    /// Stores a structured object under the composed key.
    ///
    /// The completion echoes the input object.
    pub async fn save_object(
        &self,
        fragments: &[KeyFragment],
        object: JsonObject,
    ) -> Result<Outcome<JsonObject>> {
        let (provider, key) = match self.prepare(fragments) {
            Ok(prepared) => prepared,
            Err(err) => return self.reported(err),
        };

        let completion = provider.save_object(key.as_str(), object.clone()).await;
        Ok(Outcome::Completed(completion.map(|_| object)))
    }

    // == Get Object ==
    /// Reads a structured object; completes with `None` for an absent key.
    pub async fn get_object(&self, fragments: &[KeyFragment]) -> Result<Outcome<Option<JsonObject>>> {
        let (provider, key) = match self.prepare(fragments) {
            Ok(prepared) => prepared,
            Err(err) => return self.reported(err),
        };

        Ok(Outcome::Completed(provider.get_object(key.as_str()).await))
    }

    // == Delete Entry ==
    /// Deletes the composed key; completes with the number of keys removed.
    pub async fn delete_entry(&self, fragments: &[KeyFragment]) -> Result<Outcome<u64>> {
        let (provider, key) = match self.prepare(fragments) {
            Ok(prepared) => prepared,
            Err(err) => return self.reported(err),
        };

        Ok(Outcome::Completed(provider.delete_entry(key.as_str()).await))
    }

    // == Quit ==
    /// Closes the provider's backend connection.
    ///
    /// The provider stays in place, so a second call reaches the provider
    /// and fails there with "no open connection".
    pub async fn quit(&mut self) -> Result<()> {
        match self.provider.as_mut() {
            Some(provider) => provider.quit().await,
            None => self.policy.absorb(CacheError::NotInitialized),
        }
    }

    /// Resolves the provider and composes the key.
    fn prepare(&self, fragments: &[KeyFragment]) -> Result<(&dyn CacheProvider, CompositeKey)> {
        let key = CompositeKey::compose(fragments)?;
        if key.is_ambiguous() {
            warn!(
                "Key '{}' contains a fragment with the ':' delimiter and may collide",
                key
            );
        }

        let provider = self.provider.as_deref().ok_or(CacheError::NotInitialized)?;
        Ok((provider, key))
    }

    fn reported<T>(&self, err: CacheError) -> Result<Outcome<T>> {
        self.policy.absorb(err).map(|()| Outcome::Reported)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("provider_type", &self.provider_type)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
