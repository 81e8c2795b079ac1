//! Provider Module
//!
//! The storage capability set the facade consumes, and its Redis adapter.
//!
//! Data operations return a [`Completion`]: backend failures and undecodable
//! payloads are delivered there. Lifecycle operations (`initialize`, `quit`)
//! return through the provider's error policy instead.

pub mod codec;
mod redis;


use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Completion, Result};
use crate::JsonObject;

pub use self::redis::RedisProvider;

// == Cache Provider ==
/// Storage capability set implemented against a concrete backend.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Opens the backend connection.
    async fn initialize(&mut self) -> Result<()>;

    /// Stores a scalar/JSON value. Completes with the input value.
    async fn save_value(&self, key: &str, value: Value) -> Completion<Value>;

    /// Reads a scalar/JSON value; `None` for an absent key.
    async fn get_value(&self, key: &str) -> Completion<Option<Value>>;

    /// Stores a structured object. Completes with the input object.
    async fn save_object(&self, key: &str, object: JsonObject) -> Completion<JsonObject>;

    /// Reads a structured object; `None` for an absent key.
    async fn get_object(&self, key: &str) -> Completion<Option<JsonObject>>;

    /// Deletes the key. Completes with the backend reply (keys removed).
    async fn delete_entry(&self, key: &str) -> Completion<u64>;

    /// Closes the backend connection.
    async fn quit(&mut self) -> Result<()>;
}
