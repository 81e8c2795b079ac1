//! Backend Module
//!
//! The wire-level capability the provider needs from a key-value store,
//! and the connectors that open it.
//!
//! # Implementations
//! - [`RedisBackend`]: Redis server over a multiplexed tokio connection
//! - [`MemoryBackend`]: in-process store with the same semantics

pub mod memory;
mod redis;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::ConnectionParams;
use crate::error::BackendResult;

pub use self::memory::{Clock, ManualClock, MemoryBackend, MemoryConnector, MemoryStore, SystemClock};
pub use self::redis::{RedisBackend, RedisConnector};

// == Key-Value Backend ==
/// String and hash operations with key expiration.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// SET: stores a string, clearing any previous expiration.
    async fn set(&self, key: &str, value: &str) -> BackendResult<()>;

    /// SET with EX: stores a string that expires after `seconds`.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> BackendResult<()>;

    /// GET: `None` when the key is absent.
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// EXPIRE: returns false when the key does not exist.
    async fn expire(&self, key: &str, seconds: u64) -> BackendResult<bool>;

    /// HSET with every given field/value pair.
    async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> BackendResult<()>;

    /// HGETALL: empty map when the key is absent.
    async fn hget_all(&self, key: &str) -> BackendResult<HashMap<String, String>>;

    /// DEL: number of keys removed.
    async fn del(&self, key: &str) -> BackendResult<u64>;

    /// QUIT: closes the connection.
    async fn quit(&self) -> BackendResult<()>;
}

// == Connector ==
/// Opens a backend connection from connection parameters.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, params: &ConnectionParams) -> BackendResult<Box<dyn KvBackend>>;
}
