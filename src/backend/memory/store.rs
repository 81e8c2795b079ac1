//! Memory Store Module
//!
//! In-process key-value store with string and hash entries and per-key
//! expiration, following the Redis semantics the provider relies on.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::clock::{Clock, SystemClock};
use super::entry::{StoreEntry, StoredData};
use crate::error::{BackendError, BackendResult};

// == Memory Store ==
/// Shared in-process store. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    // == Set ==
    /// Stores a string, replacing any value and clearing its expiration.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) {
        let now = self.clock.now();
        let mut entry = StoreEntry::new(StoredData::Str(value.to_string()));
        if let Some(seconds) = ttl {
            entry.expire_in(seconds, now);
        }
        self.entries.write().await.insert(key.to_string(), entry);
    }

    // == Get ==
    /// Retrieves a string by key. Expired entries are removed and read as absent.
    pub async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        match self.live(key).await? {
            Some(StoredData::Str(value)) => Ok(Some(value)),
            Some(StoredData::Hash(_)) => Err(BackendError::WrongType),
            None => Ok(None),
        }
    }

    // == Expire ==
    /// Sets the expiration of an existing key. Returns false if it is absent.
    pub async fn expire(&self, key: &str, seconds: u64) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expire_in(seconds, now);
                true
            }
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    // == Hash Set ==
    /// Merges fields into the hash at `key`, creating it if needed.
    ///
    /// An existing expiration is kept.
    pub async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> BackendResult<()> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| StoreEntry::new(StoredData::Hash(HashMap::new())));

        match &mut entry.data {
            StoredData::Hash(hash) => {
                hash.extend(fields.iter().cloned());
                Ok(())
            }
            StoredData::Str(_) => Err(BackendError::WrongType),
        }
    }

    // == Hash Get All ==
    /// Returns every field of the hash at `key`, or an empty map.
    pub async fn hget_all(&self, key: &str) -> BackendResult<HashMap<String, String>> {
        match self.live(key).await? {
            Some(StoredData::Hash(hash)) => Ok(hash),
            Some(StoredData::Str(_)) => Err(BackendError::WrongType),
            None => Ok(HashMap::new()),
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns the number of keys removed.
    pub async fn del(&self, key: &str) -> u64 {
        let now = self.clock.now();
        match self.entries.write().await.remove(key) {
            Some(entry) if !entry.is_expired(now) => 1,
            _ => 0,
        }
    }

    // == Time To Live ==
    /// Remaining TTL in seconds; None if the key is absent or has no expiration.
    pub async fn ttl(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    /// Returns true if a live entry exists at `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reads a live entry's data, dropping it first if it has expired.
    async fn live(&self, key: &str) -> BackendResult<Option<StoredData>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.data.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}
