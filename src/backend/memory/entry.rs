//! Store Entry Module
//!
//! Defines the structure for individual store entries with expiration support.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

// == Stored Data ==
/// The two value kinds the store knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredData {
    Str(String),
    Hash(HashMap<String, String>),
}

// == Store Entry ==
/// A single store entry with value and metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub data: StoredData,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry without expiration.
    pub fn new(data: StoredData) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    // == Expire ==
    /// Sets the entry to expire `seconds` after `now`.
    ///
    /// A delay too large to represent leaves the entry without expiration.
    pub fn expire_in(&mut self, seconds: u64, now: DateTime<Utc>) {
        self.expires_at = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once `now` reaches the expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = (expires - now).num_seconds();
            u64::try_from(remaining).unwrap_or(0)
        })
    }
}
