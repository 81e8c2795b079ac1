//! Memory Backend Module
//!
//! In-process [`KvBackend`] used for tests, embedding and deterministic
//! expiration checks.

mod clock;
mod entry;
mod store;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{Connector, KvBackend};
use crate::config::ConnectionParams;
use crate::error::{BackendError, BackendResult};

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::MemoryStore;

// == Memory Backend ==
/// One connection handle over a [`MemoryStore`].
///
/// After `quit` every call fails with [`BackendError::Closed`]; the store
/// itself is untouched.
#[derive(Debug)]
pub struct MemoryBackend {
    store: MemoryStore,
    open: AtomicBool,
}

impl MemoryBackend {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            open: AtomicBool::new(true),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> BackendResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(BackendError::Closed)
        }
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        self.ensure_open()?;
        self.store.set(key, value, None).await;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> BackendResult<()> {
        self.ensure_open()?;
        self.store.set(key, value, Some(seconds)).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.ensure_open()?;
        self.store.get(key).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> BackendResult<bool> {
        self.ensure_open()?;
        Ok(self.store.expire(key, seconds).await)
    }

    async fn hset_all(&self, key: &str, fields: &[(String, String)]) -> BackendResult<()> {
        self.ensure_open()?;
        self.store.hset_all(key, fields).await
    }

    async fn hget_all(&self, key: &str) -> BackendResult<HashMap<String, String>> {
        self.ensure_open()?;
        self.store.hget_all(key).await
    }

    async fn del(&self, key: &str) -> BackendResult<u64> {
        self.ensure_open()?;
        Ok(self.store.del(key).await)
    }

    async fn quit(&self) -> BackendResult<()> {
        if self.open.swap(false, Ordering::AcqRel) {
            debug!("Closed in-process backend handle");
            Ok(())
        } else {
            Err(BackendError::Closed)
        }
    }
}

// == Memory Connector ==
/// Hands out [`MemoryBackend`] handles over one shared store.
///
/// Connection parameters are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: MemoryStore,
}

impl MemoryConnector {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// The store every handle operates on.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, _params: &ConnectionParams) -> BackendResult<Box<dyn KvBackend>> {
        Ok(Box::new(MemoryBackend::new(self.store.clone())))
    }
}
