//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Backend Error Enum ==
/// Failure reported by the key-value backend itself.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Error returned by the Redis client
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    /// Operation against a key holding the wrong kind of value
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// The connection handle was already closed
    #[error("Connection is closed")]
    Closed,

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid provider type, expiration value or other configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Identifier fragments could not be turned into a storage key
    #[error("Invalid key: {0}")]
    Key(String),

    /// Operation issued before `initialize`
    #[error("Cache provider is not initialized")]
    NotInitialized,

    /// Provider has no open backend connection
    #[error("No open connection to the backend")]
    NotConnected,

    /// Failure reported by the backend during a call
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Stored payload is not valid JSON (or not of the expected shape)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure wrapped with the lifecycle stage it happened in
    #[error("{stage}: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<CacheError>,
    },
}

impl CacheError {
    // == Stage Wrapping ==
    /// Prefixes the error with the lifecycle stage it happened in.
    pub fn in_stage(self, stage: &'static str) -> Self {
        CacheError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping stage wrappers.
    pub fn root(&self) -> &CacheError {
        match self {
            CacheError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

// == Result Type Aliases ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Reply delivered through an operation's completion channel.
///
/// Backend-reported failures (including undecodable payloads) travel here,
/// never through the error sink.
pub type Completion<T> = std::result::Result<T, CacheError>;

/// Result type used by backend implementations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
