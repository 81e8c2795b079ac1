//! Error Reporting Module
//!
//! The error sink capability and the swallow-or-return policy shared by the
//! facade and the provider.

use std::sync::Arc;

use tracing::error;

use crate::error::{CacheError, Result};

// == Error Sink ==
/// Collaborator that records errors instead of raising them to the caller.
pub trait ErrorSink: Send + Sync {
    /// Records the diagnostic detail of a failure.
    fn error(&self, detail: &str);
}

/// Error sink that forwards every report to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn error(&self, detail: &str) {
        error!(target: "keyed_cache", "{}", detail);
    }
}

// == Error Policy ==
/// Decides what happens to a precondition or lifecycle failure.
///
/// With a sink the failure is reported and swallowed; without one it is
/// handed back to the caller.
#[derive(Clone, Default)]
pub struct ErrorPolicy {
    sink: Option<Arc<dyn ErrorSink>>,
}

impl ErrorPolicy {
    pub fn new(sink: Option<Arc<dyn ErrorSink>>) -> Self {
        Self { sink }
    }

    /// Returns true if failures are swallowed by a sink.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    // == Absorb ==
    /// Reports `err` to the sink and returns `Ok(())`, or returns `Err(err)`
    /// when no sink is configured.
    pub fn absorb(&self, err: CacheError) -> Result<()> {
        match &self.sink {
            Some(sink) => {
                sink.error(&diagnostic(err));
                Ok(())
            }
            None => Err(err),
        }
    }
}

impl std::fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

// == Diagnostic Rendering ==
/// Renders the error with its cause chain, plus a backtrace when capture is
/// enabled through `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
pub fn diagnostic(err: CacheError) -> String {
    format!("{:?}", anyhow::Error::new(err))
}
