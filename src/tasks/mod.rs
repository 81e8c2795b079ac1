//! Background Tasks Module
//!
//! # Tasks
//! - Expiration sweep: purges expired entries from the in-process store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
