//! # beacon-queue
//!
//! Persistent, append-ordered queue for buffering outbound tracking payloads.
//!
//! Items are wrapped in entries, kept in FIFO order in memory, and written to
//! a pluggable [`storage::Store`] so they survive a restart or a failed send.

pub mod config;
pub mod error;
pub mod model;
pub mod queue;
pub mod storage;
pub mod telemetry;

pub use error::{Error, Result};
pub use model::{Entry, EntryId, Items};
pub use queue::Queue;
pub use storage::Store;
