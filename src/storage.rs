//! Storage providers.
//!
//! A provider is a named, durable slot holding one sequence of entries. The
//! queue reads it once on construction and overwrites it on every save. No
//! transactional guarantee spans a read and a later write.

pub mod file;
pub mod memory;
pub mod sqlite;

use std::rc::Rc;
use std::sync::Arc;

use crate::error::Result;
use crate::model::Entry;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Read/write contract a queue needs from its backing storage.
pub trait Store {
    /// Previously persisted sequence for `name`, or `None` if nothing was
    /// ever written under that name.
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>>;

    /// Replace whatever is persisted for `name`. Last write wins.
    fn write(&self, name: &str, entries: &[Entry]) -> Result<()>;
}

impl<S: Store + ?Sized> Store for &S {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        (**self).write(name, entries)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        (**self).write(name, entries)
    }
}

impl<S: Store + ?Sized> Store for Rc<S> {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        (**self).write(name, entries)
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        (**self).write(name, entries)
    }
}

// ---------------------------------------------------------------------------
// Encoding shared by the bundled providers
// ---------------------------------------------------------------------------

pub(crate) fn encode(entries: &[Entry]) -> Result<String> {
    Ok(serde_json::to_string(entries)?)
}

pub(crate) fn decode(text: &str) -> Result<Vec<Entry>> {
    Ok(serde_json::from_str(text)?)
}
