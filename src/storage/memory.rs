//! In-memory storage provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Store, decode, encode};
use crate::error::{Error, Result};
use crate::model::Entry;

/// Process-local provider keyed by queue name.
///
/// Values are kept as serialized JSON text, the same form the durable
/// providers persist. Clones share the same map, so two queues built from
/// clones of one store see each other's saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `name`, bypassing encoding. Used to seed corrupt
    /// or hand-written state.
    pub fn insert_raw(&self, name: impl Into<String>, text: impl Into<String>) -> Result<()> {
        self.lock()?.insert(name.into(), text.into());
        Ok(())
    }

    /// Raw persisted text for `name`, if any.
    pub fn raw(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|e| Error::Other(format!("memory store lock poisoned: {e}")))
    }
}

impl Store for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        let slots = self.lock()?;
        slots.get(name).map(|text| decode(text)).transpose()
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        let text = encode(entries)?;
        self.lock()?.insert(name.to_string(), text);
        Ok(())
    }
}
