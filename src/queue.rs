//! The persistent FIFO queue.
//!
//! A queue owns its entries in memory and writes them back to its store on
//! [`Queue::save`]. Between saves the in-memory sequence is the source of
//! truth and the persisted copy may lag behind it.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Entry, Items};
use crate::storage::Store;

/// A named queue of opaque items backed by a [`Store`].
///
/// All operations are synchronous. A queue assumes it is the only writer for
/// its name: two instances bound to the same name and store do not
/// coordinate, and whichever calls `save` (or `replace`/`shift`) last
/// silently overwrites the other's persisted state.
pub struct Queue<S: Store> {
    name: String,
    store: S,
    entries: Vec<Entry>,
}

impl<S: Store> Queue<S> {
    /// Bind a queue to `name` and hydrate it from `store`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `name` is blank (no read is attempted), or
    /// whatever the store returns when reading fails.
    pub fn new(name: impl Into<String>, store: S) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "a queue must have a non-empty name".to_string(),
            ));
        }

        let entries = store.read(&name)?.unwrap_or_default();
        debug!(queue = %name, entries = entries.len(), "queue hydrated");

        Ok(Self {
            name,
            store,
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The wrapped entries, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Every item in insertion order, or `None` when the queue is empty.
    pub fn all(&self) -> Option<Vec<Value>> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().map(|e| e.item.clone()).collect())
    }

    /// The oldest item.
    pub fn first(&self) -> Option<&Value> {
        self.entries.first().map(|e| &e.item)
    }

    /// The newest item.
    pub fn last(&self) -> Option<&Value> {
        self.entries.last().map(|e| &e.item)
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Append one item, or several in order. Each gets a fresh id and
    /// timestamp. Does not persist; call [`Queue::save`] afterwards.
    ///
    /// A JSON array passed as a [`Value`] is split into one entry per
    /// element. Use [`Queue::add_one`] to keep an array as a single item.
    pub fn add(&mut self, items: impl Into<Items>) -> &mut Self {
        let items: Items = items.into();
        match items {
            Items::One(item) => self.add_one(item),
            Items::Many(items) => self.add_many(items),
        }
    }

    /// Append exactly one entry holding `item`.
    pub fn add_one(&mut self, item: Value) -> &mut Self {
        self.entries.push(Entry::new(item));
        self
    }

    /// Append one entry per element, preserving order.
    pub fn add_many(&mut self, items: impl IntoIterator<Item = Value>) -> &mut Self {
        self.entries.extend(items.into_iter().map(Entry::new));
        self
    }

    /// Discard every entry, re-add `items` as fresh entries, and save.
    ///
    /// Identity is not preserved: every entry gets a new id.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `items` is a single item rather than a sequence.
    /// Store failures propagate unchanged. In both cases the in-memory
    /// sequence is left exactly as it was, ids included.
    pub fn replace(&mut self, items: impl Into<Items>) -> Result<&mut Self> {
        let items: Items = items.into();
        let Items::Many(items) = items else {
            return Err(Error::InvalidArgument(
                "replace requires a sequence of items".to_string(),
            ));
        };

        debug!(queue = %self.name, entries = items.len(), "replacing queue contents");
        let previous = std::mem::take(&mut self.entries);
        self.add_many(items);
        if let Err(e) = self.save().map(|_| ()) {
            self.entries = previous;
            return Err(e);
        }
        Ok(self)
    }

    /// Remove and return the oldest item, persisting the result.
    ///
    /// Every remaining entry is re-added through [`Queue::replace`], so ids
    /// held from before the call are no longer valid afterwards. If the
    /// store write fails the head stays in place and nothing is returned.
    pub fn shift(&mut self) -> Result<Option<Value>> {
        let Some(head) = self.first().cloned() else {
            return Ok(None);
        };
        let rest: Vec<Value> = self.entries[1..].iter().map(|e| e.item.clone()).collect();

        self.replace(rest)?;
        debug!(queue = %self.name, remaining = self.entries.len(), "shifted head of queue");
        Ok(Some(head))
    }

    /// Write the full in-memory sequence to the store, overwriting whatever
    /// was persisted before.
    pub fn save(&mut self) -> Result<&mut Self> {
        self.store.write(&self.name, &self.entries)?;
        debug!(queue = %self.name, entries = self.entries.len(), "queue saved");
        Ok(self)
    }
}

impl<S: Store> std::fmt::Debug for Queue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
