//! SQLite storage provider.
//!
//! One row per queue name. The entry sequence is stored as a JSON array so a
//! write is a single upsert.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::{Store, decode, encode};
use crate::error::Result;
use crate::model::Entry;

/// Durable provider. Owns the SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS queues (
                name        TEXT PRIMARY KEY,
                entries     TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    /// Names of every queue persisted in this database.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM queues ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

impl Store for SqliteStore {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT entries FROM queues WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        text.as_deref().map(decode).transpose()
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO queues (name, entries, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                entries = excluded.entries,
                updated_at = excluded.updated_at",
            params![name, encode(entries)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
