//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::storage::{FileStore, MemoryStore, SqliteStore, Store};

/// Which bundled provider backs the queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "file" => Ok(Backend::File),
            "memory" => Ok(Backend::Memory),
            other => Err(Error::Config(format!("unknown storage backend: {other}"))),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Backend::Sqlite => "sqlite",
            Backend::File => "file",
            Backend::Memory => "memory",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file, or directory of queue files for `Backend::File`.
    /// Unused (and optional) for `Backend::Memory`.
    pub store_path: Option<PathBuf>,
    pub backend: Backend,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let backend = match std::env::var("BEACONQ_BACKEND") {
            Ok(value) => value.parse::<Backend>()?,
            Err(_) => Backend::default(),
        };

        let store_path = match backend {
            Backend::Memory => std::env::var("BEACONQ_STORE_PATH").ok().map(PathBuf::from),
            Backend::Sqlite | Backend::File => {
                Some(PathBuf::from(required_var("BEACONQ_STORE_PATH")?))
            }
        };

        Ok(Self {
            store_path,
            backend,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build the configured provider.
    pub fn open_store(&self) -> Result<Box<dyn Store>> {
        let store: Box<dyn Store> = match self.backend {
            Backend::Sqlite => Box::new(SqliteStore::open(self.required_path()?)?),
            Backend::File => Box::new(FileStore::open(self.required_path()?)?),
            Backend::Memory => Box::new(MemoryStore::new()),
        };
        Ok(store)
    }

    fn required_path(&self) -> Result<&PathBuf> {
        self.store_path.as_ref().ok_or_else(|| {
            Error::Config(format!("the {} backend needs BEACONQ_STORE_PATH", self.backend))
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}
