//! File-per-queue storage provider.
//!
//! Each queue lives in `<dir>/<name>.json`. Writes land in a temporary
//! sibling first and are renamed into place, so a reader never sees a
//! half-written file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Store, decode, encode};
use crate::error::{Error, Result};
use crate::model::Entry;

/// Durable provider backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` for queue files, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `name`. Names that could escape the directory are
    /// rejected.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name.contains("..")
            || name.contains(['/', '\\'])
            || name.contains('\0')
        {
            return Err(Error::InvalidArgument(format!(
                "queue name {name:?} cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl Store for FileStore {
    fn read(&self, name: &str) -> Result<Option<Vec<Entry>>> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(text) => decode(&text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, entries: &[Entry]) -> Result<()> {
        let path = self.path_for(name)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, encode(entries)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
