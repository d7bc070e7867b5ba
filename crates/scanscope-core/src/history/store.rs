/// Backing stores for the scan ledger.
///
/// The ledger is stored as one JSON document under a fixed key. On disk that
/// key is the file name [`HISTORY_FILE_NAME`] inside the data directory.
use crate::{CoreError, Result};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name of the persisted ledger inside the data directory.
pub const HISTORY_FILE_NAME: &str = "scan-history.json";

/// Raw storage for the serialised ledger.
pub trait HistoryStore {
    /// Return the stored document, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored document.
    fn write(&self, data: &str) -> Result<()>;
}

/// Ledger persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `dir/scan-history.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::io(&self.path, e)),
        }
    }

    /// Written to a temp file and renamed over the target so a crash never
    /// leaves a half-written ledger behind.
    fn write(&self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| CoreError::io(&temp_path, e))?;
        file.write_all(data.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| CoreError::io(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| CoreError::io(&self.path, e))?;
        Ok(())
    }
}

/// In-process store. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `data`.
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Arc::new(Mutex::new(Some(data.into()))),
        }
    }

    /// Current contents, for inspection.
    pub fn contents(&self) -> Option<String> {
        self.data.lock().clone()
    }
}

impl HistoryStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.data.lock().clone())
    }

    fn write(&self, data: &str) -> Result<()> {
        *self.data.lock() = Some(data.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(tmp.path());
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn write_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(&tmp.path().join("nested").join("dir"));
        store.write("[]").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("[]"));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.write("[1]").unwrap();
        assert_eq!(view.contents().as_deref(), Some("[1]"));
    }
}
