use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::utils::StorageError;

/// String key/value storage that survives between runs
///
/// Multi-entry writes and removals must land together: a reader never sees
/// half of a `write_all` call.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// In-process storage, used for tests and ephemeral clients
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Storage backed by a single TOML table on disk
///
/// Every mutation rewrites the whole table through a temporary file and a
/// rename, so the entries change together.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load_table(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| StorageError::Format(e.to_string()))
    }

    fn store_table(&self, table: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if table.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(table).map_err(|e| StorageError::Format(e.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        write_owner_only(&tmp, &content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Write a file only its owner can read; the table holds a bearer token
fn write_owner_only(path: &Path, content: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // A leftover temp file keeps its old mode when reopened
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content.as_bytes())?;
    file.sync_all()
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load_table()?.remove(key))
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut table = self.load_table().unwrap_or_default();
        for (key, value) in entries {
            table.insert((*key).to_string(), (*value).to_string());
        }
        self.store_table(&table)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        // An unreadable file holds nothing worth keeping
        let mut table = self.load_table().unwrap_or_default();
        for key in keys {
            table.remove(*key);
        }
        self.store_table(&table)
    }
}
