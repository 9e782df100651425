//! Persistent key/value storage for the bearer token
//!
//! Mirrors the small surface of browser local storage: string keys, string
//! values, synchronous access. An absent token means "not logged in".

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::warn;

use crate::error::ApiError;

/// Synchronous string key/value store
pub trait TokenStorage: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<(), ApiError>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a single entry
    pub fn with_item(key: &str, value: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(key.to_string(), value.to_string());
        Self {
            items: RwLock::new(items),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        let items = self
            .items
            .read()
            .map_err(|_| ApiError::storage("memory storage lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| ApiError::storage("memory storage lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| ApiError::storage("memory storage lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object on disk
///
/// Every call re-reads the file so separate processes sharing the path see
/// each other's writes. Writes go to a sibling temp file that is renamed
/// over the target, and on Unix the file is only readable by its owner.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, ApiError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ApiError::storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&raw)?)
    }

    /// Like `load`, but a file that no longer parses is treated as empty so
    /// the next write replaces it.
    fn load_for_write(&self) -> Result<HashMap<String, String>, ApiError> {
        match self.load() {
            Err(ApiError::Serialization(e)) => {
                warn!("Discarding unreadable {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("storage"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn save(&self, items: &HashMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ApiError::storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let raw = serde_json::to_string_pretty(items)?;
        let temp = self.temp_path();

        write_private(&temp, raw.as_bytes()).map_err(|e| {
            ApiError::storage(format!("failed to write {}: {}", temp.display(), e))
        })?;

        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            ApiError::storage(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }
}

fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl TokenStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        let _guard = self
            .lock
            .read()
            .map_err(|_| ApiError::storage("file storage lock poisoned"))?;
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| ApiError::storage("file storage lock poisoned"))?;
        let mut items = self.load_for_write()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| ApiError::storage("file storage lock poisoned"))?;
        match self.load() {
            Ok(mut items) => {
                if items.remove(key).is_some() {
                    self.save(&items)?;
                }
                Ok(())
            }
            Err(ApiError::Serialization(e)) => {
                warn!("Discarding unreadable {}: {}", self.path.display(), e);
                self.save(&HashMap::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("token").unwrap(), None);

        storage.set_item("token", "abc").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), Some("abc".to_string()));

        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);

        // removing twice is fine
        storage.remove_item("token").unwrap();
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get_item("token").unwrap(), None);
        storage.set_item("token", "abc").unwrap();
        storage.set_item("theme", "dark").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("token").unwrap(), Some("abc".to_string()));

        reopened.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);
        assert_eq!(storage.get_item("theme").unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get_item("token"),
            Err(ApiError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_storage_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, r#"{"tok"#).unwrap();

        let storage = FileStorage::new(&path);
        storage.remove_item("token").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), None);

        fs::write(&path, r#"{"tok"#).unwrap();
        storage.set_item("token", "abc").unwrap();
        assert_eq!(storage.get_item("token").unwrap(), Some("abc".to_string()));

        // no temp file is left next to the target
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("storage.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set_item("token", "abc").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
