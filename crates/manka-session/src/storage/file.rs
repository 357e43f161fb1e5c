//! JSON file key/value storage.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use manka_core::{KeyValueStore, StorageError};

/// File name used under the platform data directory.
const DEFAULT_FILE: &str = "session.json";

/// Directory name used under the platform data directory.
const APP_DIR: &str = "manka";

/// Storage backed by a single JSON object on disk.
///
/// The whole file is rewritten on every change; values survive restarts.
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "opened session store");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Open the store at [`FileStore::default_path`].
    ///
    /// # Errors
    /// Returns error if no data directory exists or the file cannot be read.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = Self::default_path()
            .ok_or_else(|| StorageError::Internal("no data directory available".to_string()))?;
        Self::open(path)
    }

    /// `<data_dir>/manka/session.json`, if the platform has a data directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_DIR).join(DEFAULT_FILE))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file written before being renamed over [`FileStore::path`].
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".tmp.{}", std::process::id()));
        PathBuf::from(name)
    }

    // Write then rename, so a crash mid-write never leaves a truncated file.
    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(values)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .values
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
