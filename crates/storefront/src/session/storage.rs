//! Durable key/value storage for the session.
//!
//! Only two keys are ever written: [`keys::TOKEN`] and [`keys::USER`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage keys for session data.
pub mod keys {
    /// Key for the raw bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-serialized logged-in user.
    pub const USER: &str = "user";
}

/// Errors from a [`SessionStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key/value storage that survives process restarts.
pub trait SessionStorage {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Write several values as one change: either all of them land or the
    /// previous values are put back.
    ///
    /// The default writes one key at a time and restores what it had
    /// overwritten on failure. Backends that can write everything at once
    /// should override it.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] hit while writing.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            let previous = self.get(key)?;
            if let Err(e) = self.set(key, value) {
                for (key, previous) in written.into_iter().rev() {
                    let _ = match previous {
                        Some(previous) => self.set(key, &previous),
                        None => self.remove(key),
                    };
                }
                return Err(e);
            }
            written.push((key, previous));
        }
        Ok(())
    }
}

/// In-memory storage, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A single JSON object file, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current values for a read-modify-write. A corrupt file is replaced
    /// rather than blocking every write after it.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt(_)) => Ok(BTreeMap::new()),
            other => other,
        }
    }

    fn store(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_all(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut values = match self.load() {
            Ok(values) => values,
            Err(StorageError::Corrupt(_)) => return self.store(&BTreeMap::new()),
            Err(e) => return Err(e),
        };
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.store(&values)
    }

    /// One rename, so the file never holds half of the entries.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut values = self.load_for_write()?;
        for &(key, value) in entries {
            values.insert(key.to_owned(), value.to_owned());
        }
        self.store(&values)
    }
}
