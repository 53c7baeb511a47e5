//! Key-value storage for opaque session JSON.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session store is unavailable")]
    Unavailable,

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage for serialized session records.
pub trait SessionStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn read(
        &self,
        key: &str,
    ) -> Result<Option<String>, SessionStoreError>;

    fn write(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), SessionStoreError>;

    fn remove(
        &self,
        key: &str,
    ) -> Result<(), SessionStoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn read(
        &self,
        key: &str,
    ) -> Result<Option<String>, SessionStoreError> {
        (**self).read(key)
    }

    fn write(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), SessionStoreError> {
        (**self).write(key, value)
    }

    fn remove(
        &self,
        key: &str,
    ) -> Result<(), SessionStoreError> {
        (**self).remove(key)
    }
}

/// In-process store, for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(
        &self,
        key: &str,
    ) -> Result<Option<String>, SessionStoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SessionStoreError::Unavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn write(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SessionStoreError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(
        &self,
        key: &str,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SessionStoreError::Unavailable)?;
        entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(
        &self,
        key: &str,
    ) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn read(
        &self,
        key: &str,
    ) -> Result<Option<String>, SessionStoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SessionStoreError::Io { path, source }),
        }
    }

    fn write(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), SessionStoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SessionStoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|source| SessionStoreError::Io { path, source })
    }

    fn remove(
        &self,
        key: &str,
    ) -> Result<(), SessionStoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::Io { path, source }),
        }
    }
}
