//! Durable storage for the user's collections.
//!
//! Each collection lives under a fixed key.  Reads never fail: a missing or
//! corrupt entry yields the caller's default.  Writes replace the whole value.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Favorites,
    Playlists,
}

impl StoreKey {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Favorites => "favorites.json",
            Self::Playlists => "playlists.json",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Favorites => write!(f, "favorites"),
            Self::Playlists => write!(f, "playlists"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode {key}: {source}")]
    Encode {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key} storage is read-only")]
    ReadOnly { key: StoreKey },
}

pub trait CollectionStore {
    /// The stored value for `key`, or `default` when absent or undecodable.
    fn load<T: DeserializeOwned>(&self, key: StoreKey, default: T) -> T;

    /// Replace the stored value for `key`.  Returns once the value is durable.
    fn save<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError>;
}

/// One pretty-printed JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl CollectionStore for JsonFileStore {
    fn load<T: DeserializeOwned>(&self, key: StoreKey, default: T) -> T {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
            Err(e) => {
                warn!("store: could not read {}: {}", path.display(), e);
                return default;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("store: {} is corrupt, starting fresh: {}", path.display(), e);
                default
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(key);
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode { key, source })?;
        std::fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("store: wrote {}", path.display());
        Ok(())
    }
}

/// Keeps serialized values in memory.  Used when the data directory is
/// unavailable, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<StoreKey, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Seed `key` with raw text, bypassing serialization.
    pub fn with_raw(mut self, key: StoreKey, raw: impl Into<String>) -> Self {
        self.entries.insert(key, raw.into());
        self
    }

    pub fn raw(&self, key: StoreKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }
}

impl CollectionStore for MemoryStore {
    fn load<T: DeserializeOwned>(&self, key: StoreKey, default: T) -> T {
        match self.entries.get(&key) {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("store: {} is corrupt, starting fresh: {}", key, e);
                default
            }),
            None => default,
        }
    }

    fn save<T: Serialize>(&mut self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly { key });
        }
        let json = serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;
        self.entries.insert(key, json);
        Ok(())
    }
}
