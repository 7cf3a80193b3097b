//! Persisted key-value storage and the token store on top of it.
//!
//! The store plays the part browser local storage plays for the web UI:
//! a flat map of string keys to string values that survives restarts.
//! [`TokenStore`] is pure data access over two fixed keys; it holds no
//! session logic.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::StoreError;

/// Key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// A flat, persistent string-to-string map.
///
/// Methods take `&self`; implementations synchronise internally so one
/// store can be shared (via `Arc`) between the token store and other
/// preference stores.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
/// The maps here are always left in a consistent state between calls.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store. Nothing survives the process; useful for tests and
/// for hosts that must not write credentials to disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// A store persisted as one JSON object file.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the file exists but can't be read,
    /// [`StoreError::Corrupt`] if it isn't a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "file store opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    /// The in-memory map only changes if the file write succeeds.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = lock(&self.entries);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Access/refresh token persistence under fixed keys.
#[derive(Debug)]
pub struct TokenStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TokenStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn access(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Persists both tokens, or neither: if either write fails the
    /// previous pair is put back before the error is returned.
    pub fn set_pair(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        let previous = (self.access(), self.refresh());
        let result = self
            .store
            .set(ACCESS_TOKEN_KEY, access)
            .and_then(|()| self.store.set(REFRESH_TOKEN_KEY, refresh));
        if result.is_err() {
            self.restore(ACCESS_TOKEN_KEY, previous.0.as_deref());
            self.restore(REFRESH_TOKEN_KEY, previous.1.as_deref());
        }
        result
    }

    fn restore(&self, key: &str, value: Option<&str>) {
        let restored = match value {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };
        if let Err(e) = restored {
            tracing::warn!(key, error = %e, "could not restore previous token");
        }
    }

    /// Replaces only the access token.
    pub fn set_access(&self, access: &str) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, access)
    }

    /// Removes both tokens. Both removals are attempted even if the first
    /// fails; the first error is returned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }

    /// The underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }
}
