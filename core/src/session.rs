//! Durable session-token storage.
//!
//! # Design
//! `KeyValueStorage` plays the role of the browser's local storage: a flat
//! string map that outlives a single request. `SessionStore` binds one key
//! of it to the session token. The token is written after login, read by
//! the request interceptor on every call, and erased on logout or on a
//! confirmed session expiry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::StorageError;

/// Flat string key-value storage.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file.
///
/// Every write rewrites the whole file; a missing file reads as empty.
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

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// The session token slot inside a `KeyValueStorage`.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Session store over fresh in-memory storage.
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), key)
    }

    /// The stored token. Empty values count as absent.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get(&self.key)?.filter(|t| !t.is_empty()))
    }

    pub fn store_token(&self, token: &str) -> Result<(), StorageError> {
        debug!(key = %self.key, "storing session token");
        self.storage.set(&self.key, token)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        debug!(key = %self.key, "clearing session token");
        self.storage.remove(&self.key)
    }

    /// Unreadable storage counts as logged out.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Outcome of a navigation guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Navigation guard: protected targets require a stored token, otherwise
/// the visitor is sent to the login page with the target as `redirect`.
pub fn route_guard(
    session: &SessionStore,
    login_path: &str,
    requires_auth: bool,
    target: &str,
) -> GuardDecision {
    if !requires_auth || session.is_authenticated() {
        return GuardDecision::Allow;
    }
    GuardDecision::Redirect(login_location(login_path, Some(target)))
}

/// Login page location, carrying the page to return to after login.
pub fn login_location(login_path: &str, return_path: Option<&str>) -> String {
    match return_path.filter(|p| !p.is_empty() && *p != login_path) {
        Some(path) => match serde_urlencoded::to_string([("redirect", path)]) {
            Ok(query) => format!("{login_path}?{query}"),
            Err(_) => login_path.to_string(),
        },
        None => login_path.to_string(),
    }
}
