//! Key/value storage seams for the bearer token and the mid-flow email.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser plugs in `localStorage` (durable) and `sessionStorage`
//! (tab-scoped); the CLI plugs in a token file and process memory. The core
//! only ever holds two kinds of value: one bearer token and one email per
//! in-progress OTP flow.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A string key/value store.
///
/// Writes are best-effort: a browser with storage disabled simply forgets.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-memory storage. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Durable slot holding the bearer token.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Stored token, ignoring blank values.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.storage.get(&self.key).filter(|t| !t.trim().is_empty())
    }

    pub fn set(&self, token: &str) {
        self.storage.set(&self.key, token);
    }

    pub fn clear(&self) {
        self.storage.remove(&self.key);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Volatile slot holding the email of an in-progress OTP challenge.
#[derive(Clone)]
pub struct EmailCache {
    storage: Arc<dyn Storage>,
    key: String,
}

impl EmailCache {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.storage
            .get(&self.key)
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
    }

    pub fn set(&self, email: &str) {
        self.storage.set(&self.key, email);
    }

    pub fn clear(&self) {
        self.storage.remove(&self.key);
    }
}

impl std::fmt::Debug for EmailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCache").field("key", &self.key).finish_non_exhaustive()
    }
}
