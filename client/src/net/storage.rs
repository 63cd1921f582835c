//! `localStorage` / `sessionStorage` behind the core `Storage` trait.
//!
//! Each call looks the storage object up again instead of holding a
//! `web_sys::Storage`, which keeps these types `Send + Sync`. Outside the
//! browser build every read misses and every write is dropped.

use portal::storage::Storage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Area {
    Local,
    Session,
}

#[cfg(feature = "csr")]
fn storage_for(area: Area) -> Option<web_sys::Storage> {
    let window = web_sys::window()?;
    let storage = match area {
        Area::Local => window.local_storage(),
        Area::Session => window.session_storage(),
    };
    storage.ok().flatten()
}

fn get(area: Area, key: &str) -> Option<String> {
    #[cfg(feature = "csr")]
    {
        storage_for(area)?.get_item(key).ok().flatten()
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (area, key);
        None
    }
}

fn set(area: Area, key: &str, value: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(storage) = storage_for(area) {
            let _ = storage.set_item(key, value);
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (area, key, value);
    }
}

fn remove(area: Area, key: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(storage) = storage_for(area) {
            let _ = storage.remove_item(key);
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (area, key);
    }
}

/// Durable storage: survives reloads and browser restarts. Holds the token.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        get(Area::Local, key)
    }

    fn set(&self, key: &str, value: &str) {
        set(Area::Local, key, value);
    }

    fn remove(&self, key: &str) {
        remove(Area::Local, key);
    }
}

/// Tab-scoped storage: survives reloads, not new tabs. Holds mid-flow emails.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionStorage;

impl Storage for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        get(Area::Session, key)
    }

    fn set(&self, key: &str, value: &str) {
        set(Area::Session, key, value);
    }

    fn remove(&self, key: &str) {
        remove(Area::Session, key);
    }
}
