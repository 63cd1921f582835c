//! Token file used as the CLI's durable storage.
//!
//! The file holds a flat JSON object of key/value strings. Writes are
//! best-effort like browser storage: failures are logged and forgotten.

#[cfg(test)]
#[path = "file_storage_test.rs"]
mod file_storage_test;

use std::fs;
use std::path::{Path, PathBuf};

use portal::storage::Storage;
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Map<String, Value> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable token file");
                Map::new()
            }
        }
    }

    fn write(&self, map: &Map<String, Value>) {
        if map.is_empty() {
            if let Err(e) = fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to remove token file");
                }
            }
            return;
        }
        let body = Value::Object(map.clone()).to_string();
        if let Err(e) = fs::write(&self.path, body) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write token file");
            return;
        }
        restrict_permissions(&self.path);
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).and_then(Value::as_str).map(str::to_owned)
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read();
        map.insert(key.to_owned(), Value::String(value.to_owned()));
        self.write(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.read();
        if map.remove(key).is_some() {
            self.write(&map);
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::debug!(path = %path.display(), error = %e, "could not restrict token file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
