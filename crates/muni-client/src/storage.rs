//! Persistent key/value storage backing the session.
//!
//! Mirrors the browser storage the web front end used: flat string keys,
//! string values, survives restarts when file-backed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, Result};

pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Older builds stored the token under this name; logout clears it too.
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const CHAT_SESSION_KEY: &str = "chatbot_session_id";
pub const CHAT_MESSAGES_KEY: &str = "chatbot_messages";
pub const CHAT_USER_KEY: &str = "chatbot_user";

/// Chat state tied to whoever was logged in last
pub const CHAT_KEYS: &[&str] = &[CHAT_SESSION_KEY, CHAT_MESSAGES_KEY, CHAT_USER_KEY];

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// JSON object on disk, rewritten through a temp file on every change.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ClientError::Storage(format!(
                    "failed to parse {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ClientError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ClientError::Storage(format!("failed to write {}: {}", self.path.display(), e))
            })
    }

    fn modify(&self, f: impl FnOnce(&mut HashMap<String, String>) -> bool) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClientError::Storage("file storage lock poisoned".to_string()))?;
        let mut entries = self.read_all()?;
        if f(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|entries| entries.remove(key).is_some())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.modify(|entries| {
            let mut changed = false;
            for key in keys {
                changed |= entries.remove(*key).is_some();
            }
            changed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        storage.set(AUTH_TOKEN_KEY, "abc").unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        storage.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::new(&path);
        storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();
        storage.set(CHAT_SESSION_KEY, "chat-9").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));

        reopened.remove_many(&[AUTH_TOKEN_KEY, CHAT_SESSION_KEY]).unwrap();
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(CHAT_SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        // Removing from a missing file does not create it
        storage.remove(AUTH_TOKEN_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get(AUTH_TOKEN_KEY),
            Err(ClientError::Storage(_))
        ));
    }
}
