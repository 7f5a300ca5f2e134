//! Client-local persistence for chat state.
//!
//! [`Storage`] is a string key-value store with the semantics of browser local storage.
//! [`SessionStore`] owns one and knows the keys and JSON encodings of the chat history,
//! the session id and the widget flags. Storage failures are logged and absorbed; the
//! chat keeps working from memory.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use serde::{Serialize, de::DeserializeOwned};

use super::{ChatMessage, StorageError, message::generate_session_id};
use crate::{
    clock::Clock,
    constants::{STORAGE_MESSAGES, STORAGE_SESSION_ID},
};

/// A string key-value store.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn lock(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory [`Storage`]; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// [`Storage`] persisted as a JSON object in a single file.
///
/// The file is read once on open and rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the store at `path`. A missing file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| StorageError::Serialization {
                    key: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json =
            serde_json::to_string_pretty(entries).map_err(|e| StorageError::Serialization {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Typed access to the chat keys of a [`Storage`].
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Read and decode a JSON value, or `None` when absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to load {key} from storage: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to load {key} from storage: {e}");
                None
            }
        }
    }

    /// Encode and write a JSON value. Failures are logged, never returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|e| StorageError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })
            .and_then(|json| self.storage.set(key, &json));

        if let Err(e) = result {
            tracing::warn!("Failed to save {key} to storage: {e}");
        }
    }

    /// Persisted history with any stale loading placeholders dropped.
    ///
    /// Anything other than a JSON array of messages yields an empty history.
    pub fn load_messages(&self) -> Vec<ChatMessage> {
        self.load::<Vec<ChatMessage>>(STORAGE_MESSAGES)
            .unwrap_or_default()
            .into_iter()
            .filter(|m| !m.is_loading)
            .collect()
    }

    pub fn save_messages(&self, messages: &[ChatMessage]) {
        self.save(STORAGE_MESSAGES, messages);
    }

    pub fn load_session_id(&self) -> Option<String> {
        self.load::<String>(STORAGE_SESSION_ID)
            .filter(|id| !id.is_empty())
    }

    pub fn save_session_id(&self, session_id: &str) {
        self.save(STORAGE_SESSION_ID, session_id);
    }

    /// The stored session id, or a newly generated one that is persisted immediately.
    pub fn load_or_create_session_id(&self, clock: &dyn Clock) -> String {
        if let Some(id) = self.load_session_id() {
            return id;
        }
        let id = generate_session_id(clock);
        tracing::debug!(session_id = %id, "Created new chat session");
        self.save_session_id(&id);
        id
    }

    pub fn load_flag(&self, key: &str, default: bool) -> bool {
        self.load(key).unwrap_or(default)
    }

    pub fn save_flag(&self, key: &str, value: bool) {
        self.save(key, &value);
    }
}
