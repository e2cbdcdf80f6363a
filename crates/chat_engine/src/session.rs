//! Durable key-value storage and the per-profile session identifier.
//!
//! The session id is created lazily the first time it is needed, stored under
//! [`SESSION_KEY`] and reused on every later run. It is never rotated.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chat_logging::{chat_info, chat_warn};
use thiserror::Error;
use uuid::Uuid;

use crate::persist::{AtomicFileWriter, PersistError};

pub const SESSION_KEY: &str = "session_id";

const STORE_FILENAME: &str = "storage.ron";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize store: {0}")]
    Serialize(String),
}

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A RON map in `{dir}/storage.ron`, rewritten atomically on every `set`.
pub struct FileKeyValueStore {
    writer: AtomicFileWriter,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(STORE_FILENAME)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let Some(content) = self.writer.read(STORE_FILENAME)? else {
            return Ok(BTreeMap::new());
        };
        ron::from_str(&content).map_err(|err| StoreError::Parse {
            path: self.path(),
            message: err.to_string(),
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                chat_warn!("Replacing unreadable key-value store: {}", err);
                BTreeMap::new()
            }
        };
        entries.insert(key.to_string(), value.to_string());
        let content = ron::ser::to_string_pretty(&entries, ron::ser::PrettyConfig::new())
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.writer.write(STORE_FILENAME, &content)?;
        Ok(())
    }
}

/// Hands out the session id, creating and persisting it on first use.
pub struct SessionIdProvider {
    store: Box<dyn KeyValueStore>,
    cached: Option<String>,
}

impl SessionIdProvider {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cached: None,
        }
    }

    /// Never fails: storage problems are logged and a fresh id is used for
    /// this run.
    pub fn session_id(&mut self) -> String {
        if let Some(id) = &self.cached {
            return id.clone();
        }

        let id = match self.store.get(SESSION_KEY) {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => self.create(),
            Err(err) => {
                chat_warn!("Failed to read session id: {}", err);
                self.create()
            }
        };
        self.cached = Some(id.clone());
        id
    }

    fn create(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        match self.store.set(SESSION_KEY, &id) {
            Ok(()) => chat_info!("Created new session id"),
            Err(err) => chat_warn!("Failed to persist new session id: {}", err),
        }
        id
    }
}
