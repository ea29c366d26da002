//! Key-value storage with change notifications.
//!
//! Values are plain JSON. The shortcut list lives under
//! [`config::SHORTCUTS_KEY`](crate::config::SHORTCUTS_KEY).

use crate::config;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Errors from a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A value that was written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<Value>,
}

type ChangeCallback = Rc<dyn Fn(&StorageChange)>;

/// Storage backend shared by the background broker and its listeners.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Register a callback run after every successful write.
    fn subscribe(&self, callback: Box<dyn Fn(&StorageChange)>);
}

/// Change listeners for a store.
#[derive(Default)]
struct Subscribers {
    callbacks: RefCell<Vec<ChangeCallback>>,
}

impl Subscribers {
    fn add(&self, callback: Box<dyn Fn(&StorageChange)>) {
        self.callbacks.borrow_mut().push(Rc::from(callback));
    }

    fn notify(&self, change: &StorageChange) {
        // Clone the list so a callback may subscribe or write without a double borrow
        let callbacks: Vec<ChangeCallback> = self.callbacks.borrow().clone();
        for callback in callbacks {
            callback(change);
        }
    }
}

/// In-memory store, used for embedding and tests.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<Map<String, Value>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.borrow_mut().insert(key.to_string(), value.clone());
        self.subscribers.notify(&StorageChange {
            key: key.to_string(),
            new_value: Some(value),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.values.borrow_mut().remove(key);
        if removed.is_some() {
            self.subscribers.notify(&StorageChange {
                key: key.to_string(),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self, callback: Box<dyn Fn(&StorageChange)>) {
        self.subscribers.add(callback);
    }
}

/// Store persisted as a single JSON object file.
///
/// A file that cannot be read as a JSON object leaves the store unreadable:
/// `get` fails until the next write replaces the file.
pub struct JsonFileStore {
    path: PathBuf,
    values: RefCell<Map<String, Value>>,
    unreadable: RefCell<Option<String>>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonFileStore {
    /// Open (or create) the store in a data directory
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(config::STORAGE_FILE);

        let (values, unreadable) = if path.exists() {
            match load_file(&path) {
                Ok(values) => (values, None),
                Err(e) => {
                    log::warn!(
                        "Storage at {:?} is unreadable, it will be replaced on save: {}",
                        path,
                        e
                    );
                    (Map::new(), Some(e.to_string()))
                }
            }
        } else {
            (Map::new(), None)
        };

        log::info!("Storage opened at {:?} ({} keys)", path, values.len());

        Ok(Self {
            path,
            values: RefCell::new(values),
            unreadable: RefCell::new(unreadable),
            subscribers: Subscribers::default(),
        })
    }

    /// Whether the file on disk could not be loaded and has not been rewritten since
    pub fn is_unreadable(&self) -> bool {
        self.unreadable.borrow().is_some()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &Map<String, Value>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, contents)?;
        log::debug!("Storage written to {:?}", self.path);
        Ok(())
    }

    /// Write `values` and make them current
    fn commit(&self, values: Map<String, Value>) -> Result<(), StorageError> {
        self.flush(&values)?;
        *self.values.borrow_mut() = values;
        self.unreadable.borrow_mut().take();
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<Map<String, Value>, StorageError> {
    let contents = fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        _ => Err(StorageError::Unavailable(format!(
            "{:?} does not hold a JSON object",
            path
        ))),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        if let Some(reason) = self.unreadable.borrow().as_ref() {
            return Err(StorageError::Unavailable(reason.clone()));
        }
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        // Only commit to memory once the file write succeeded
        let mut updated = self.values.borrow().clone();
        updated.insert(key.to_string(), value.clone());
        self.commit(updated)?;

        self.subscribers.notify(&StorageChange {
            key: key.to_string(),
            new_value: Some(value),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut updated = self.values.borrow().clone();
        if updated.remove(key).is_none() {
            return Ok(());
        }
        self.commit(updated)?;

        self.subscribers.notify(&StorageChange {
            key: key.to_string(),
            new_value: None,
        });
        Ok(())
    }

    fn subscribe(&self, callback: Box<dyn Fn(&StorageChange)>) {
        self.subscribers.add(callback);
    }
}
