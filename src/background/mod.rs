//! Background broker: owns shortcut storage and answers messages.

mod validate;

pub use validate::{validate_shortcuts, ValidationError};

use crate::config;
use crate::messaging::{ChannelError, MessageChannel, Request, Response};
use crate::shortcut::{default_shortcuts, ShortcutDefinition};
use crate::storage::{KeyValueStore, StorageError};
use serde_json::Value;
use std::rc::Rc;

/// Why the install hook fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
    BrowserUpdate,
}

/// Answers `getShortcuts` / `saveShortcuts` against a store.
pub struct Background {
    store: Rc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background").finish_non_exhaustive()
    }
}

impl Background {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Seed the default shortcuts on a fresh install. Updates leave storage alone.
    pub fn on_installed(&self, reason: InstallReason) -> Result<(), StorageError> {
        if reason != InstallReason::Install {
            return Ok(());
        }

        let defaults = serde_json::to_value(default_shortcuts())?;
        self.store.set(config::SHORTCUTS_KEY, defaults)?;
        log::info!("Default shortcuts initialized");
        Ok(())
    }

    /// The stored list, or the defaults when storage is empty or failing.
    pub fn load_shortcuts(&self) -> Vec<ShortcutDefinition> {
        match self.store.get(config::SHORTCUTS_KEY) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(shortcuts) => shortcuts,
                Err(e) => {
                    log::warn!("Stored shortcuts are unreadable, using defaults: {}", e);
                    default_shortcuts()
                }
            },
            Ok(None) => default_shortcuts(),
            Err(e) => {
                log::warn!("Failed to read shortcuts, using defaults: {}", e);
                default_shortcuts()
            }
        }
    }

    pub fn get_shortcuts(&self) -> Response {
        Response::with_shortcuts(self.load_shortcuts())
    }

    /// Validate the whole list, then persist it. Nothing is written on error.
    pub fn save_shortcuts(&self, shortcuts: &Value) -> Response {
        let shortcuts = match validate_shortcuts(shortcuts) {
            Ok(shortcuts) => shortcuts,
            Err(e) => {
                log::warn!("Rejected shortcuts: {}", e);
                return Response::failure(e.to_string());
            }
        };

        let result = serde_json::to_value(&shortcuts)
            .map_err(StorageError::from)
            .and_then(|value| self.store.set(config::SHORTCUTS_KEY, value));

        match result {
            Ok(()) => {
                log::info!("Saved {} shortcuts", shortcuts.len());
                Response::ok()
            }
            Err(e) => {
                log::error!("Error saving shortcuts: {}", e);
                Response::failure(e.to_string())
            }
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        match request {
            Request::GetShortcuts => self.get_shortcuts(),
            Request::SaveShortcuts { shortcuts } => self.save_shortcuts(shortcuts),
        }
    }

    /// Handle an untyped message. Unknown or missing actions fail cleanly.
    pub fn handle_message(&self, message: &Value) -> Response {
        match message.get("action").and_then(Value::as_str) {
            Some("getShortcuts") => self.get_shortcuts(),
            Some("saveShortcuts") => {
                self.save_shortcuts(message.get("shortcuts").unwrap_or(&Value::Null))
            }
            action => {
                log::warn!("Unknown message action: {:?}", action);
                Response::failure("Unknown action")
            }
        }
    }
}

impl MessageChannel for Background {
    fn send(&self, request: &Request) -> Result<Response, ChannelError> {
        Ok(self.handle(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::KeyCombo;
    use crate::storage::{JsonFileStore, MemoryStore, StorageChange};
    use serde_json::json;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn set(&self, _key: &str, _value: Value) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn subscribe(&self, _callback: Box<dyn Fn(&StorageChange)>) {}
    }

    fn background() -> (Background, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        (Background::new(store.clone()), store)
    }

    #[test]
    fn test_install_seeds_defaults() {
        let (background, store) = background();
        background.on_installed(InstallReason::Install).unwrap();

        let stored = store.get(config::SHORTCUTS_KEY).unwrap().unwrap();
        assert_eq!(stored, serde_json::to_value(default_shortcuts()).unwrap());
    }

    #[test]
    fn test_update_leaves_storage() {
        let (background, store) = background();
        store.set(config::SHORTCUTS_KEY, json!([])).unwrap();
        background.on_installed(InstallReason::Update).unwrap();

        assert_eq!(store.get(config::SHORTCUTS_KEY).unwrap(), Some(json!([])));
    }

    #[test]
    fn test_get_defaults_when_empty() {
        let (background, _store) = background();
        let response = background.handle(&Request::GetShortcuts);
        assert!(response.success);
        assert_eq!(response.shortcuts, Some(default_shortcuts()));
    }

    #[test]
    fn test_get_keeps_stored_empty_list() {
        let (background, store) = background();
        store.set(config::SHORTCUTS_KEY, json!([])).unwrap();
        assert_eq!(background.get_shortcuts().shortcuts, Some(Vec::new()));
    }

    #[test]
    fn test_get_falls_back_when_storage_fails() {
        let background = Background::new(Rc::new(BrokenStore));
        let response = background.get_shortcuts();
        assert!(response.success);
        assert_eq!(response.shortcuts, Some(default_shortcuts()));
    }

    #[test]
    fn test_get_falls_back_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(config::STORAGE_FILE), r#"{"shortcuts": ["#).unwrap();

        let store = Rc::new(JsonFileStore::open(dir.path()).unwrap());
        let background = Background::new(store.clone());

        let response = background.get_shortcuts();
        assert!(response.success);
        assert_eq!(response.shortcuts, Some(default_shortcuts()));

        // The next save replaces the broken file
        assert!(background.save_shortcuts(&json!([])).success);
        assert_eq!(background.get_shortcuts().shortcuts, Some(Vec::new()));
        assert!(!store.is_unreadable());
    }

    #[test]
    fn test_save_then_get() {
        let (background, _store) = background();
        let keys = KeyCombo::new("g").with_alt();
        let shortcuts = vec![ShortcutDefinition::new(3, keys, "lang:rust")];

        let response = background.handle(&Request::save_shortcuts(&shortcuts).unwrap());
        assert_eq!(response, Response::ok());
        assert_eq!(background.get_shortcuts().shortcuts, Some(shortcuts));
    }

    #[test]
    fn test_invalid_save_writes_nothing() {
        let (background, store) = background();
        let response = background.save_shortcuts(&json!([{"id": 1}]));

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Shortcut must have keys object"));
        assert_eq!(store.get(config::SHORTCUTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_save_storage_failure() {
        let background = Background::new(Rc::new(BrokenStore));
        let response = background.save_shortcuts(&json!([]));
        assert!(!response.success);
        assert!(response.error.unwrap().contains("disk gone"));
    }

    #[test]
    fn test_raw_messages() {
        let (background, _store) = background();

        assert!(background.handle_message(&json!({"action": "getShortcuts"})).success);

        let response = background.handle_message(&json!({"action": "saveShortcuts"}));
        assert_eq!(response.error.as_deref(), Some("Shortcuts must be an array"));

        let response = background.handle_message(&json!({"action": "explode"}));
        assert_eq!(response, Response::failure("Unknown action"));

        let response = background.handle_message(&json!({}));
        assert_eq!(response, Response::failure("Unknown action"));
    }
}
