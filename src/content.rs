//! Page-side controller: turns key presses into search URL rewrites.

use crate::config;
use crate::input_gate::{is_eligible_target, FocusedElement};
use crate::messaging::{send_or_failure, MessageChannel, Request};
use crate::rewrite::{build_rewritten_url, Rewrite, RewriteError};
use crate::search_engine;
use crate::shortcut::{find_match, KeyEvent, ShortcutDefinition};
use crate::storage::{KeyValueStore, StorageChange};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// What the page should do with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Let the page handle the key normally.
    Ignored,
    /// A shortcut fired but the term is already in the query.
    Unchanged,
    /// A shortcut fired; load this URL.
    Navigate(Url),
}

impl KeyOutcome {
    /// Whether the browser's default handling must be suppressed
    pub fn prevents_default(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

/// Holds the working copy of the shortcut list for one page.
#[derive(Debug, Default)]
pub struct ContentScript {
    shortcuts: Vec<ShortcutDefinition>,
    listening: bool,
}

impl ContentScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch shortcuts from the broker and start listening.
    ///
    /// On failure the page keeps working without shortcuts.
    pub fn initialize(&mut self, channel: &dyn MessageChannel) -> bool {
        let response = send_or_failure(channel, &Request::GetShortcuts);
        if !response.success {
            log::debug!("Shortcuts unavailable: {:?}", response.error);
            return false;
        }

        self.shortcuts = response.shortcuts.unwrap_or_default();
        self.listening = true;
        log::debug!("Content script listening with {} shortcuts", self.shortcuts.len());
        true
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn shortcuts(&self) -> &[ShortcutDefinition] {
        &self.shortcuts
    }

    /// Swap in a new list wholesale
    pub fn replace_shortcuts(&mut self, shortcuts: Vec<ShortcutDefinition>) {
        self.shortcuts = shortcuts;
    }

    /// Apply a storage change. A removed or unreadable list becomes empty.
    pub fn on_storage_change(&mut self, change: &StorageChange) {
        if change.key != config::SHORTCUTS_KEY {
            return;
        }

        let shortcuts = match &change.new_value {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable shortcut update: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.replace_shortcuts(shortcuts);
    }

    /// Keep a shared controller in sync with a store.
    pub fn watch(script: &Rc<RefCell<ContentScript>>, store: &dyn KeyValueStore) {
        let script = Rc::clone(script);
        store.subscribe(Box::new(move |change| {
            script.borrow_mut().on_storage_change(change);
        }));
    }

    /// Decide what a key press on `current_url` should do.
    pub fn handle_keydown(
        &self,
        event: &KeyEvent,
        focused: Option<&FocusedElement>,
        current_url: &str,
    ) -> Result<KeyOutcome, RewriteError> {
        if !self.listening || !is_eligible_target(focused) {
            return Ok(KeyOutcome::Ignored);
        }

        let Some(shortcut) = find_match(event, &self.shortcuts) else {
            return Ok(KeyOutcome::Ignored);
        };

        let Some(engine) = search_engine::detect(current_url) else {
            return Ok(KeyOutcome::Ignored);
        };

        log::debug!(
            "Shortcut {} ({}) on {}: appending {:?}",
            shortcut.id,
            shortcut.keys,
            engine.name,
            shortcut.term
        );

        match build_rewritten_url(current_url, engine.query_param, &shortcut.term)? {
            Rewrite::Unchanged => Ok(KeyOutcome::Unchanged),
            Rewrite::Navigate(url) => Ok(KeyOutcome::Navigate(url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::messaging::{ChannelError, Response};
    use crate::shortcut::KeyCombo;
    use crate::storage::MemoryStore;
    use serde_json::json;

    struct Unreachable;

    impl MessageChannel for Unreachable {
        fn send(&self, _request: &Request) -> Result<Response, ChannelError> {
            Err(ChannelError::Closed("extension context invalidated".into()))
        }
    }

    fn listening() -> ContentScript {
        let background = Background::new(Rc::new(MemoryStore::new()));
        let mut script = ContentScript::new();
        assert!(script.initialize(&background));
        script
    }

    fn reddit_press() -> KeyEvent {
        KeyEvent::new("e").meta().shift()
    }

    #[test]
    fn test_navigates_on_match() {
        let script = listening();
        let outcome = script
            .handle_keydown(&reddit_press(), None, "https://www.google.com/search?q=rust")
            .unwrap();

        match outcome {
            KeyOutcome::Navigate(url) => {
                assert_eq!(url.as_str(), "https://www.google.com/search?q=rust+site%3Areddit.com")
            }
            other => panic!("Expected navigation, got {:?}", other),
        }
    }

    #[test]
    fn test_already_present_still_consumes_key() {
        let script = listening();
        let outcome = script
            .handle_keydown(
                &reddit_press(),
                None,
                "https://www.google.com/search?q=rust+site%3Areddit.com",
            )
            .unwrap();

        assert_eq!(outcome, KeyOutcome::Unchanged);
        assert!(outcome.prevents_default());
    }

    #[test]
    fn test_ignored_off_search_engine() {
        let script = listening();
        let outcome = script
            .handle_keydown(&reddit_press(), None, "https://example.com/?q=rust")
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert!(!outcome.prevents_default());
    }

    #[test]
    fn test_ignored_in_unrelated_field() {
        let script = listening();
        let field = FocusedElement::new("INPUT").with_name("comment");
        let outcome = script
            .handle_keydown(&reddit_press(), Some(&field), "https://www.bing.com/search?q=rust")
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);

        let search = FocusedElement::new("TEXTAREA").with_name("q");
        let outcome = script
            .handle_keydown(&reddit_press(), Some(&search), "https://www.bing.com/search?q=rust")
            .unwrap();
        assert!(matches!(outcome, KeyOutcome::Navigate(_)));
    }

    #[test]
    fn test_not_listening_after_failed_init() {
        let mut script = ContentScript::new();
        assert!(!script.initialize(&Unreachable));
        assert!(!script.is_listening());

        let outcome = script
            .handle_keydown(&reddit_press(), None, "https://www.google.com/search?q=rust")
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);
    }

    #[test]
    fn test_storage_change_replaces_list() {
        let store = MemoryStore::new();
        let script = Rc::new(RefCell::new(listening()));
        ContentScript::watch(&script, &store);

        let keys = KeyCombo::new("y").with_alt();
        let updated = vec![ShortcutDefinition::new(2, keys, "site:news.ycombinator.com")];
        store
            .set(config::SHORTCUTS_KEY, serde_json::to_value(&updated).unwrap())
            .unwrap();
        assert_eq!(script.borrow().shortcuts(), updated.as_slice());

        let outcome = script
            .borrow()
            .handle_keydown(&reddit_press(), None, "https://www.google.com/search?q=rust")
            .unwrap();
        assert_eq!(outcome, KeyOutcome::Ignored);

        store.set("unrelated", json!(1)).unwrap();
        assert_eq!(script.borrow().shortcuts().len(), 1);

        store.remove(config::SHORTCUTS_KEY).unwrap();
        assert!(script.borrow().shortcuts().is_empty());
    }

    #[test]
    fn test_yahoo_uses_p() {
        let script = listening();
        let outcome = script
            .handle_keydown(&reddit_press(), None, "https://search.yahoo.com/search?p=rust")
            .unwrap();

        match outcome {
            KeyOutcome::Navigate(url) => assert_eq!(url.query(), Some("p=rust+site%3Areddit.com")),
            other => panic!("Expected navigation, got {:?}", other),
        }
    }
}
