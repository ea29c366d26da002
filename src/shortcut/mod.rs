//! Shortcut definitions and key-event matching.

pub mod conflict;
pub mod keys;

pub use conflict::{check_browser_conflict, BrowserShortcut, BROWSER_SHORTCUTS};
pub use keys::{ComboParseError, KeyCombo, KeyEvent};

use crate::config;
use serde::{Deserialize, Serialize};

/// A user-defined shortcut bound to a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutDefinition {
    /// Unique, positive, stable across edits.
    pub id: u32,
    pub keys: KeyCombo,
    /// Text appended to the search query.
    pub term: String,
    pub enabled: bool,
}

impl ShortcutDefinition {
    pub fn new(id: u32, keys: KeyCombo, term: impl Into<String>) -> Self {
        Self {
            id,
            keys,
            term: term.into(),
            enabled: true,
        }
    }
}

/// Find the shortcut an event triggers.
///
/// Disabled shortcuts are skipped. When several enabled shortcuts share the
/// same combo, the earliest in `shortcuts` wins.
pub fn find_match<'a>(
    event: &KeyEvent,
    shortcuts: &'a [ShortcutDefinition],
) -> Option<&'a ShortcutDefinition> {
    shortcuts
        .iter()
        .filter(|shortcut| shortcut.enabled)
        .find(|shortcut| shortcut.keys.matches(event))
}

/// Id for a new shortcut: one past the largest existing id, or 1.
///
/// `None` once the largest id is `u32::MAX`.
pub fn next_id(shortcuts: &[ShortcutDefinition]) -> Option<u32> {
    match shortcuts.iter().map(|shortcut| shortcut.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Built-in list used on install and whenever storage has nothing to offer.
pub fn default_shortcuts() -> Vec<ShortcutDefinition> {
    let (meta, shift, key, term) = config::DEFAULT_SHORTCUT;
    let keys = KeyCombo {
        meta,
        shift,
        key: key.to_string(),
        ..Default::default()
    };
    vec![ShortcutDefinition::new(1, keys, term)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(id: u32, keys: KeyCombo, term: &str, enabled: bool) -> ShortcutDefinition {
        ShortcutDefinition {
            id,
            keys,
            term: term.to_string(),
            enabled,
        }
    }

    #[test]
    fn test_match_default_shortcut() {
        let shortcuts = default_shortcuts();
        let event = KeyEvent::new("E").meta().shift();
        let found = find_match(&event, &shortcuts).unwrap();
        assert_eq!(found.term, "site:reddit.com");
    }

    #[test]
    fn test_disabled_shortcut_never_matches() {
        let keys = KeyCombo::new("r").with_alt();
        let shortcuts = vec![shortcut(1, keys, "site:reddit.com", false)];
        assert!(find_match(&KeyEvent::new("r").alt(), &shortcuts).is_none());
    }

    #[test]
    fn test_earliest_duplicate_wins() {
        let keys = KeyCombo::new("r").with_alt();
        let shortcuts = vec![
            shortcut(7, keys.clone(), "first", true),
            shortcut(3, keys, "second", true),
        ];
        let found = find_match(&KeyEvent::new("r").alt(), &shortcuts).unwrap();
        assert_eq!(found.id, 7);
    }

    #[test]
    fn test_disabled_duplicate_skipped() {
        let keys = KeyCombo::new("r").with_alt();
        let shortcuts = vec![
            shortcut(1, keys.clone(), "first", false),
            shortcut(2, keys, "second", true),
        ];
        let found = find_match(&KeyEvent::new("r").alt(), &shortcuts).unwrap();
        assert_eq!(found.term, "second");
    }

    #[test]
    fn test_no_match_with_extra_modifier() {
        let shortcuts = default_shortcuts();
        let event = KeyEvent::new("e").meta().shift().ctrl();
        assert!(find_match(&event, &shortcuts).is_none());
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(&[]), Some(1));
        let shortcuts = vec![
            shortcut(4, KeyCombo::new("a"), "a", true),
            shortcut(2, KeyCombo::new("b"), "b", true),
        ];
        assert_eq!(next_id(&shortcuts), Some(5));
    }

    #[test]
    fn test_next_id_at_u32_max() {
        let shortcuts = vec![shortcut(u32::MAX, KeyCombo::new("a"), "a", true)];
        assert_eq!(next_id(&shortcuts), None);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(&default_shortcuts()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "keys": {"ctrl": false, "alt": false, "shift": true, "meta": true, "key": "e"},
                "term": "site:reddit.com",
                "enabled": true
            }])
        );
    }
}
