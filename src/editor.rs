//! Shortcut list editing: add, edit, toggle, delete with undo.
//!
//! Every change is saved through the broker as a whole list. A change the
//! broker rejects is rolled back locally.

use crate::config;
use crate::messaging::{send_or_failure, MessageChannel, Request};
use crate::shortcut::{check_browser_conflict, next_id, KeyCombo, ShortcutDefinition};
use std::rc::Rc;
use thiserror::Error;

/// Errors from editing operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no key recorded for shortcut")]
    MissingKey,
    #[error("term must not be empty")]
    EmptyTerm,
    #[error("term must be at most {max} characters", max = config::MAX_TERM_LENGTH)]
    TermTooLong,
    #[error("no shortcut with id {0}")]
    NotFound(u32),
    #[error("no shortcut ids left")]
    IdsExhausted,
    #[error("{0}")]
    Save(String),
}

#[derive(Debug, Clone)]
struct DeletedShortcut {
    shortcut: ShortcutDefinition,
    index: usize,
}

/// Editable copy of the shortcut list.
pub struct ShortcutEditor {
    channel: Rc<dyn MessageChannel>,
    shortcuts: Vec<ShortcutDefinition>,
    deleted: Option<DeletedShortcut>,
}

impl std::fmt::Debug for ShortcutEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutEditor")
            .field("shortcuts", &self.shortcuts)
            .finish_non_exhaustive()
    }
}

impl ShortcutEditor {
    /// Load the current list. An unreachable broker gives an empty list.
    pub fn load(channel: Rc<dyn MessageChannel>) -> Self {
        let response = send_or_failure(channel.as_ref(), &Request::GetShortcuts);
        let shortcuts = response.shortcuts.unwrap_or_default();

        Self {
            channel,
            shortcuts,
            deleted: None,
        }
    }

    pub fn shortcuts(&self) -> &[ShortcutDefinition] {
        &self.shortcuts
    }

    pub fn get(&self, id: u32) -> Option<&ShortcutDefinition> {
        self.shortcuts.iter().find(|shortcut| shortcut.id == id)
    }

    /// Browser shortcut these keys would shadow, for a warning next to the recorder
    pub fn conflict_for(&self, keys: &KeyCombo) -> Option<&'static str> {
        check_browser_conflict(keys)
    }

    /// Add an enabled shortcut. Returns its new id.
    pub fn add(&mut self, keys: KeyCombo, term: &str) -> Result<u32, EditorError> {
        let term = check_input(&keys, term)?;
        let id = next_id(&self.shortcuts).ok_or(EditorError::IdsExhausted)?;

        self.commit(|shortcuts| {
            shortcuts.push(ShortcutDefinition::new(id, keys, term));
            Ok(())
        })?;
        Ok(id)
    }

    /// Replace keys and term of an existing shortcut, keeping its id.
    pub fn update(&mut self, id: u32, keys: KeyCombo, term: &str) -> Result<(), EditorError> {
        let term = check_input(&keys, term)?;

        self.commit(|shortcuts| {
            let shortcut = find_mut(shortcuts, id)?;
            shortcut.keys = keys;
            shortcut.term = term;
            Ok(())
        })
    }

    pub fn set_enabled(&mut self, id: u32, enabled: bool) -> Result<(), EditorError> {
        self.commit(|shortcuts| {
            find_mut(shortcuts, id)?.enabled = enabled;
            Ok(())
        })
    }

    /// Remove a shortcut. The last deletion can be undone.
    pub fn delete(&mut self, id: u32) -> Result<(), EditorError> {
        let index = self
            .shortcuts
            .iter()
            .position(|shortcut| shortcut.id == id)
            .ok_or(EditorError::NotFound(id))?;

        let mut removed = None;
        self.commit(|shortcuts| {
            removed = Some(shortcuts.remove(index));
            Ok(())
        })?;

        self.deleted = removed.map(|shortcut| DeletedShortcut { shortcut, index });
        Ok(())
    }

    /// Put the last deleted shortcut back where it was.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo_delete(&mut self) -> Result<bool, EditorError> {
        let Some(deleted) = self.deleted.take() else {
            return Ok(false);
        };

        let restore = deleted.clone();
        let result = self.commit(move |shortcuts| {
            let index = restore.index.min(shortcuts.len());
            shortcuts.insert(index, restore.shortcut);
            Ok(())
        });

        if result.is_err() {
            self.deleted = Some(deleted);
        }
        result.map(|()| true)
    }

    /// Forget the pending undo (the undo prompt expired).
    pub fn clear_undo(&mut self) {
        self.deleted = None;
    }

    /// Apply `change` to a copy, save it, and keep it only if the save succeeded.
    fn commit<F>(&mut self, change: F) -> Result<(), EditorError>
    where
        F: FnOnce(&mut Vec<ShortcutDefinition>) -> Result<(), EditorError>,
    {
        let mut updated = self.shortcuts.clone();
        change(&mut updated)?;

        let request =
            Request::save_shortcuts(&updated).map_err(|e| EditorError::Save(e.to_string()))?;
        let response = send_or_failure(self.channel.as_ref(), &request);

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "Failed to save shortcuts".to_string());
            log::warn!("Save rejected: {}", message);
            return Err(EditorError::Save(message));
        }

        self.shortcuts = updated;
        Ok(())
    }
}

fn check_input(keys: &KeyCombo, term: &str) -> Result<String, EditorError> {
    if keys.key.is_empty() {
        return Err(EditorError::MissingKey);
    }

    let term = term.trim();
    if term.is_empty() {
        return Err(EditorError::EmptyTerm);
    }
    if term.chars().count() > config::MAX_TERM_LENGTH {
        return Err(EditorError::TermTooLong);
    }

    Ok(term.to_string())
}

fn find_mut(
    shortcuts: &mut [ShortcutDefinition],
    id: u32,
) -> Result<&mut ShortcutDefinition, EditorError> {
    shortcuts
        .iter_mut()
        .find(|shortcut| shortcut.id == id)
        .ok_or(EditorError::NotFound(id))
}
