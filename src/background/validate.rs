//! All-or-nothing validation of a shortcut list received for saving.

use crate::config;
use crate::shortcut::{KeyCombo, ShortcutDefinition};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

const MODIFIERS: &[&str] = &["ctrl", "alt", "shift", "meta"];

/// Why a shortcut list was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Shortcuts must be an array")]
    NotAnArray,
    #[error("Shortcut must be an object")]
    NotAnObject,
    #[error("Shortcut must have numeric id")]
    MissingId,
    #[error("Shortcut id must be a positive integer")]
    InvalidId,
    #[error("Duplicate shortcut id {0}")]
    DuplicateId(u32),
    #[error("Shortcut must have keys object")]
    MissingKeys,
    #[error("Shortcut modifier '{0}' must be a boolean")]
    InvalidModifier(&'static str),
    #[error("Shortcut must have a key defined")]
    MissingKey,
    #[error("Shortcut must have a non-empty term")]
    EmptyTerm,
    #[error("Shortcut term must be at most {max} characters", max = config::MAX_TERM_LENGTH)]
    TermTooLong,
    #[error("Shortcut must have boolean enabled field")]
    MissingEnabled,
}

/// Check every entry of a raw list and convert it.
///
/// The first violation rejects the whole list.
pub fn validate_shortcuts(value: &Value) -> Result<Vec<ShortcutDefinition>, ValidationError> {
    let entries = value.as_array().ok_or(ValidationError::NotAnArray)?;
    let mut seen = HashSet::new();

    entries
        .iter()
        .map(|entry| {
            let shortcut = validate_shortcut(entry)?;
            if !seen.insert(shortcut.id) {
                return Err(ValidationError::DuplicateId(shortcut.id));
            }
            Ok(shortcut)
        })
        .collect()
}

fn validate_shortcut(entry: &Value) -> Result<ShortcutDefinition, ValidationError> {
    let entry = entry.as_object().ok_or(ValidationError::NotAnObject)?;

    let id = match entry.get("id") {
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .filter(|id| *id > 0)
            .ok_or(ValidationError::InvalidId)?,
        _ => return Err(ValidationError::MissingId),
    };

    let keys = entry
        .get("keys")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingKeys)?;
    let keys = validate_keys(keys)?;

    let term = entry
        .get("term")
        .and_then(Value::as_str)
        .filter(|term| !term.trim().is_empty())
        .ok_or(ValidationError::EmptyTerm)?;
    if term.chars().count() > config::MAX_TERM_LENGTH {
        return Err(ValidationError::TermTooLong);
    }

    let enabled = entry
        .get("enabled")
        .and_then(Value::as_bool)
        .ok_or(ValidationError::MissingEnabled)?;

    Ok(ShortcutDefinition {
        id,
        keys,
        term: term.to_string(),
        enabled,
    })
}

fn validate_keys(keys: &Map<String, Value>) -> Result<KeyCombo, ValidationError> {
    let mut flags = [false; 4];
    for (flag, name) in flags.iter_mut().zip(MODIFIERS) {
        *flag = match keys.get(*name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(value)) => *value,
            Some(_) => return Err(ValidationError::InvalidModifier(*name)),
        };
    }

    let key = keys
        .get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .ok_or(ValidationError::MissingKey)?;

    let [ctrl, alt, shift, meta] = flags;
    Ok(KeyCombo {
        ctrl,
        alt,
        shift,
        meta,
        key: key.to_string(),
    })
}
