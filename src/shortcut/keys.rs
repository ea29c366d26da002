//! Key combinations and key events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key names that are pure modifiers and never form a shortcut on their own.
const MODIFIER_KEYS: &[&str] = &["Control", "Alt", "Shift", "Meta"];

/// Errors parsing a textual key combination like `Meta+Shift+E`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComboParseError {
    #[error("key combination is empty")]
    Empty,
    #[error("key combination has no key, only modifiers")]
    MissingKey,
    #[error("key combination has more than one key: '{0}' and '{1}'")]
    MultipleKeys(String, String),
}

/// A single key press as delivered by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    /// Key identifier, e.g. `"e"`, `"E"`, `"F5"`.
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Whether this press is a bare modifier key
    pub fn is_modifier_only(&self) -> bool {
        MODIFIER_KEYS.contains(&self.key.as_str())
    }
}

impl From<&KeyCombo> for KeyEvent {
    /// The key press that would produce this combo
    fn from(combo: &KeyCombo) -> Self {
        Self {
            ctrl: combo.ctrl,
            alt: combo.alt,
            shift: combo.shift,
            meta: combo.meta,
            key: combo.key.clone(),
        }
    }
}

/// Modifier flags plus a key, stored as `{ctrl, alt, shift, meta, key}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCombo {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
    pub key: String,
}

impl KeyCombo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Capture a key press as a combo, the way the shortcut recorder does.
    ///
    /// Modifier-only presses produce nothing. Single-character keys are
    /// stored lower-cased; named keys (`F5`, `ArrowUp`) keep their case.
    pub fn record(event: &KeyEvent) -> Option<Self> {
        if event.is_modifier_only() || event.key.is_empty() {
            return None;
        }

        Some(Self {
            ctrl: event.ctrl,
            alt: event.alt,
            shift: event.shift,
            meta: event.meta,
            key: normalize_key(&event.key),
        })
    }

    /// Exact modifier equality plus case-insensitive key equality.
    ///
    /// Holding an extra modifier means no match.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.ctrl == event.ctrl
            && self.alt == event.alt
            && self.shift == event.shift
            && self.meta == event.meta
            && self.key.to_lowercase() == event.key.to_lowercase()
    }
}

fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.meta {
            parts.push("\u{2318}".to_string());
        }
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        if !self.key.is_empty() {
            parts.push(self.key.to_uppercase());
        }

        if parts.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

impl FromStr for KeyCombo {
    type Err = ComboParseError;

    /// Parse `Meta+Shift+E`, `ctrl+alt+F5`, `Ctrl++`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ComboParseError::Empty);
        }

        // A trailing "++" (or a lone "+") means the plus key itself
        let (body, plus_key) = if s == "+" {
            ("", true)
        } else if let Some(rest) = s.strip_suffix("++") {
            (rest, true)
        } else {
            (s, false)
        };

        let mut combo = KeyCombo::default();
        let mut key: Option<String> = plus_key.then(|| "+".to_string());

        for token in body.split('+').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_lowercase().as_str() {
                "meta" | "cmd" | "command" | "super" | "\u{2318}" => combo.meta = true,
                "ctrl" | "control" => combo.ctrl = true,
                "alt" | "option" => combo.alt = true,
                "shift" => combo.shift = true,
                _ => {
                    if let Some(existing) = key {
                        return Err(ComboParseError::MultipleKeys(existing, token.to_string()));
                    }
                    key = Some(normalize_key(token));
                }
            }
        }

        combo.key = key.ok_or(ComboParseError::MissingKey)?;
        Ok(combo)
    }
}
