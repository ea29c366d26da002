//! Keyboard shortcuts that append a fixed term (like `site:reddit.com`) to
//! the query on a supported search engine.

pub mod background;
pub mod config;
pub mod content;
pub mod editor;
pub mod input_gate;
pub mod messaging;
pub mod rewrite;
pub mod search_engine;
pub mod shortcut;
pub mod storage;

pub use background::{Background, InstallReason};
pub use content::{ContentScript, KeyOutcome};
pub use editor::ShortcutEditor;
pub use input_gate::{is_eligible_target, FocusedElement};
pub use rewrite::{build_rewritten_url, Rewrite};
pub use search_engine::{detect, SearchEngineProfile};
pub use shortcut::{find_match, KeyCombo, KeyEvent, ShortcutDefinition};
