//! Lookup of common browser shortcuts that a user combo would shadow.

use super::KeyCombo;

/// A built-in browser shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserShortcut {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: &'static str,
    pub description: &'static str,
}

const fn entry(
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
    key: &'static str,
    description: &'static str,
) -> BrowserShortcut {
    BrowserShortcut {
        ctrl,
        alt,
        shift,
        meta,
        key,
        description,
    }
}

const fn cmd(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(false, false, false, true, key, description)
}

const fn ctrl(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(true, false, false, false, key, description)
}

const fn cmd_shift(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(false, false, true, true, key, description)
}

const fn ctrl_shift(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(true, false, true, false, key, description)
}

const fn cmd_alt(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(false, true, false, true, key, description)
}

const fn bare(key: &'static str, description: &'static str) -> BrowserShortcut {
    entry(false, false, false, false, key, description)
}

/// Common browser shortcuts (meta is Cmd on macOS). Scanned in order.
pub const BROWSER_SHORTCUTS: &[BrowserShortcut] = &[
    // Tab/Window management
    cmd("t", "New tab"),
    ctrl("t", "New tab"),
    cmd("w", "Close tab"),
    ctrl("w", "Close tab"),
    cmd("n", "New window"),
    ctrl("n", "New window"),
    cmd_shift("t", "Reopen closed tab"),
    ctrl_shift("t", "Reopen closed tab"),
    cmd_shift("n", "New private window"),
    ctrl_shift("n", "New private window"),
    cmd_shift("p", "New private window"),
    ctrl_shift("p", "New private window"),
    // Navigation
    cmd("l", "Focus address bar"),
    ctrl("l", "Focus address bar"),
    cmd("k", "Focus search bar"),
    ctrl("k", "Focus search bar"),
    cmd("r", "Reload page"),
    ctrl("r", "Reload page"),
    cmd_shift("r", "Hard reload"),
    ctrl_shift("r", "Hard reload"),
    bare("F5", "Reload page"),
    // Bookmarks/History
    cmd("d", "Bookmark page"),
    ctrl("d", "Bookmark page"),
    cmd("h", "History"),
    ctrl("h", "History"),
    cmd("j", "Downloads"),
    ctrl("j", "Downloads"),
    cmd_shift("b", "Bookmarks"),
    ctrl_shift("b", "Bookmarks"),
    // Find
    cmd("f", "Find in page"),
    ctrl("f", "Find in page"),
    cmd("g", "Find next"),
    ctrl("g", "Find next"),
    // Page actions
    cmd("p", "Print"),
    ctrl("p", "Print"),
    cmd("s", "Save page"),
    ctrl("s", "Save page"),
    cmd("u", "View source"),
    ctrl("u", "View source"),
    // Zoom
    cmd("=", "Zoom in"),
    ctrl("=", "Zoom in"),
    cmd("-", "Zoom out"),
    ctrl("-", "Zoom out"),
    cmd("0", "Reset zoom"),
    ctrl("0", "Reset zoom"),
    // Dev tools
    bare("F12", "Developer tools"),
    cmd_alt("i", "Developer tools"),
    ctrl_shift("i", "Developer tools"),
    cmd_alt("c", "Inspector"),
    ctrl_shift("c", "Inspector"),
    cmd_alt("j", "Browser console"),
    ctrl_shift("j", "Browser console"),
    // Misc
    bare("F11", "Fullscreen"),
    cmd("q", "Quit browser"),
    cmd("a", "Select all"),
    ctrl("a", "Select all"),
    cmd("c", "Copy"),
    ctrl("c", "Copy"),
    cmd("v", "Paste"),
    ctrl("v", "Paste"),
    cmd("x", "Cut"),
    ctrl("x", "Cut"),
    cmd("z", "Undo"),
    ctrl("z", "Undo"),
];

impl BrowserShortcut {
    fn conflicts_with(&self, keys: &KeyCombo) -> bool {
        self.ctrl == keys.ctrl
            && self.alt == keys.alt
            && self.shift == keys.shift
            && self.meta == keys.meta
            && self.key.to_lowercase() == keys.key.to_lowercase()
    }
}

/// Description of the first browser shortcut `keys` collides with, if any.
pub fn check_browser_conflict(keys: &KeyCombo) -> Option<&'static str> {
    BROWSER_SHORTCUTS
        .iter()
        .find(|shortcut| shortcut.conflicts_with(keys))
        .map(|shortcut| shortcut.description)
}
