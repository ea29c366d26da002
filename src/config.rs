use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application ID (reverse domain notation)
pub const APP_ID: &str = "dev.myyc.refind";

/// Application name
pub const APP_NAME: &str = "refind";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key holding the shortcut list
pub const SHORTCUTS_KEY: &str = "shortcuts";

/// Maximum length of a shortcut term, in characters
pub const MAX_TERM_LENGTH: usize = 500;

/// Key-value storage filename inside the data directory
pub const STORAGE_FILE: &str = "storage.json";

/// Settings filename inside the config directory
pub const SETTINGS_FILE: &str = "refind.toml";

/// Default log filter when neither RUST_LOG nor settings override it
pub const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Search Engines
// ============================================================================

/// Supported search engines: (name, url_pattern, query_param)
///
/// Patterns are matched case-insensitively against the full page URL.
/// Order matters: the first matching engine wins.
pub const SEARCH_ENGINES: &[(&str, &str, &str)] = &[
    ("google", r"^https?://(www\.)?google\.[a-z.]+/search", "q"),
    ("bing", r"^https?://(www\.)?bing\.com/search", "q"),
    ("duckduckgo", r"^https?://(www\.)?duckduckgo\.com/", "q"),
    ("yahoo", r"^https?://search\.yahoo\.com/search", "p"),
];

// ============================================================================
// Default Shortcuts
// ============================================================================

/// Shortcut installed on first run: (meta, shift, key, term)
pub const DEFAULT_SHORTCUT: (bool, bool, &str, &str) = (true, true, "e", "site:reddit.com");

// ============================================================================
// Runtime Settings
// ============================================================================

/// Errors loading the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// User settings read from `refind.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// env_logger filter used when RUST_LOG is unset
    pub log_filter: String,
    /// Overrides the platform data directory for shortcut storage
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let settings = toml::from_str(&contents)?;
        log::debug!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Load settings from the platform config directory
    pub fn load_default() -> Result<Self, ConfigError> {
        match project_dirs() {
            Some(dirs) => Self::load(&dirs.config_dir().join(SETTINGS_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Directory holding the key-value storage file
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "myyc", APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_settings_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "log_filter = \"debug\"\ndata_dir = \"/tmp/refind-data\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.data_dir(), PathBuf::from("/tmp/refind-data"));
    }

    #[test]
    fn test_invalid_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "log_filter = [").unwrap();

        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_engine_params_are_q_or_p() {
        for (_, _, param) in SEARCH_ENGINES {
            assert!(*param == "q" || *param == "p");
        }
    }
}
