//! Persistent user settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use courier_core::{StalePolicy, ViewName};

use crate::theme::ThemeVariant;

/// User settings stored in the config file. Command-line flags override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color palette.
    pub theme: ThemeVariant,
    /// View shown at startup.
    pub initial_view: ViewName,
    /// Auto-refresh interval in seconds, 0 to disable.
    pub refresh_secs: u64,
    /// Open the autocomplete palette on `:` instead of the plain prompt.
    pub palette: bool,
    /// Handling of out-of-order load results.
    pub stale_results: StalePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Dark,
            initial_view: ViewName::Dashboard,
            refresh_secs: 30,
            palette: true,
            stale_results: StalePolicy::Discard,
        }
    }
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("courier").join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`. Missing or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "Ignoring malformed settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default location.
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            theme: ThemeVariant::Light,
            initial_view: ViewName::WebhookServer,
            refresh_secs: 0,
            palette: false,
            stale_results: StalePolicy::Apply,
        };
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("initial_view = \"webhook-server\""));
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "theme = \"light\"\n").unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.theme, ThemeVariant::Light);
        assert_eq!(settings.refresh_secs, 30);
        assert!(settings.palette);
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "theme = [").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
