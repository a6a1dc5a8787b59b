//! User settings loaded from `~/.config/window-templates/config.toml`

use crate::macos::accessibility::DEFAULT_NEW_WINDOW_MENU_TITLES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),
    #[error("Invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Timing and affordance knobs for applying presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// How long to wait for a launched application to finish launching
    pub ready_timeout_ms: u64,
    pub ready_poll_interval_ms: u64,
    /// How long to wait for a requested window to appear
    pub new_window_timeout_ms: u64,
    pub new_window_poll_interval_ms: u64,
    /// Menu item titles pressed to open a new window, tried in order
    pub new_window_menu_titles: Vec<String>,
    /// Send Cmd+N when no menu item matches
    pub keyboard_fallback: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 10_000,
            ready_poll_interval_ms: 100,
            new_window_timeout_ms: 5_000,
            new_window_poll_interval_ms: 100,
            new_window_menu_titles: DEFAULT_NEW_WINDOW_MENU_TITLES
                .iter()
                .map(|title| title.to_string())
                .collect(),
            keyboard_fallback: true,
        }
    }
}

impl OrchestratorSettings {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    pub fn new_window_timeout(&self) -> Duration {
        Duration::from_millis(self.new_window_timeout_ms)
    }

    pub fn new_window_poll_interval(&self) -> Duration {
        Duration::from_millis(self.new_window_poll_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_interval(
            "orchestrator.ready_poll_interval_ms",
            self.ready_poll_interval_ms,
            self.ready_timeout_ms,
        )?;
        check_interval(
            "orchestrator.new_window_poll_interval_ms",
            self.new_window_poll_interval_ms,
            self.new_window_timeout_ms,
        )?;

        if self
            .new_window_menu_titles
            .iter()
            .any(|title| title.trim().is_empty())
        {
            return Err(SettingsError::Invalid {
                field: "orchestrator.new_window_menu_titles",
                message: "menu titles must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn check_interval(field: &'static str, interval: u64, timeout: u64) -> Result<(), SettingsError> {
    if interval == 0 {
        return Err(SettingsError::Invalid {
            field,
            message: "poll interval must be greater than zero".to_string(),
        });
    }
    if interval > timeout {
        return Err(SettingsError::Invalid {
            field,
            message: format!("poll interval {interval}ms exceeds its timeout {timeout}ms"),
        });
    }
    Ok(())
}

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overrides the default presets file location
    pub presets_path: Option<PathBuf>,
    pub orchestrator: OrchestratorSettings,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home_dir
            .join(".config")
            .join("window-templates")
            .join("config.toml")
    }

    /// Load and validate settings; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.orchestrator.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.orchestrator.ready_timeout(), Duration::from_secs(10));
        assert_eq!(settings.orchestrator.new_window_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[orchestrator]\nnew_window_timeout_ms = 2000\nkeyboard_fallback = false\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.orchestrator.new_window_timeout_ms, 2000);
        assert!(!settings.orchestrator.keyboard_fallback);
        assert_eq!(settings.orchestrator.ready_poll_interval_ms, 100);
        assert_eq!(settings.presets_path, None);
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[orchestrator]\nready_poll_interval_ms = 0\n").unwrap();

        let error = Settings::load(&path).unwrap_err();
        assert!(matches!(
            error,
            SettingsError::Invalid {
                field: "orchestrator.ready_poll_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn test_interval_longer_than_timeout_is_rejected() {
        let settings = OrchestratorSettings {
            new_window_poll_interval_ms: 6_000,
            ..OrchestratorSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings {
            presets_path: Some(PathBuf::from("/tmp/presets.json")),
            orchestrator: OrchestratorSettings {
                new_window_menu_titles: vec!["Neues Fenster".to_string()],
                ..OrchestratorSettings::default()
            },
        };

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
