use std::path::{Path, PathBuf};
use std::str::FromStr;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Manages the config directory and config file operations.
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for
    /// testing).
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load `config.toml` from the config directory, falling back to defaults
    /// when the file does not exist. A file that exists but fails to parse is
    /// an error; silently ignoring it would hide typos.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_dir.join("config.toml");
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Start with zebra striping on.
    pub zebra_stripe: bool,
    /// Character columns moved per horizontal arrow press.
    pub column_scroll_step: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            zebra_stripe: false,
            column_scroll_step: 5,
        }
    }
}

/// Color names (or hex values) accepted by ratatui's `Color::from_str`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub header: String,
    pub zebra: String,
    pub highlight: String,
    pub cursor: String,
    pub popup_border: String,
    pub mode_line: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            header: "cyan".to_string(),
            zebra: "darkgray".to_string(),
            highlight: "yellow".to_string(),
            cursor: "red".to_string(),
            popup_border: "white".to_string(),
            mode_line: "darkgray".to_string(),
        }
    }
}

impl ThemeConfig {
    fn parse(name: &str, fallback: Color) -> Color {
        Color::from_str(name).unwrap_or(fallback)
    }

    pub fn resolve(&self) -> Theme {
        Theme {
            header: Self::parse(&self.header, Color::Cyan),
            zebra: Self::parse(&self.zebra, Color::DarkGray),
            highlight: Self::parse(&self.highlight, Color::Yellow),
            cursor: Self::parse(&self.cursor, Color::Red),
            popup_border: Self::parse(&self.popup_border, Color::White),
            mode_line: Self::parse(&self.mode_line, Color::DarkGray),
        }
    }
}

/// Resolved colors used by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub header: Color,
    pub zebra: Color,
    pub highlight: Color,
    pub cursor: Color,
    pub popup_border: Color,
    pub mode_line: Color,
}

impl Default for Theme {
    fn default() -> Self {
        ThemeConfig::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let config = manager.load().unwrap();
        assert!(!config.display.zebra_stripe);
        assert_eq!(config.display.column_scroll_step, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[display]\nzebra_stripe = true\n",
        )
        .unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let config = manager.load().unwrap();
        assert!(config.display.zebra_stripe);
        assert_eq!(config.display.column_scroll_step, 5);
        assert_eq!(config.theme.header, "cyan");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "display = 3\n").unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        assert!(manager.load().is_err());
    }

    #[test]
    fn test_theme_parses_colors_with_fallback() {
        let theme = ThemeConfig {
            header: "magenta".to_string(),
            zebra: "not-a-color".to_string(),
            ..ThemeConfig::default()
        };
        let resolved = theme.resolve();
        assert_eq!(resolved.header, Color::Magenta);
        assert_eq!(resolved.zebra, Color::DarkGray);
    }
}
