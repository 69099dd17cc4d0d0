//! Configuration management for moyu

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reading: ReadingConfig,
    pub font: FontConfig,
    pub status_bar: StatusBarConfig,
    pub keys: KeyConfig,
}

/// Page geometry for both display modes. All widths are measured in
/// characters, not display cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// Chars per line in stealth mode. 0 = unlimited, otherwise 10..=500.
    pub stealth_width: usize,
    /// Lines per page in normal mode, 1..=50.
    pub page_size: usize,
    /// Wrap width in normal mode. 0 = unlimited, otherwise 10..=500.
    pub normal_width: usize,
}

/// Display-font hints, passed through to the host and never interpreted
/// by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub size: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBarConfig {
    pub enabled: bool,
}

/// Shortcut names in crossterm-ish notation; the TUI host parses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub open: String,
    pub next_page: String,
    pub prev_page: String,
    pub toggle: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reading: ReadingConfig::default(),
            font: FontConfig::default(),
            status_bar: StatusBarConfig::default(),
            keys: KeyConfig::default(),
        }
    }
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            stealth_width: 60,
            page_size: 5,
            normal_width: 60,
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Microsoft YaHei".to_string(),
            size: 13,
        }
    }
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            open: "o".to_string(),
            next_page: "right".to_string(),
            prev_page: "left".to_string(),
            toggle: "h".to_string(),
        }
    }
}

fn clamp_width(chars: usize) -> usize {
    if chars == 0 {
        0
    } else {
        chars.clamp(10, 500)
    }
}

impl ReadingConfig {
    /// Force all values into their documented bounds. Out-of-range
    /// values from disk are clamped, not rejected.
    fn sanitize(&mut self) {
        self.stealth_width = clamp_width(self.stealth_width);
        self.normal_width = clamp_width(self.normal_width);
        self.page_size = self.page_size.clamp(1, 50);
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "moyu")
            .map(|proj_dirs| proj_dirs.config_dir().join("moyu.toml"))
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from a specific path (for testing)
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.reading.sanitize();
        Ok(config)
    }
}
