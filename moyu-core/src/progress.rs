//! Persisted reading progress, keyed by file path
//!
//! The on-disk shape has gone through two epochs: schema 1 kept a single
//! unified position per file; schema 2 keeps one position per display
//! mode. The `schema` tag is authoritative; the shape of the maps is
//! never used to guess the epoch. Files written before the tag existed
//! deserialize as schema 1.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::session::DisplayMode;

/// Unified single-cursor epoch.
pub const SCHEMA_UNIFIED: u32 = 1;
/// Per-mode dual-cursor epoch (current).
pub const SCHEMA_PER_MODE: u32 = 2;

/// Which cursor-tracking scheme a store should be migrated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorScheme {
    Unified,
    PerMode,
}

fn pre_tag_schema() -> u32 {
    SCHEMA_UNIFIED
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressStore {
    #[serde(default = "pre_tag_schema")]
    schema: u32,
    pub last_file: String,
    pub installed_version: String,
    stealth: BTreeMap<String, usize>,
    normal: BTreeMap<String, usize>,
    unified: BTreeMap<String, usize>,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self {
            schema: SCHEMA_PER_MODE,
            last_file: String::new(),
            installed_version: String::new(),
            stealth: BTreeMap::new(),
            normal: BTreeMap::new(),
            unified: BTreeMap::new(),
        }
    }
}

impl ProgressStore {
    /// Last read line for `path` in `mode`, 0 when untracked.
    pub fn get(&self, mode: DisplayMode, path: &str) -> usize {
        let map = match self.schema {
            SCHEMA_UNIFIED => &self.unified,
            _ => match mode {
                DisplayMode::Stealth => &self.stealth,
                DisplayMode::Normal => &self.normal,
            },
        };
        map.get(path).copied().unwrap_or(0)
    }

    pub fn set(&mut self, mode: DisplayMode, path: &str, line: usize) {
        let map = match self.schema {
            SCHEMA_UNIFIED => &mut self.unified,
            _ => match mode {
                DisplayMode::Stealth => &mut self.stealth,
                DisplayMode::Normal => &mut self.normal,
            },
        };
        map.insert(path.to_owned(), line);
    }

    pub fn schema(&self) -> u32 {
        self.schema
    }

    /// Reconcile legacy data into `target`'s map shape.
    ///
    /// Runs once per store load, before any get/set is honored:
    /// - unified -> per-mode seeds both mode maps from the single value
    ///   (existing per-mode entries win);
    /// - per-mode -> unified keeps the farthest-read line of the two.
    /// Superseded maps are cleared afterwards. Idempotent.
    pub fn migrate(&mut self, target: CursorScheme) {
        match (self.schema, target) {
            (SCHEMA_UNIFIED, CursorScheme::PerMode) => {
                log::info!(
                    "migrate: unified -> per-mode, {} tracked files",
                    self.unified.len()
                );
                for (path, line) in std::mem::take(&mut self.unified) {
                    self.stealth.entry(path.clone()).or_insert(line);
                    self.normal.entry(path).or_insert(line);
                }
                self.schema = SCHEMA_PER_MODE;
            }
            (SCHEMA_PER_MODE, CursorScheme::Unified) => {
                log::info!(
                    "migrate: per-mode -> unified, {} / {} tracked files",
                    self.stealth.len(),
                    self.normal.len()
                );
                let stealth = std::mem::take(&mut self.stealth);
                let normal = std::mem::take(&mut self.normal);
                let mut unified = stealth;
                for (path, line) in normal {
                    let entry = unified.entry(path).or_insert(0);
                    *entry = (*entry).max(line);
                }
                self.unified.extend(unified);
                self.schema = SCHEMA_UNIFIED;
            }
            _ => {}
        }
    }

    /// Get the platform-specific progress file path
    pub fn state_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "moyu")
            .map(|proj_dirs| proj_dirs.data_dir().join("progress.toml"))
    }

    /// Load the store from its default location, migrating to the
    /// current per-mode scheme. A missing file yields an empty store.
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::state_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load from a specific path (for testing)
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read progress file: {}", path.display()))?;

        let mut store: ProgressStore = toml::from_str(&content)
            .with_context(|| format!("Failed to parse progress file: {}", path.display()))?;

        store.migrate(CursorScheme::PerMode);
        Ok(store)
    }

    /// Flush the store to its default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::state_path().context("No usable data directory for progress file")?;
        self.save_to(&path)
    }

    /// Save to a specific path (for testing)
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(self).context("Failed to serialize progress")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write progress file: {}", path.display()))?;
        Ok(())
    }
}
