//! TaskForge configuration.
//!
//! Loaded from `~/.taskforge/config.toml` (or an explicit `--config`
//! path). Scheduler cadences are fixed constants in the engine, not
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TaskForgeError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskForgeConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// SQLite store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Database file path. Defaults to `~/.taskforge/taskforge.db`.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn db_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| TaskForgeConfig::home_dir().join("taskforge.db"))
    }
}

/// Notification gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Gateway backend: "http" or "log".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Base URL of the external notifier service (http backend).
    pub url: Option<String>,
}

fn default_backend() -> String {
    "log".into()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self { backend: default_backend(), url: None }
    }
}

impl TaskForgeConfig {
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".taskforge")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from the default path, falling back to defaults when the
    /// file does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TaskForgeError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| TaskForgeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TaskForgeError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
