//! Application configuration

use crate::AppError;
use app_fs::absolute_path;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub library: LibraryConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library root; `~/.claude/skills` when unset
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where archives are written; a folder in the OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Archives older than this are pruned at startup
    pub max_age_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            max_age_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let config_error = |e: &dyn std::fmt::Display| AppError::Config(format!("{}: {}", path.display(), e));

        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| config_error(&e))?;
            let config: Self = toml::from_str(&content).map_err(|e| config_error(&e))?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("dev", "SkillDesk", "SkillDesk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Absolute library root; relative settings are taken from the working directory
    pub fn library_root(&self) -> PathBuf {
        let root = self.library.root.clone().unwrap_or_else(|| {
            dirs_next::home_dir()
                .map(|home| home.join(".claude").join("skills"))
                .unwrap_or_else(|| PathBuf::from("./skills"))
        });
        absolute_path(&root)
    }

    /// Absolute export directory
    pub fn export_dir(&self) -> PathBuf {
        let dir = self
            .export
            .temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("skill-desk-exports"));
        absolute_path(&dir)
    }

    pub fn max_archive_age(&self) -> Duration {
        Duration::from_secs(self.export.max_age_secs)
    }
}
