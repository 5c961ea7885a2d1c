//! Application state management

use crate::{AppConfig, AppError, CommandDispatcher};
use app_fs::{SkillLibrary, TempFileRegistry};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::SystemTime;

/// Main application state
pub struct AppState {
    /// Application configuration
    pub config: RwLock<AppConfig>,

    /// Skill library rooted at the configured directory
    pub library: Arc<SkillLibrary>,

    /// Export archives awaiting consumption
    pub registry: Arc<TempFileRegistry>,

    /// Request dispatcher
    pub commands: CommandDispatcher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Stale archives from earlier runs are pruned before any request runs.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let library = Arc::new(SkillLibrary::new(config.library_root()));
        library
            .ensure_root()
            .map_err(|e| AppError::Init(format!("library root {}: {}", library.root().display(), e)))?;

        let registry = Arc::new(TempFileRegistry::new(config.export_dir()));
        let now = SystemTime::now();
        let max_age = config.max_archive_age();
        let pruned = registry.prune_stale_files(now, max_age) + registry.sweep_expired(now, max_age);

        tracing::info!(
            library = %library.root().display(),
            exports = %registry.dir().display(),
            pruned,
            "Application state ready"
        );

        let commands = CommandDispatcher::new(Arc::clone(&library), Arc::clone(&registry));

        Ok(Self {
            config: RwLock::new(config),
            library,
            registry,
            commands,
        })
    }

    /// Delete every archive still tracked
    pub fn shutdown(&self) -> usize {
        self.registry.sweep_all()
    }
}
