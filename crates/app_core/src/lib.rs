//! SkillDesk Core
//!
//! This crate contains:
//! - Application state management
//! - Request dispatch
//! - Session context
//! - Configuration
//! - Error types

pub mod state;
pub mod config;
pub mod command;
pub mod error;
pub mod session;

pub use state::AppState;
pub use config::{AppConfig, ExportConfig, LibraryConfig, LoggingConfig};
pub use command::CommandDispatcher;
pub use error::AppError;
pub use session::SessionContext;

use once_cell::sync::OnceCell;

/// Global application state
static APP_STATE: OnceCell<AppState> = OnceCell::new();

/// Initialize global application state
pub fn init(config: AppConfig) -> Result<&'static AppState, AppError> {
    let state = AppState::new(config)?;
    APP_STATE
        .set(state)
        .map_err(|_| AppError::Init("AppState already initialized".to_string()))?;
    APP_STATE
        .get()
        .ok_or_else(|| AppError::Init("AppState unavailable after initialization".to_string()))
}

/// Get global application state
pub fn state() -> Option<&'static AppState> {
    APP_STATE.get()
}

/// Sweep temp files; safe to call when never initialized
pub fn shutdown() {
    if let Some(state) = APP_STATE.get() {
        let removed = state.shutdown();
        tracing::info!(removed, "Shutdown complete");
    }
}
