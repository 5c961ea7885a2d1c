//! Application error types

use app_fs::FsError;
use ipc_proto::{ErrorCode, Response};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Background task failed: {0}")]
    Task(String),

    // ===== Fatal Errors (application termination) =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Fs(_) | AppError::BadRequest(_) | AppError::Task(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Fs(e) => e.user_message(),
            AppError::BadRequest(msg) => format!("Invalid request: {}", msg),
            AppError::Task(_) => "Operation failed".to_string(),
            _ => self.to_string(),
        }
    }

    /// Failure response for the presentation layer; the full error is logged here
    pub fn to_response(&self) -> Response {
        match self {
            AppError::Fs(FsError::PathEscape(path)) => {
                tracing::error!(path = %path.display(), "Sandbox escape rejected");
            }
            AppError::Fs(
                e @ (FsError::ListingFailed { .. }
                | FsError::ArchiveFailed(_)
                | FsError::CreateFailed { .. }
                | FsError::SaveFailed { .. }
                | FsError::Io(_)),
            ) => {
                tracing::error!(error = %e, "Operation failed");
            }
            other if other.is_recoverable() => tracing::warn!(error = %other, "Request rejected"),
            other => tracing::error!(error = %other, "Request failed"),
        }

        match self {
            AppError::Fs(e) => Response::from_error(e),
            AppError::BadRequest(_) => Response::Error {
                code: ErrorCode::BadRequest,
                message: self.user_message(),
            },
            _ => Response::Error {
                code: ErrorCode::Internal,
                message: self.user_message(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fs_errors_are_recoverable() {
        let err = AppError::from(FsError::NotFound("demo".into()));
        assert!(err.is_recoverable());
        assert!(AppError::Task("join".into()).is_recoverable());
        assert!(!AppError::Init("x".into()).is_recoverable());
        assert!(!AppError::Config("x".into()).is_recoverable());
    }

    #[test]
    fn test_response_mapping() {
        let err = AppError::from(FsError::PathEscape(PathBuf::from("/etc")));
        match err.to_response() {
            Response::Error { code, message } => {
                assert_eq!(code, ErrorCode::PathEscape);
                assert_eq!(message, "Access denied");
            }
            other => panic!("unexpected {:?}", other),
        }

        match AppError::Task("join error".into()).to_response() {
            Response::Error { code, message } => {
                assert_eq!(code, ErrorCode::Internal);
                assert_eq!(message, "Operation failed");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
