//! SkillDesk File System Layer
//!
//! Everything that touches the skill library on disk lives here:
//! - Sandbox: resolves user-supplied paths and rejects escapes
//! - Sanitize: strips hostile characters from names and relative paths
//! - Classify: editable / content-type decisions per filename
//! - Tree: ordered, typed listing of a bundle directory
//! - Library: bundle create / load / import / save / delete / list
//! - BundleFiles: node create / rename / move / delete / upload
//! - Archive: zip export with temp-file tracking

mod sandbox;
mod sanitize;
mod classify;
mod tree;
mod encoding;
mod file_operations;
mod library;
mod archive;
mod temp_registry;

pub use sandbox::{absolute_path, validate_path, normalize_lexically, to_slash_path, Sandbox};
pub use sanitize::{sanitize_name, sanitize_relative_path, sanitize_bundle_name, is_valid_bundle_name};
pub use classify::{classify, is_editable, ContentType};
pub use tree::{build_tree, DirectoryLister, ListedEntry, OsLister, TreeNode};
pub use encoding::{decode_text, encode_like, DecodedText};
pub use file_operations::{BundleFiles, UploadFile, UploadReport};
pub use library::{
    bundle_dir_of, extract_description, BundleSummary, FileContent, LoadTarget, LoadedBundle,
    SkillLibrary, NO_DESCRIPTION,
};
pub use archive::{archive_file_name, export_bundle};
pub use temp_registry::TempFileRegistry;

use std::path::PathBuf;
use thiserror::Error;

/// Reserved manifest file every bundle carries at its root
pub const MANIFEST_FILE: &str = "SKILL.md";

/// Bundle name that can never be used
pub const RESERVED_BUNDLE_NAME: &str = "skill";

/// Dependency cache directory hidden from every listing
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Maximum length of any single name
pub const MAX_NAME_LEN: usize = 255;

/// Files above this size are never loaded into the editor (10 MiB)
pub const MAX_EDITABLE_SIZE: u64 = 10 * 1024 * 1024;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Path escapes sandbox: {0}")]
    PathEscape(PathBuf),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("{0} is protected and cannot be changed")]
    ProtectedFile(String),

    #[error("Listing failed for {path}: {source}")]
    ListingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive failed: {0}")]
    ArchiveFailed(String),

    #[error("Create failed for {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Save failed for {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    /// Text that is safe to show to the user.
    ///
    /// Sandbox escapes never echo the path, and I/O-layer failures hide the
    /// underlying reason (it is logged instead).
    pub fn user_message(&self) -> String {
        match self {
            FsError::PathEscape(_) => "Access denied".to_string(),
            FsError::InvalidName(_)
            | FsError::InvalidPath(_)
            | FsError::NotFound(_)
            | FsError::AlreadyExists(_)
            | FsError::ProtectedFile(_) => self.to_string(),
            FsError::ListingFailed { .. } => "Failed to list files".to_string(),
            FsError::ArchiveFailed(_) => "Failed to create archive".to_string(),
            FsError::CreateFailed { .. } => "Failed to create".to_string(),
            FsError::SaveFailed { .. } => "Failed to save".to_string(),
            FsError::Io(_) => "Operation failed".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
