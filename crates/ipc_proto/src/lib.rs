//! Protocol between the SkillDesk core and its presentation layer
//!
//! Every operation is one `Request` answered by exactly one `Response`.
//! On the wire each message is a single JSON line wrapped in an envelope
//! that carries the request id.

use app_fs::{BundleSummary, FileContent, FsError, LoadedBundle, TreeNode, UploadFile, UploadReport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Operations the presentation layer can issue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    CreateBundle {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        content: Option<String>,
    },

    /// Library path, or absolute path of an external `SKILL.md` to import
    LoadBundle { path: String },

    /// Save a manifest or any file inside a bundle
    SaveFile { path: String, content: String },

    DeleteBundle { path: String },

    ListBundles,

    ListFiles { bundle_path: String },

    CreateFile {
        bundle_path: String,
        path: String,
        #[serde(default)]
        content: Option<String>,
    },

    CreateFolder { bundle_path: String, path: String },

    DeleteNode { bundle_path: String, path: String },

    RenameNode {
        bundle_path: String,
        path: String,
        new_name: String,
    },

    MoveNode {
        bundle_path: String,
        from: String,
        to: String,
    },

    LoadFile { path: String },

    UploadFiles {
        bundle_path: String,
        #[serde(default)]
        target_folder: String,
        files: Vec<UploadFile>,
    },

    ExportArchive { bundle_dir: String, bundle_name: String },

    /// The consumer is done with an exported archive
    ReleaseArchive { path: String },
}

impl Request {
    /// Wire name of the operation, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::CreateBundle { .. } => "create_bundle",
            Request::LoadBundle { .. } => "load_bundle",
            Request::SaveFile { .. } => "save_file",
            Request::DeleteBundle { .. } => "delete_bundle",
            Request::ListBundles => "list_bundles",
            Request::ListFiles { .. } => "list_files",
            Request::CreateFile { .. } => "create_file",
            Request::CreateFolder { .. } => "create_folder",
            Request::DeleteNode { .. } => "delete_node",
            Request::RenameNode { .. } => "rename_node",
            Request::MoveNode { .. } => "move_node",
            Request::LoadFile { .. } => "load_file",
            Request::UploadFiles { .. } => "upload_files",
            Request::ExportArchive { .. } => "export_archive",
            Request::ReleaseArchive { .. } => "release_archive",
        }
    }
}

/// Answers to [`Request`]s
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Response {
    BundleCreated { path: PathBuf },
    BundleLoaded(LoadedBundle),
    Saved,
    Deleted,
    Bundles { bundles: Vec<BundleSummary> },
    Tree { nodes: Vec<TreeNode> },
    /// Stored relative path of a created, renamed or moved node
    NodePath { path: String },
    File(FileContent),
    Uploaded(UploadReport),
    Archive { path: PathBuf },
    Released { released: bool },
    Error { code: ErrorCode, message: String },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Failure response with a message that is safe to display
    pub fn from_error(error: &FsError) -> Self {
        Response::Error {
            code: ErrorCode::from(error),
            message: error.user_message(),
        }
    }
}

/// Error classes that cross the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    PathEscape,
    InvalidName,
    InvalidPath,
    NotFound,
    AlreadyExists,
    ProtectedFile,
    ListingFailed,
    ArchiveFailed,
    CreateFailed,
    SaveFailed,
    Io,
    BadRequest,
    Internal,
}

impl From<&FsError> for ErrorCode {
    fn from(error: &FsError) -> Self {
        match error {
            FsError::PathEscape(_) => ErrorCode::PathEscape,
            FsError::InvalidName(_) => ErrorCode::InvalidName,
            FsError::InvalidPath(_) => ErrorCode::InvalidPath,
            FsError::NotFound(_) => ErrorCode::NotFound,
            FsError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            FsError::ProtectedFile(_) => ErrorCode::ProtectedFile,
            FsError::ListingFailed { .. } => ErrorCode::ListingFailed,
            FsError::ArchiveFailed(_) => ErrorCode::ArchiveFailed,
            FsError::CreateFailed { .. } => ErrorCode::CreateFailed,
            FsError::SaveFailed { .. } => ErrorCode::SaveFailed,
            FsError::Io(_) => ErrorCode::Io,
        }
    }
}

/// Request plus correlation id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: Uuid,
    #[serde(flatten)]
    pub request: Request,
}

impl RequestEnvelope {
    pub fn new(request: Request) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
        }
    }
}

/// Response carrying the id of the request it answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: Uuid,
    #[serde(flatten)]
    pub response: Response,
}

/// Protocol errors
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a message as one JSON line (no trailing newline)
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, ProtoError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode_request(line: &str) -> Result<RequestEnvelope, ProtoError> {
    Ok(serde_json::from_str(line.trim())?)
}

pub fn decode_response(line: &str) -> Result<ResponseEnvelope, ProtoError> {
    Ok(serde_json::from_str(line.trim())?)
}
