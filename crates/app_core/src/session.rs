//! Per-client editing session
//!
//! The filesystem core is stateless; whatever the presentation layer has open
//! travels with each call as a `SessionContext` and comes back updated.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Open bundle, open file and unsaved-changes flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Bundle directory
    pub bundle: Option<PathBuf>,
    /// Absolute path of the file in the editor
    pub file: Option<PathBuf>,
    pub dirty: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a bundle with its manifest in the editor
    pub fn open_bundle(&mut self, bundle_dir: &Path, manifest: &Path) {
        self.bundle = Some(bundle_dir.to_path_buf());
        self.file = Some(manifest.to_path_buf());
        self.dirty = false;
    }

    /// Select a file; unsaved edits to the previous file are dropped
    pub fn open_file(&mut self, path: &Path) {
        self.file = Some(path.to_path_buf());
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        if self.file.is_some() {
            self.dirty = true;
        }
    }

    /// A save landed; clears the flag only when it was the open file
    pub fn mark_saved(&mut self, path: &Path) {
        if self.file.as_deref() == Some(path) {
            self.dirty = false;
        }
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_bundle_open(&self, bundle_dir: &Path) -> bool {
        self.bundle.as_deref() == Some(bundle_dir)
    }

    /// A bundle was deleted
    pub fn bundle_removed(&mut self, bundle_dir: &Path) {
        if self.is_bundle_open(bundle_dir) {
            self.close();
        }
    }

    /// A file or folder inside the open bundle was deleted
    pub fn node_removed(&mut self, path: &Path) {
        if self.file.as_deref().map_or(false, |f| f.starts_with(path)) {
            self.file = None;
            self.dirty = false;
        }
    }

    /// A file or folder was renamed or moved; the open file follows it
    pub fn node_moved(&mut self, from: &Path, to: &Path) {
        let rebased = self
            .file
            .as_deref()
            .and_then(|f| f.strip_prefix(from).ok())
            .map(|rest| {
                if rest.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rest)
                }
            });

        if let Some(path) = rebased {
            self.file = Some(path);
        }
    }
}
