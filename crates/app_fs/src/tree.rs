//! Tree builder - ordered, typed listing of a bundle directory

use crate::{classify, is_editable, validate_path, ContentType, FsError, Result, DEPENDENCY_DIR};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// One directory entry as reported by a [`DirectoryLister`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ListedEntry {
    pub fn file(name: &str) -> Self {
        Self { name: name.to_string(), is_dir: false }
    }

    pub fn dir(name: &str) -> Self {
        Self { name: name.to_string(), is_dir: true }
    }
}

/// Source of directory listings for the tree builder
pub trait DirectoryLister {
    /// Immediate children of `path`, in any order
    fn list_entries(&self, path: &Path) -> std::io::Result<Vec<ListedEntry>>;

    /// Size in bytes of the file at `path`
    fn file_size(&self, path: &Path) -> std::io::Result<u64>;
}

/// Lister backed by the real file system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLister;

impl DirectoryLister for OsLister {
    fn list_entries(&self, path: &Path) -> std::io::Result<Vec<ListedEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(ListedEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                // Symlinks are not followed
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> std::io::Result<u64> {
        fs::symlink_metadata(path).map(|m| m.len())
    }
}

/// File or folder relative to a bundle root.
///
/// `path` always uses `/` separators and never starts with `/` or holds `..`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        name: String,
        path: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        path: String,
        #[serde(rename = "contentType")]
        content_type: ContentType,
        size: u64,
        editable: bool,
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::Folder { path, .. } | TreeNode::File { path, .. } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Folder { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }
}

/// Hidden entries and the dependency cache never show up in a tree
fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || name == DEPENDENCY_DIR
}

/// Case-insensitive first, lower case before upper case on ties
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => locale_cmp(a.name(), b.name()),
    });
}

/// Recursively list `dir_path`, which must lie inside `root_path`.
///
/// Folders precede files at every level; empty folders keep an empty
/// `children` list. Any I/O failure aborts the whole walk.
pub fn build_tree<L: DirectoryLister + ?Sized>(
    lister: &L,
    dir_path: &Path,
    root_path: &Path,
    relative_prefix: &str,
) -> Result<Vec<TreeNode>> {
    let dir = validate_path(dir_path, root_path)?;

    let entries = lister
        .list_entries(&dir)
        .map_err(|source| FsError::ListingFailed { path: dir.clone(), source })?;

    let mut nodes = Vec::with_capacity(entries.len());

    for entry in entries {
        if is_excluded(&entry.name) {
            continue;
        }

        let path = if relative_prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", relative_prefix, entry.name)
        };
        let full_path = dir.join(&entry.name);

        if entry.is_dir {
            let children = build_tree(lister, &full_path, root_path, &path)?;
            nodes.push(TreeNode::Folder {
                name: entry.name,
                path,
                children,
            });
        } else {
            let size = lister
                .file_size(&full_path)
                .map_err(|source| FsError::ListingFailed { path: full_path.clone(), source })?;
            nodes.push(TreeNode::File {
                content_type: classify(&entry.name),
                editable: is_editable(&entry.name),
                size,
                name: entry.name,
                path,
            });
        }
    }

    sort_nodes(&mut nodes);
    Ok(nodes)
}
