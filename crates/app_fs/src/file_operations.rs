//! File and folder operations inside a single bundle
//!
//! Every target goes through sanitize-then-validate before touching disk;
//! the bundle directory is the sandbox root for all of them.

use crate::{
    build_tree, sanitize_name, sanitize_relative_path, validate_path, FsError, OsLister, Result,
    Sandbox, TreeNode, MANIFEST_FILE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One file in a batch upload; `name` may hold folder segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of a best-effort upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub uploaded_names: Vec<String>,
    pub count: usize,
}

fn split_segments(raw: &str) -> Vec<&str> {
    raw.split(['/', '\\']).filter(|s| !s.is_empty()).collect()
}

fn is_manifest(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().eq_ignore_ascii_case(MANIFEST_FILE)
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Operations on the nodes of one bundle directory
#[derive(Debug, Clone)]
pub struct BundleFiles {
    sandbox: Sandbox,
}

impl BundleFiles {
    /// `bundle_dir` must already be validated against the library root
    pub fn new(bundle_dir: impl AsRef<Path>) -> Self {
        Self {
            sandbox: Sandbox::new(bundle_dir),
        }
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Ordered tree of the whole bundle
    pub fn list_tree(&self) -> Result<Vec<TreeNode>> {
        build_tree(&OsLister, self.root(), self.root(), "")
    }

    /// Absolute path of an existing node; `/` and `\\` both separate segments
    pub fn resolve_node(&self, raw: &str) -> Result<PathBuf> {
        if Path::new(raw).is_absolute() {
            return self.sandbox.resolve(raw);
        }
        let relative: PathBuf = split_segments(raw).into_iter().collect();
        self.sandbox.resolve(relative)
    }

    /// Resolve a mutation source: the manifest and the bundle root are off limits
    fn resolve_mutable(&self, raw: &str) -> Result<PathBuf> {
        let path = self.resolve_node(raw)?;

        if path.file_name().map_or(false, is_manifest) {
            tracing::warn!(path = %raw, "Refused to modify manifest");
            return Err(FsError::ProtectedFile(MANIFEST_FILE.to_string()));
        }
        if path == self.root() {
            return Err(FsError::InvalidPath("the bundle root cannot be changed".to_string()));
        }

        Ok(path)
    }

    /// Keep the directory portion as given, sanitize only the final name
    fn resolve_new_leaf(&self, raw: &str) -> Result<PathBuf> {
        let segments = split_segments(raw);
        let (leaf, dirs) = segments
            .split_last()
            .ok_or_else(|| FsError::InvalidPath(format!("'{}' is empty", raw)))?;

        let leaf = sanitize_name(leaf)?;
        if leaf == "." || leaf == ".." {
            return Err(FsError::InvalidName(format!("'{}' is not a valid name", leaf)));
        }

        let mut relative: PathBuf = dirs.iter().collect();
        relative.push(leaf);
        self.sandbox.resolve(relative)
    }

    fn display_path(&self, path: &Path) -> String {
        self.sandbox.relative_path(path).unwrap_or_default()
    }

    /// Create a file (parents included) and return its stored relative path
    pub fn create_file(&self, rel_file_path: &str, content: Option<&str>) -> Result<String> {
        let target = self.resolve_new_leaf(rel_file_path)?;
        let display = self.display_path(&target);

        if exists(&target) {
            return Err(FsError::AlreadyExists(display));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| FsError::CreateFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, content.unwrap_or_default()).map_err(|source| {
            FsError::CreateFailed {
                path: target.clone(),
                source,
            }
        })?;

        tracing::info!(path = %target.display(), "Created file");
        Ok(display)
    }

    /// Create a folder (parents included) and return its stored relative path
    pub fn create_folder(&self, rel_folder_path: &str) -> Result<String> {
        let target = self.resolve_new_leaf(rel_folder_path)?;
        let display = self.display_path(&target);

        if exists(&target) {
            return Err(FsError::AlreadyExists(display));
        }

        fs::create_dir_all(&target).map_err(|source| FsError::CreateFailed {
            path: target.clone(),
            source,
        })?;

        tracing::info!(path = %target.display(), "Created folder");
        Ok(display)
    }

    /// Recursively delete a file or folder; the manifest is protected
    pub fn delete_node(&self, rel_target_path: &str) -> Result<()> {
        let target = self.resolve_mutable(rel_target_path)?;

        let metadata = fs::symlink_metadata(&target)
            .map_err(|_| FsError::NotFound(rel_target_path.to_string()))?;

        if metadata.is_dir() {
            fs::remove_dir_all(&target)?;
        } else {
            fs::remove_file(&target)?;
        }

        tracing::info!(path = %target.display(), "Deleted");
        Ok(())
    }

    /// Rename in place; the node never changes parent directory
    pub fn rename_node(&self, rel_old_path: &str, new_name: &str) -> Result<String> {
        let from = self.resolve_mutable(rel_old_path)?;

        let new_name = sanitize_name(new_name)?;
        if new_name == "." || new_name == ".." {
            return Err(FsError::InvalidName(format!("'{}' is not a valid name", new_name)));
        }
        let parent = from.parent().unwrap_or_else(|| self.root());
        let to = validate_path(parent.join(&new_name), self.root())?;

        if !exists(&from) {
            return Err(FsError::NotFound(rel_old_path.to_string()));
        }
        if exists(&to) {
            return Err(FsError::AlreadyExists(self.display_path(&to)));
        }

        fs::rename(&from, &to)?;
        tracing::info!(from = %from.display(), to = %to.display(), "Renamed");

        Ok(self.display_path(&to))
    }

    /// Move to a new relative path, possibly under a different parent
    pub fn move_node(&self, rel_old_path: &str, rel_new_path: &str) -> Result<String> {
        let from = self.resolve_mutable(rel_old_path)?;
        let to = self.sandbox.resolve(sanitize_relative_path(rel_new_path)?)?;

        if !exists(&from) {
            return Err(FsError::NotFound(rel_old_path.to_string()));
        }
        if exists(&to) {
            return Err(FsError::AlreadyExists(self.display_path(&to)));
        }
        if to.starts_with(&from) {
            return Err(FsError::InvalidPath(
                "a folder cannot be moved into itself".to_string(),
            ));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;
        tracing::info!(from = %from.display(), to = %to.display(), "Moved");

        Ok(self.display_path(&to))
    }

    /// Write a batch of files under `target_folder`.
    ///
    /// Best-effort: a file that cannot be sanitized, validated or written is
    /// logged and left out of the report; the rest still land.
    pub fn upload_files(&self, target_folder: &str, files: Vec<UploadFile>) -> Result<UploadReport> {
        let target_dir = if split_segments(target_folder).is_empty() {
            self.root().to_path_buf()
        } else {
            self.sandbox.resolve(sanitize_relative_path(target_folder)?)?
        };

        fs::create_dir_all(&target_dir).map_err(|source| FsError::CreateFailed {
            path: target_dir.clone(),
            source,
        })?;

        let mut report = UploadReport::default();

        for file in files {
            match self.write_upload(&target_dir, &file) {
                Ok(name) => report.uploaded_names.push(name),
                Err(e) => {
                    tracing::warn!(name = %file.name, error = %e, "Skipped uploaded file");
                }
            }
        }

        report.count = report.uploaded_names.len();
        tracing::info!(
            target = %target_dir.display(),
            count = report.count,
            "Upload finished"
        );
        Ok(report)
    }

    fn write_upload(&self, target_dir: &Path, file: &UploadFile) -> Result<String> {
        let clean = sanitize_relative_path(&file.name)?;
        let dest = validate_path(target_dir.join(&clean), self.root())?;

        if dest.parent() == Some(self.root()) && dest.file_name().map_or(false, is_manifest) {
            return Err(FsError::ProtectedFile(MANIFEST_FILE.to_string()));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, &file.bytes)?;

        Ok(crate::to_slash_path(&clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> (tempfile::TempDir, BundleFiles) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "---\nname: demo\n---\n").unwrap();
        let files = BundleFiles::new(dir.path());
        (dir, files)
    }

    #[test]
    fn test_create_file_nested() {
        let (dir, files) = bundle();
        let stored = files.create_file("docs/guide/my notes.md", Some("hi")).unwrap();
        assert_eq!(stored, "docs/guide/mynotes.md");
        assert_eq!(
            fs::read_to_string(dir.path().join("docs/guide/mynotes.md")).unwrap(),
            "hi"
        );

        // Default content is empty
        files.create_file("empty.txt", None).unwrap();
        assert_eq!(fs::read(dir.path().join("empty.txt")).unwrap().len(), 0);
    }

    #[test]
    fn test_create_file_rejects_escape_and_duplicates() {
        let (_dir, files) = bundle();
        assert!(matches!(
            files.create_file("../../outside.txt", None),
            Err(FsError::PathEscape(_))
        ));
        files.create_file("a.txt", None).unwrap();
        assert!(matches!(
            files.create_file("a.txt", None),
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_create_folder() {
        let (dir, files) = bundle();
        assert_eq!(files.create_folder("assets/img").unwrap(), "assets/img");
        assert!(dir.path().join("assets/img").is_dir());
        assert!(matches!(
            files.create_folder("assets"),
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_manifest_is_protected() {
        let (dir, files) = bundle();
        assert!(matches!(
            files.delete_node(MANIFEST_FILE),
            Err(FsError::ProtectedFile(_))
        ));
        assert!(matches!(
            files.rename_node(MANIFEST_FILE, "X.md"),
            Err(FsError::ProtectedFile(_))
        ));
        assert!(matches!(
            files.move_node(MANIFEST_FILE, "docs/SKILL.md"),
            Err(FsError::ProtectedFile(_))
        ));
        assert!(dir.path().join(MANIFEST_FILE).exists());
        assert!(!dir.path().join("X.md").exists());
    }

    #[test]
    fn test_delete_node() {
        let (dir, files) = bundle();
        files.create_file("tmp/a.txt", None).unwrap();
        files.delete_node("tmp").unwrap();
        assert!(!dir.path().join("tmp").exists());

        assert!(matches!(files.delete_node("tmp"), Err(FsError::NotFound(_))));
        assert!(matches!(files.delete_node(""), Err(FsError::InvalidPath(_))));
        assert!(matches!(files.delete_node("../x"), Err(FsError::PathEscape(_))));
    }

    #[test]
    fn test_rename_collision_leaves_source() {
        let (dir, files) = bundle();
        fs::write(dir.path().join("a.txt"), "A").unwrap();
        fs::write(dir.path().join("b.txt"), "B").unwrap();

        assert!(matches!(
            files.rename_node("a.txt", "b.txt"),
            Err(FsError::AlreadyExists(_))
        ));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "A");
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "B");
    }

    #[test]
    fn test_rename_stays_in_parent() {
        let (dir, files) = bundle();
        files.create_file("notes/old.md", None).unwrap();
        let renamed = files.rename_node("notes/old.md", "../new.md").unwrap();
        assert_eq!(renamed, "notes/..new.md");
        assert!(dir.path().join("notes/..new.md").exists());

        assert!(matches!(
            files.rename_node("missing.md", "x.md"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_move_reparents() {
        let (dir, files) = bundle();
        files.create_file("todo.txt", Some("x")).unwrap();
        files.create_folder("notes").unwrap();

        let moved = files.move_node("todo.txt", "notes/todo.txt").unwrap();
        assert_eq!(moved, "notes/todo.txt");
        assert!(dir.path().join("notes/todo.txt").exists());
        assert!(!dir.path().join("todo.txt").exists());

        files.create_file("other.txt", None).unwrap();
        assert!(matches!(
            files.move_node("other.txt", "notes/todo.txt"),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(
            files.move_node("nope.txt", "notes/nope.txt"),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            files.move_node("notes", "notes/inner"),
            Err(FsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_upload_is_best_effort() {
        let (dir, files) = bundle();
        let report = files
            .upload_files(
                "assets",
                vec![
                    UploadFile::new("one.txt", b"1".to_vec()),
                    UploadFile::new("@@@", b"bad".to_vec()),
                    UploadFile::new("deep/two.txt", b"2".to_vec()),
                ],
            )
            .unwrap();

        assert_eq!(report.count, 2);
        assert_eq!(report.uploaded_names, vec!["one.txt", "deep/two.txt"]);
        assert!(dir.path().join("assets/one.txt").exists());
        assert!(dir.path().join("assets/deep/two.txt").exists());
    }

    #[test]
    fn test_upload_never_overwrites_manifest() {
        let (dir, files) = bundle();
        let report = files
            .upload_files("", vec![UploadFile::new("SKILL.md", b"evil".to_vec())])
            .unwrap();
        assert_eq!(report.count, 0);
        assert!(fs::read_to_string(dir.path().join(MANIFEST_FILE))
            .unwrap()
            .contains("name: demo"));
    }

    #[test]
    fn test_list_tree() {
        let (_dir, files) = bundle();
        files.create_file("b.txt", None).unwrap();
        files.create_folder("z").unwrap();
        let tree = files.list_tree().unwrap();
        let names: Vec<_> = tree.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["z", "b.txt", "SKILL.md"]);
    }
}
