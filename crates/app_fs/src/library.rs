//! Skill library - bundle level operations under the library root

use crate::{
    archive, classify, decode_text, encode_like, is_editable, is_valid_bundle_name, normalize_lexically,
    sanitize_bundle_name, BundleFiles, ContentType, FsError, Result, Sandbox, TempFileRegistry,
    TreeNode, MANIFEST_FILE, MAX_EDITABLE_SIZE, MAX_NAME_LEN,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Shown when a manifest has no `description:` in its header
pub const NO_DESCRIPTION: &str = "No description";

const MAX_DESCRIPTION_CHARS: usize = 200;

/// Entry in the bundle listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSummary {
    pub name: String,
    /// Manifest path
    pub path: PathBuf,
    pub description: String,
}

/// Result of loading a bundle manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedBundle {
    pub content: String,
    pub resolved_path: PathBuf,
    /// True when an external manifest was copied into the library
    pub imported: bool,
}

/// A file opened for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: ContentType,
    pub editable: bool,
    pub too_big: bool,
    /// Present only for editable files within the size limit
    pub content: Option<String>,
    pub encoding: Option<String>,
}

/// How a load request is served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// Path inside the library
    Managed(PathBuf),
    /// Absolute path elsewhere on disk, adopted on load
    ExternalImportCandidate(PathBuf),
}

/// Directory of the bundle a manifest or bundle path refers to
pub fn bundle_dir_of(path: &Path) -> &Path {
    let is_manifest = path
        .file_name()
        .map_or(false, |n| n.to_string_lossy().eq_ignore_ascii_case(MANIFEST_FILE));

    match path.parent() {
        Some(parent) if is_manifest => parent,
        _ => path,
    }
}

/// Pull `description:` out of the leading `---` header.
///
/// First match wins; folded (`>`) and literal (`|`) values are joined onto
/// one line. The result is truncated to 200 characters.
pub fn extract_description(content: &str) -> String {
    let mut lines = content.lines();

    if lines.next().map(str::trim) != Some("---") {
        return NO_DESCRIPTION.to_string();
    }

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed == "---" {
            break;
        }

        let Some(value) = trimmed.strip_prefix("description:") else {
            continue;
        };
        let value = value.trim();

        let text = if value.starts_with('|') || value.starts_with('>') {
            lines
                .by_ref()
                .take_while(|l| l.starts_with(' ') || l.starts_with('\t'))
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            value
                .trim_matches(|c| c == '"' || c == '\'')
                .trim()
                .to_string()
        };

        if text.is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        return text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }

    NO_DESCRIPTION.to_string()
}

fn manifest_template(name: &str, description: &str) -> String {
    let title = name
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let description = match description.trim() {
        "" => "Describe what this skill does and when to use it",
        d => d,
    };

    format!(
        "---\nname: {}\ndescription: {}\n---\n\n# {}\n\n## Instructions\n\n",
        name, description, title
    )
}

/// Write through a hidden sibling file and rename it into place.
///
/// An existing file keeps its permissions.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(parent)?;

    tmp.write_all(bytes)?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_error(path: &Path, e: std::io::Error) -> FsError {
    if e.kind() == std::io::ErrorKind::NotFound {
        FsError::NotFound(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    } else {
        FsError::Io(e)
    }
}

/// The library root and every bundle beneath it
#[derive(Debug, Clone)]
pub struct SkillLibrary {
    sandbox: Sandbox,
}

impl SkillLibrary {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            sandbox: Sandbox::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Create the library root on first use
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(self.root()).map_err(|source| FsError::CreateFailed {
            path: self.root().to_path_buf(),
            source,
        })
    }

    fn manifest_of(&self, name: &str) -> PathBuf {
        self.root().join(name).join(MANIFEST_FILE)
    }

    /// Bundle directory for a manifest or bundle path; must sit directly under the root
    pub fn resolve_bundle_dir(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let resolved = self.sandbox.resolve(path)?;
        let dir = bundle_dir_of(&resolved).to_path_buf();

        if dir.parent() != Some(self.root()) {
            return Err(FsError::InvalidPath(format!(
                "{} is not a skill folder",
                dir.display()
            )));
        }
        Ok(dir)
    }

    /// Create a bundle directory with its manifest; returns the manifest path
    pub fn create_bundle(
        &self,
        name: &str,
        description: &str,
        initial_content: Option<&str>,
    ) -> Result<PathBuf> {
        let name = sanitize_bundle_name(name)?;
        self.ensure_root()?;

        let dir = self.sandbox.resolve(&name)?;
        if dir.exists() {
            return Err(FsError::AlreadyExists(name));
        }

        fs::create_dir(&dir).map_err(|source| match source.kind() {
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists(name.clone()),
            _ => FsError::CreateFailed {
                path: dir.clone(),
                source,
            },
        })?;

        let content = match initial_content {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ => manifest_template(&name, description),
        };

        let manifest = dir.join(MANIFEST_FILE);
        if let Err(source) = fs::write(&manifest, content) {
            let _ = fs::remove_dir_all(&dir);
            return Err(FsError::CreateFailed {
                path: manifest,
                source,
            });
        }

        tracing::info!(name = %name, path = %manifest.display(), "Created skill");
        Ok(manifest)
    }

    /// Decide whether a load request refers to the library or to an external manifest
    pub fn classify_load_target(&self, path: impl AsRef<Path>) -> Result<LoadTarget> {
        let requested = path.as_ref();

        if requested.is_absolute() && !normalize_lexically(requested).starts_with(self.root()) {
            return Ok(LoadTarget::ExternalImportCandidate(requested.to_path_buf()));
        }

        self.sandbox.resolve(requested).map(LoadTarget::Managed)
    }

    /// Load a manifest; external `SKILL.md` files are imported first
    pub fn load_bundle(&self, path: impl AsRef<Path>) -> Result<LoadedBundle> {
        match self.classify_load_target(path)? {
            LoadTarget::Managed(resolved) => {
                let manifest = if resolved.is_dir() {
                    resolved.join(MANIFEST_FILE)
                } else {
                    resolved
                };
                let bytes = fs::read(&manifest).map_err(|e| read_error(&manifest, e))?;

                tracing::debug!(path = %manifest.display(), "Loaded skill");
                Ok(LoadedBundle {
                    content: decode_text(&bytes).text,
                    resolved_path: manifest,
                    imported: false,
                })
            }
            LoadTarget::ExternalImportCandidate(external) => self.import_manifest(&external),
        }
    }

    fn import_manifest(&self, external: &Path) -> Result<LoadedBundle> {
        let is_manifest = external
            .file_name()
            .map_or(false, |n| n.to_string_lossy().eq_ignore_ascii_case(MANIFEST_FILE));
        if !is_manifest {
            return Err(FsError::InvalidPath(format!(
                "only {} files can be opened from outside the library",
                MANIFEST_FILE
            )));
        }

        let bytes = fs::read(external).map_err(|e| read_error(external, e))?;
        let content = decode_text(&bytes).text;

        let candidate = external
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| sanitize_bundle_name(&n.to_string_lossy()).ok())
            .unwrap_or_else(|| format!("skill-{}", chrono::Utc::now().timestamp_millis()));

        self.ensure_root()?;
        let name = self.free_bundle_name(&candidate)?;
        let dir = self.sandbox.resolve(&name)?;

        fs::create_dir_all(&dir).map_err(|source| FsError::CreateFailed {
            path: dir.clone(),
            source,
        })?;
        let manifest = dir.join(MANIFEST_FILE);
        fs::write(&manifest, &bytes).map_err(|source| FsError::CreateFailed {
            path: manifest.clone(),
            source,
        })?;

        tracing::info!(
            from = %external.display(),
            name = %name,
            "Imported external skill"
        );
        Ok(LoadedBundle {
            content,
            resolved_path: manifest,
            imported: true,
        })
    }

    /// `base`, or `base-1`, `base-2`, ... whichever has no manifest yet
    fn free_bundle_name(&self, base: &str) -> Result<String> {
        if !self.manifest_of(base).exists() {
            return Ok(base.to_string());
        }

        for n in 1..=10_000u32 {
            let candidate = format!("{}-{}", base, n);
            if candidate.len() > MAX_NAME_LEN {
                break;
            }
            if !self.manifest_of(&candidate).exists() {
                return Ok(candidate);
            }
        }

        Err(FsError::AlreadyExists(base.to_string()))
    }

    /// Overwrite a manifest or any other file inside a bundle; returns the resolved path
    pub fn save_bundle(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let target = self.sandbox.resolve(path)?;

        let depth = target
            .strip_prefix(self.root())
            .map(|rel| rel.components().count())
            .unwrap_or(0);
        if depth < 2 || target.is_dir() {
            return Err(FsError::InvalidPath(format!(
                "{} is not a file inside a skill",
                target.display()
            )));
        }

        // Files loaded from a legacy charset are written back in it
        let bytes = match fs::read(&target) {
            Ok(original) => encode_like(&original, content),
            Err(_) => content.as_bytes().to_vec(),
        };

        write_atomic(&target, &bytes).map_err(|source| FsError::SaveFailed {
            path: target.clone(),
            source,
        })?;

        tracing::info!(path = %target.display(), bytes = content.len(), "Saved");
        Ok(target)
    }

    /// Remove a bundle directory with everything in it
    pub fn delete_bundle(&self, path: impl AsRef<Path>) -> Result<()> {
        let dir = self.resolve_bundle_dir(path)?;

        if !dir.is_dir() {
            return Err(FsError::NotFound(
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ));
        }

        fs::remove_dir_all(&dir)?;
        tracing::info!(path = %dir.display(), "Deleted skill");
        Ok(())
    }

    /// All bundles under the root, sorted by name.
    ///
    /// A bundle that cannot be read is skipped; a root that cannot be read
    /// yields an empty list.
    pub fn list_bundles(&self) -> Vec<BundleSummary> {
        if let Err(e) = self.ensure_root() {
            tracing::warn!(error = %e, "Library root unavailable");
            return Vec::new();
        }

        let entries = match fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, root = %self.root().display(), "Failed to read library");
                return Vec::new();
            }
        };

        let mut bundles: Vec<BundleSummary> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| self.summarize(&entry.path()))
            .collect();

        bundles.sort_by(|a, b| a.name.cmp(&b.name));
        bundles
    }

    fn summarize(&self, dir: &Path) -> Option<BundleSummary> {
        let name = dir.file_name()?.to_string_lossy().into_owned();

        if !dir.is_dir() || !is_valid_bundle_name(&name) {
            return None;
        }

        let manifest = self.sandbox.resolve(dir.join(MANIFEST_FILE)).ok()?;
        let bytes = match fs::read(&manifest) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(name = %name, error = %e, "Skipping folder without readable manifest");
                return None;
            }
        };

        Some(BundleSummary {
            description: extract_description(&decode_text(&bytes).text),
            name,
            path: manifest,
        })
    }

    /// File metadata plus text content for editable files up to 10 MiB
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<FileContent> {
        let target = self.sandbox.resolve(path)?;
        let metadata = fs::metadata(&target).map_err(|e| read_error(&target, e))?;

        if metadata.is_dir() {
            return Err(FsError::InvalidPath(format!("{} is a folder", target.display())));
        }

        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = metadata.len();
        let editable = is_editable(&name);
        let too_big = size > MAX_EDITABLE_SIZE;

        let (content, encoding) = if editable && !too_big {
            let bytes = fs::read(&target).map_err(|e| read_error(&target, e))?;
            let decoded = decode_text(&bytes);
            (Some(decoded.text), Some(decoded.encoding.to_string()))
        } else {
            (None, None)
        };

        tracing::debug!(path = %target.display(), size, editable, too_big, "Loaded file");
        Ok(FileContent {
            content_type: classify(&name),
            name,
            path: target,
            size,
            editable,
            too_big,
            content,
            encoding,
        })
    }

    /// Node operations for an existing bundle
    pub fn bundle_files(&self, bundle_path: impl AsRef<Path>) -> Result<BundleFiles> {
        let dir = self.resolve_bundle_dir(bundle_path.as_ref())?;
        if !dir.is_dir() {
            return Err(FsError::NotFound(bundle_path.as_ref().display().to_string()));
        }
        Ok(BundleFiles::new(dir))
    }

    /// Ordered file tree of a bundle
    pub fn list_files(&self, bundle_path: impl AsRef<Path>) -> Result<Vec<TreeNode>> {
        self.bundle_files(bundle_path)?.list_tree()
    }

    /// Package a bundle as a zip in the registry's export directory
    pub fn export_bundle(
        &self,
        bundle_dir: impl AsRef<Path>,
        bundle_name: &str,
        registry: &TempFileRegistry,
    ) -> Result<PathBuf> {
        let dir = self.resolve_bundle_dir(bundle_dir)?;
        archive::export_bundle(self.root(), &dir, bundle_name, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> (tempfile::TempDir, SkillLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let lib = SkillLibrary::new(dir.path().join("skills"));
        (dir, lib)
    }

    #[test]
    fn test_create_list_delete_round_trip() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("my-skill", "Does things", None).unwrap();
        assert!(manifest.ends_with("my-skill/SKILL.md"));

        let listed = lib.list_bundles();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "my-skill");
        assert_eq!(listed[0].description, "Does things");

        lib.delete_bundle(&manifest).unwrap();
        assert!(lib.list_bundles().iter().all(|b| b.name != "my-skill"));
        assert!(matches!(lib.delete_bundle(&manifest), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_create_sanitizes_and_rejects_existing() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("PDF Tools", "", Some("# custom")).unwrap();
        assert!(manifest.ends_with("pdftools/SKILL.md"));
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "# custom");

        assert!(matches!(
            lib.create_bundle("pdftools", "", None),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(lib.create_bundle("Skill", "", None), Err(FsError::InvalidName(_))));
    }

    #[test]
    fn test_template_has_front_matter() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("web-scraper", "", None).unwrap();
        let content = fs::read_to_string(manifest).unwrap();
        assert!(content.starts_with("---\nname: web-scraper\n"));
        assert!(content.contains("# Web Scraper"));
    }

    #[test]
    fn test_list_skips_broken_bundles() {
        let (_dir, lib) = library();
        lib.create_bundle("good", "ok", None).unwrap();
        fs::create_dir_all(lib.root().join("no-manifest")).unwrap();
        fs::create_dir_all(lib.root().join("Bad Name")).unwrap();
        fs::write(lib.root().join("Bad Name").join(MANIFEST_FILE), "x").unwrap();
        fs::write(lib.root().join("stray.txt"), "x").unwrap();

        let names: Vec<_> = lib.list_bundles().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["good"]);
    }

    #[test]
    fn test_extract_description() {
        assert_eq!(
            extract_description("---\nname: a\ndescription: \"Quoted\"  \n---\nbody"),
            "Quoted"
        );
        assert_eq!(extract_description("no header\ndescription: x"), NO_DESCRIPTION);
        assert_eq!(extract_description("---\nname: a\n---\ndescription: late"), NO_DESCRIPTION);
        assert_eq!(
            extract_description("---\ndescription: >\n  folded\n  text\nname: a\n---"),
            "folded text"
        );

        let long = format!("---\ndescription: {}\n---", "x".repeat(500));
        assert_eq!(extract_description(&long).chars().count(), 200);
    }

    #[test]
    fn test_load_managed_bundle() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", Some("hello")).unwrap();

        let loaded = lib.load_bundle(&manifest).unwrap();
        assert_eq!(loaded.content, "hello");
        assert!(!loaded.imported);

        let by_relative = lib.load_bundle("demo/SKILL.md").unwrap();
        assert_eq!(by_relative.resolved_path, manifest);

        assert!(matches!(lib.load_bundle("ghost/SKILL.md"), Err(FsError::NotFound(_))));
        assert!(matches!(lib.load_bundle("../x/SKILL.md"), Err(FsError::PathEscape(_))));
    }

    #[test]
    fn test_import_dedups_by_parent_name() {
        let (dir, lib) = library();
        for (i, origin) in ["one", "two"].iter().enumerate() {
            let external = dir.path().join(origin).join("widget");
            fs::create_dir_all(&external).unwrap();
            fs::write(external.join("skill.md"), format!("content {}", i)).unwrap();
        }

        let first = lib.load_bundle(dir.path().join("one/widget/skill.md")).unwrap();
        let second = lib.load_bundle(dir.path().join("two/widget/skill.md")).unwrap();
        assert!(first.imported && second.imported);
        assert_eq!(first.resolved_path, lib.root().join("widget").join(MANIFEST_FILE));
        assert_eq!(second.resolved_path, lib.root().join("widget-1").join(MANIFEST_FILE));

        assert_eq!(lib.load_bundle(&first.resolved_path).unwrap().content, "content 0");
        assert_eq!(lib.load_bundle(&second.resolved_path).unwrap().content, "content 1");
    }

    #[test]
    fn test_import_requires_manifest_name() {
        let (dir, lib) = library();
        let other = dir.path().join("notes.md");
        fs::write(&other, "x").unwrap();
        assert!(matches!(lib.load_bundle(&other), Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_import_falls_back_to_timestamp_name() {
        let (dir, lib) = library();
        let external = dir.path().join("___");
        fs::create_dir_all(&external).unwrap();
        fs::write(external.join(MANIFEST_FILE), "x").unwrap();

        let loaded = lib.load_bundle(external.join(MANIFEST_FILE)).unwrap();
        let name = bundle_dir_of(&loaded.resolved_path)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert!(name.starts_with("skill-"));
        assert!(is_valid_bundle_name(&name));
    }

    #[test]
    fn test_save_bundle() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        lib.save_bundle(&manifest, "updated").unwrap();
        assert_eq!(fs::read_to_string(&manifest).unwrap(), "updated");

        assert!(matches!(
            lib.save_bundle("/etc/hosts", "x"),
            Err(FsError::PathEscape(_))
        ));
        assert!(matches!(
            lib.save_bundle("loose.md", "x"),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(
            lib.save_bundle("demo/missing-dir/a.md", "x"),
            Err(FsError::SaveFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        let script = manifest.parent().unwrap().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        lib.save_bundle(&script, "#!/bin/sh\necho hi\n").unwrap();

        let mode = fs::metadata(&script).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
        assert_eq!(fs::read_to_string(&script).unwrap(), "#!/bin/sh\necho hi\n");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        lib.save_bundle(&manifest, "one").unwrap();
        lib.save_bundle(&manifest, "two").unwrap();

        let names: Vec<_> = fs::read_dir(manifest.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(MANIFEST_FILE)]);
    }

    #[test]
    fn test_load_then_save_keeps_legacy_encoding() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        let notes = manifest.parent().unwrap().join("notes.txt");
        let original = b"caf\xE9 r\xE9sum\xE9";
        fs::write(&notes, original).unwrap();

        let loaded = lib.load_file(&notes).unwrap();
        assert_ne!(loaded.encoding.as_deref(), Some("UTF-8"));

        let edited = format!("{}!", loaded.content.unwrap());
        lib.save_bundle(&notes, &edited).unwrap();

        let saved = fs::read(&notes).unwrap();
        assert_eq!(saved, [&original[..], b"!"].concat());
    }

    #[test]
    fn test_relative_root_keeps_bundles_managed() {
        let lib = SkillLibrary::new("relative-skills");
        let expected = std::env::current_dir().unwrap().join("relative-skills");
        assert_eq!(lib.root(), expected.as_path());

        let manifest = expected.join("demo").join(MANIFEST_FILE);
        assert_eq!(
            lib.classify_load_target(&manifest).unwrap(),
            LoadTarget::Managed(manifest.clone())
        );
        assert!(lib.resolve_bundle_dir(&manifest).is_ok());
    }

    #[test]
    fn test_delete_refuses_library_root() {
        let (_dir, lib) = library();
        lib.ensure_root().unwrap();
        assert!(matches!(lib.delete_bundle(""), Err(FsError::InvalidPath(_))));
        assert!(lib.root().exists());
    }

    #[test]
    fn test_load_file() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", Some("# hi")).unwrap();
        let bundle = manifest.parent().unwrap();
        fs::write(bundle.join("logo.png"), [1u8, 2, 3]).unwrap();

        let text = lib.load_file(&manifest).unwrap();
        assert_eq!(text.content.as_deref(), Some("# hi"));
        assert_eq!(text.content_type, ContentType::Text);
        assert!(text.editable && !text.too_big);

        let image = lib.load_file(bundle.join("logo.png")).unwrap();
        assert!(image.content.is_none());
        assert_eq!(image.size, 3);
        assert_eq!(image.content_type, ContentType::Image);
    }

    #[test]
    fn test_load_file_too_big() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        let big = manifest.parent().unwrap().join("huge.txt");
        let file = fs::File::create(&big).unwrap();
        file.set_len(MAX_EDITABLE_SIZE + 1).unwrap();

        let loaded = lib.load_file(&big).unwrap();
        assert!(loaded.too_big);
        assert!(loaded.editable);
        assert!(loaded.content.is_none());
    }

    #[test]
    fn test_bundle_files_requires_bundle() {
        let (_dir, lib) = library();
        let manifest = lib.create_bundle("demo", "", None).unwrap();
        assert!(lib.bundle_files(&manifest).is_ok());
        assert!(lib.bundle_files(lib.root().join("demo")).is_ok());
        assert!(matches!(lib.bundle_files("ghost"), Err(FsError::NotFound(_))));
        assert!(matches!(
            lib.bundle_files("demo/nested/SKILL.md"),
            Err(FsError::InvalidPath(_))
        ));
    }
}
