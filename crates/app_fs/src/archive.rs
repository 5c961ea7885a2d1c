//! Zip export of a bundle for installation elsewhere

use crate::{
    normalize_lexically, sanitize_name, to_slash_path, validate_path, FsError, Result,
    TempFileRegistry,
};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::result::{ZipError, ZipResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAX_STEM_CHARS: usize = 100;

/// `<safe-name>-<timestamp>.zip`
pub fn archive_file_name(bundle_name: &str, now: DateTime<Local>) -> String {
    let stem: String = sanitize_name(bundle_name)
        .unwrap_or_else(|_| "skill".to_string())
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();

    format!("{}-{}.zip", stem, now.format("%Y%m%d-%H%M%S%3f"))
}

/// Files under `dir` as (absolute, archive-relative) pairs, in stable order.
/// Symlinks are not followed.
fn collect_files(dir: &Path) -> walkdir::Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push((entry.path().to_path_buf(), to_slash_path(relative)));
    }

    Ok(files)
}

/// Stream every file under `source_dir` into `sink` as a zip; returns the entry count
fn write_archive<W: Write + Seek>(source_dir: &Path, sink: W) -> ZipResult<usize> {
    let files = collect_files(source_dir).map_err(std::io::Error::from)?;

    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    for (path, name) in &files {
        zip.start_file(name.as_str(), options)?;
        let mut input = File::open(path)?;
        std::io::copy(&mut input, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(files.len())
}

/// Package `bundle_dir` into a new zip in the registry's directory.
///
/// Entries sit at the archive root (no enclosing bundle folder). The archive
/// is tracked before it is written; on failure it is deleted and untracked.
pub fn export_bundle(
    library_root: &Path,
    bundle_dir: &Path,
    bundle_name: &str,
    registry: &TempFileRegistry,
) -> Result<PathBuf> {
    export_with(library_root, bundle_dir, bundle_name, registry, |dir, file| {
        write_archive(dir, BufWriter::new(file))
    })
}

fn export_with<F>(
    library_root: &Path,
    bundle_dir: &Path,
    bundle_name: &str,
    registry: &TempFileRegistry,
    write: F,
) -> Result<PathBuf>
where
    F: FnOnce(&Path, File) -> ZipResult<usize>,
{
    let dir = validate_path(bundle_dir, library_root)?;

    if dir == normalize_lexically(library_root) {
        return Err(FsError::InvalidPath("the library root cannot be exported".to_string()));
    }
    if !dir.is_dir() {
        return Err(FsError::NotFound(bundle_name.to_string()));
    }

    fs::create_dir_all(registry.dir()).map_err(|e| FsError::ArchiveFailed(e.to_string()))?;

    let mut archive_path = registry.dir().join(archive_file_name(bundle_name, Local::now()));
    let mut attempt = 1;
    while archive_path.exists() {
        let stem = archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        archive_path.set_file_name(format!("{}-{}.zip", stem, attempt));
        attempt += 1;
    }

    registry.register(&archive_path);

    let written = File::create(&archive_path)
        .map_err(ZipError::from)
        .and_then(|file| write(&dir, file));

    match written {
        Ok(count) => {
            tracing::info!(
                bundle = %dir.display(),
                archive = %archive_path.display(),
                files = count,
                "Exported skill"
            );
            Ok(archive_path)
        }
        Err(e) => {
            let _ = fs::remove_file(&archive_path);
            registry.forget(&archive_path);
            tracing::error!(bundle = %dir.display(), error = %e, "Export failed");
            Err(FsError::ArchiveFailed(e.to_string()))
        }
    }
}
