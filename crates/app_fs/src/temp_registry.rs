//! Tracking of in-flight export archives
//!
//! Archives are registered before their bytes are written, released once the
//! consumer is done with them, pruned by age at startup and swept at exit.

use crate::absolute_path;
use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

fn remove_if_present(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
            false
        }
    }
}

/// Process-wide set of temp files owned by this application
#[derive(Debug)]
pub struct TempFileRegistry {
    dir: PathBuf,
    entries: DashMap<PathBuf, SystemTime>,
}

impl TempFileRegistry {
    /// Registry whose archives live in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: absolute_path(&dir.into()),
            entries: DashMap::new(),
        }
    }

    /// Directory new archives are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn register(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!(path = %path.display(), "Tracking temp file");
        self.entries.insert(path, SystemTime::now());
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stop tracking without touching the file
    pub fn forget(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Consumption event: delete a tracked file and stop tracking it.
    ///
    /// Untracked paths are left alone and reported as `false`.
    pub fn release(&self, path: &Path) -> bool {
        match self.entries.remove(path) {
            Some((path, _)) => {
                remove_if_present(&path);
                tracing::debug!(path = %path.display(), "Released temp file");
                true
            }
            None => false,
        }
    }

    /// Delete tracked files registered more than `max_age` before `now`
    pub fn sweep_expired(&self, now: SystemTime, max_age: Duration) -> usize {
        let expired: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|entry| {
                now.duration_since(*entry.value())
                    .map_or(false, |age| age > max_age)
            })
            .map(|entry| entry.key().clone())
            .collect();

        for path in &expired {
            self.entries.remove(path);
            remove_if_present(path);
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Swept expired temp files");
        }
        expired.len()
    }

    /// Delete leftovers from earlier runs: files in the export directory
    /// last modified more than `max_age` before `now`
    pub fn prune_stale_files(&self, now: SystemTime, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let stale = entry
                .metadata()
                .ok()
                .filter(|m| m.is_file())
                .and_then(|m| m.modified().ok())
                .and_then(|modified| now.duration_since(modified).ok())
                .map_or(false, |age| age > max_age);

            if stale && remove_if_present(&path) {
                self.entries.remove(&path);
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(count = removed, dir = %self.dir.display(), "Pruned stale archives");
        }
        removed
    }

    /// Delete every tracked file; called at shutdown
    pub fn sweep_all(&self) -> usize {
        let paths: Vec<PathBuf> = self.entries.iter().map(|e| e.key().clone()).collect();
        self.entries.clear();

        let removed = paths.iter().filter(|p| remove_if_present(p)).count();
        tracing::info!(tracked = paths.len(), removed, "Swept temp files");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempFileRegistry::new(dir.path());
        let file = dir.path().join("a.zip");
        fs::write(&file, b"zip").unwrap();

        registry.register(&file);
        assert!(registry.is_tracked(&file));

        assert!(registry.release(&file));
        assert!(!file.exists());
        assert!(registry.is_empty());
        assert!(!registry.release(&file));
    }

    #[test]
    fn test_release_ignores_untracked() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempFileRegistry::new(dir.path());
        let file = dir.path().join("keep.txt");
        fs::write(&file, b"x").unwrap();

        assert!(!registry.release(&file));
        assert!(file.exists());
    }

    #[test]
    fn test_sweep_expired() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempFileRegistry::new(dir.path());
        let file = dir.path().join("old.zip");
        fs::write(&file, b"zip").unwrap();
        registry.register(&file);

        let hour = Duration::from_secs(3600);
        assert_eq!(registry.sweep_expired(SystemTime::now(), hour), 0);
        assert!(file.exists());

        let later = SystemTime::now() + Duration::from_secs(7200);
        assert_eq!(registry.sweep_expired(later, hour), 1);
        assert!(!file.exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_prune_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempFileRegistry::new(dir.path());
        fs::write(dir.path().join("left-over.zip"), b"zip").unwrap();

        let hour = Duration::from_secs(3600);
        assert_eq!(registry.prune_stale_files(SystemTime::now(), hour), 0);

        let later = SystemTime::now() + Duration::from_secs(7200);
        assert_eq!(registry.prune_stale_files(later, hour), 1);
        assert!(!dir.path().join("left-over.zip").exists());
    }

    #[test]
    fn test_sweep_all() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempFileRegistry::new(dir.path());
        for name in ["a.zip", "b.zip"] {
            let path = dir.path().join(name);
            fs::write(&path, b"zip").unwrap();
            registry.register(path);
        }
        registry.register(dir.path().join("never-written.zip"));

        assert_eq!(registry.sweep_all(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_dir_prunes_nothing() {
        let registry = TempFileRegistry::new("/definitely/not/here");
        assert_eq!(
            registry.prune_stale_files(SystemTime::now(), Duration::from_secs(1)),
            0
        );
    }
}
