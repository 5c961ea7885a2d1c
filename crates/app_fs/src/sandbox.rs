//! Path sandbox - the single choke point between user input and the disk

use crate::{FsError, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components at the string level.
///
/// Relative paths keep leading `..` segments that cannot be popped, so an
/// escape from a relative base stays visible to the prefix check.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `/..` is still `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Resolve `requested` against `base` and reject anything outside it.
///
/// Relative inputs are joined to `base`; absolute inputs are used as-is but
/// must still land inside `base`. Returns the resolved absolute path.
pub fn validate_path(requested: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<PathBuf> {
    let requested = requested.as_ref();
    let base = normalize_lexically(base.as_ref());

    let candidate = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        base.join(requested)
    };
    let resolved = normalize_lexically(&candidate);

    // Path::starts_with is component-wise: `/lib/skills-evil` is not under `/lib/skills`
    if resolved.starts_with(&base) {
        Ok(resolved)
    } else {
        tracing::error!(
            requested = %requested.display(),
            base = %base.display(),
            "Blocked path outside sandbox"
        );
        Err(FsError::PathEscape(requested.to_path_buf()))
    }
}

/// `path` anchored at the working directory when relative, then normalized
pub fn absolute_path(path: &Path) -> PathBuf {
    let anchored = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize_lexically(&anchored)
}

/// Render a relative path with `/` separators regardless of host conventions
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// A trusted base directory that paths are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// A relative root is fixed against the current working directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolute_path(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate a path against this sandbox
    pub fn resolve(&self, requested: impl AsRef<Path>) -> Result<PathBuf> {
        validate_path(requested, &self.root)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.resolve(path).is_ok()
    }

    /// `/`-separated path of `absolute` relative to the root
    pub fn relative_path(&self, absolute: &Path) -> Option<String> {
        normalize_lexically(absolute)
            .strip_prefix(&self.root)
            .ok()
            .map(to_slash_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PathBuf {
        PathBuf::from("/library/skills")
    }

    #[test]
    fn test_parent_segments_escape() {
        for p in ["..", "../x", "../../etc/passwd", "a/../../b", "./../skills-evil"] {
            assert!(
                matches!(validate_path(p, base()), Err(FsError::PathEscape(_))),
                "{} should escape",
                p
            );
        }
    }

    #[test]
    fn test_relative_inside() {
        let resolved = validate_path("my-skill/SKILL.md", base()).unwrap();
        assert_eq!(resolved, PathBuf::from("/library/skills/my-skill/SKILL.md"));
        assert!(resolved.to_string_lossy().starts_with("/library/skills"));

        let resolved = validate_path("a/./b/../c.txt", base()).unwrap();
        assert_eq!(resolved, PathBuf::from("/library/skills/a/c.txt"));
    }

    #[test]
    fn test_base_itself_is_inside() {
        assert_eq!(validate_path("", base()).unwrap(), base());
        assert_eq!(validate_path(".", base()).unwrap(), base());
        assert_eq!(validate_path("/library/skills/", base()).unwrap(), base());
    }

    #[test]
    fn test_absolute_paths() {
        assert!(validate_path("/library/skills/x/SKILL.md", base()).is_ok());
        assert!(validate_path("/etc/passwd", base()).is_err());
        assert!(validate_path("/library/skills/../secrets", base()).is_err());
    }

    #[test]
    fn test_sibling_prefix_is_not_inside() {
        assert!(validate_path("/library/skills-evil/a", base()).is_err());
    }

    #[test]
    fn test_relative_base_keeps_escape() {
        assert!(validate_path("../../data/x", "data").is_err());
        assert_eq!(validate_path("x", "data").unwrap(), PathBuf::from("data/x"));
    }

    #[test]
    fn test_sandbox_relative_path() {
        let sandbox = Sandbox::new("/library/skills/demo");
        let abs = sandbox.resolve("notes/todo.txt").unwrap();
        assert_eq!(sandbox.relative_path(&abs).as_deref(), Some("notes/todo.txt"));
        assert!(!sandbox.contains("../other"));
    }

    #[test]
    fn test_sandbox_root_is_absolute() {
        let sandbox = Sandbox::new("skills/./demo");
        let expected = std::env::current_dir().unwrap().join("skills").join("demo");
        assert!(sandbox.root().is_absolute());
        assert_eq!(sandbox.root(), expected.as_path());
        assert!(sandbox.contains(expected.join("SKILL.md")));
    }
}
