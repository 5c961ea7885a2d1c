//! Name and path sanitization for user-supplied identifiers
//!
//! Sanitize first, validate second: everything produced here still goes
//! through the sandbox before it touches disk.

use crate::{FsError, Result, MAX_NAME_LEN, RESERVED_BUNDLE_NAME};
use std::path::PathBuf;

/// Characters allowed in file and folder names
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Characters allowed in bundle names (after lower-casing)
fn is_bundle_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

/// Strip every character outside `[A-Za-z0-9._-]`
pub fn sanitize_name(raw: &str) -> Result<String> {
    let clean: String = raw.chars().filter(|c| is_name_char(*c)).collect();

    if clean.is_empty() {
        return Err(FsError::InvalidName(format!("'{}' has no usable characters", raw)));
    }
    if clean.len() > MAX_NAME_LEN {
        return Err(FsError::InvalidName(format!(
            "name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(clean)
}

/// Sanitize every segment of a relative path.
///
/// Both `/` and `\` separate segments. Segments that sanitize to nothing,
/// `.` or `..` are dropped; the rest are joined with the host separator.
pub fn sanitize_relative_path(raw: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    let mut segments = 0;

    for segment in raw.split(['/', '\\']) {
        let name = match sanitize_name(segment) {
            Ok(name) => name,
            Err(_) if segment.chars().any(is_name_char) => {
                return Err(FsError::InvalidName(format!(
                    "segment exceeds {} characters",
                    MAX_NAME_LEN
                )));
            }
            Err(_) => continue,
        };

        if name == "." || name == ".." {
            continue;
        }

        clean.push(name);
        segments += 1;
    }

    if segments == 0 {
        return Err(FsError::InvalidPath(format!("'{}' has no usable segments", raw)));
    }

    Ok(clean)
}

/// Lower-case and strip to `[a-z0-9-]`; rejects the reserved `skill` name
pub fn sanitize_bundle_name(raw: &str) -> Result<String> {
    let clean: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| is_bundle_char(*c))
        .collect();

    if clean.is_empty() {
        return Err(FsError::InvalidName(format!(
            "'{}' is not a valid skill name",
            raw
        )));
    }
    if clean.len() > MAX_NAME_LEN {
        return Err(FsError::InvalidName(format!(
            "skill name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }
    if clean == RESERVED_BUNDLE_NAME {
        return Err(FsError::InvalidName(format!(
            "'{}' is a reserved name",
            RESERVED_BUNDLE_NAME
        )));
    }

    Ok(clean)
}

/// True when `name` is already a clean bundle name
pub fn is_valid_bundle_name(name: &str) -> bool {
    sanitize_bundle_name(name).map_or(false, |clean| clean == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("my notes (v2).md").unwrap(), "mynotesv2.md");
        assert_eq!(sanitize_name("../../etc").unwrap(), "....etc");
        assert!(matches!(sanitize_name("@@@"), Err(FsError::InvalidName(_))));
        assert!(sanitize_name(&"a".repeat(256)).is_err());
        assert!(sanitize_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn test_sanitize_relative_path() {
        let p = sanitize_relative_path("docs\\guide/intro.md").unwrap();
        assert_eq!(p, PathBuf::from("docs").join("guide").join("intro.md"));

        let p = sanitize_relative_path("../../secret/./x.txt").unwrap();
        assert_eq!(p, PathBuf::from("secret").join("x.txt"));

        let p = sanitize_relative_path("/abs//a b.txt").unwrap();
        assert_eq!(p, PathBuf::from("abs").join("ab.txt"));

        assert!(matches!(
            sanitize_relative_path("../.."),
            Err(FsError::InvalidPath(_))
        ));
        assert!(matches!(sanitize_relative_path("$$$"), Err(FsError::InvalidPath(_))));
    }

    #[test]
    fn test_sanitize_bundle_name() {
        assert_eq!(sanitize_bundle_name("My Skill!").unwrap(), "myskill");
        assert_eq!(sanitize_bundle_name("PDF-Tools_2").unwrap(), "pdf-tools2");
        assert!(sanitize_bundle_name("SKILL").is_err());
        assert!(sanitize_bundle_name("!!!").is_err());
    }

    #[test]
    fn test_bundle_name_idempotent() {
        for raw in ["Hello World", "a-b-c", "ÄÖÜ-x", "web_Scraper 3", "--", "İstanbul"] {
            let once = sanitize_bundle_name(raw).unwrap();
            let twice = sanitize_bundle_name(&once).unwrap();
            assert_eq!(once, twice);
            assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            assert_ne!(once, "skill");
        }
    }

    #[test]
    fn test_is_valid_bundle_name() {
        assert!(is_valid_bundle_name("my-skill"));
        assert!(!is_valid_bundle_name("My-Skill"));
        assert!(!is_valid_bundle_name("skill"));
        assert!(!is_valid_bundle_name("with space"));
    }
}
