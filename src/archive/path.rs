//! Lexical cleaning of archive entry names

use std::path::PathBuf;

use crate::error::{Result, archive};

/// Clean an archive entry name into a path relative to the extraction root
///
/// Resolves `.` and `..` lexically and accepts both `/` and `\` as separators. Returns
/// `Ok(None)` for names that refer to the root itself (e.g. `./`). Fails with `IllegalPath`
/// when the cleaned path is absolute or climbs out of the root.
pub fn clean_entry_path(name: &str) -> Result<Option<PathBuf>> {
    if name.starts_with('/') || name.starts_with('\\') || has_drive_prefix(name) {
        return Err(archive::illegal_path(name));
    }

    let mut components: Vec<&str> = Vec::new();
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if components.pop().is_none() {
                    return Err(archive::illegal_path(name));
                }
            }
            part => components.push(part),
        }
    }

    if components.is_empty() {
        return Ok(None);
    }
    Ok(Some(components.iter().collect()))
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorralError;

    #[test]
    fn test_clean_regular_paths() {
        assert_eq!(
            clean_entry_path("manifest.yml").unwrap(),
            Some(PathBuf::from("manifest.yml"))
        );
        assert_eq!(
            clean_entry_path("./bin//demo").unwrap(),
            Some(PathBuf::from("bin").join("demo"))
        );
        assert_eq!(
            clean_entry_path("bin/../lib/x.so").unwrap(),
            Some(PathBuf::from("lib").join("x.so"))
        );
        assert_eq!(
            clean_entry_path("bin\\demo.exe").unwrap(),
            Some(PathBuf::from("bin").join("demo.exe"))
        );
    }

    #[test]
    fn test_root_entries() {
        assert_eq!(clean_entry_path("./").unwrap(), None);
        assert_eq!(clean_entry_path("a/..").unwrap(), None);
    }

    #[test]
    fn test_rejects_traversal() {
        for name in ["../../evil", "..", "a/../../evil", "./../evil", "..\\evil"] {
            assert!(
                matches!(clean_entry_path(name), Err(CorralError::IllegalPath { .. })),
                "expected IllegalPath for {name}"
            );
        }
    }

    #[test]
    fn test_rejects_absolute() {
        for name in ["/etc/passwd", "\\windows\\system32", "C:\\evil", "c:/evil"] {
            assert!(
                matches!(clean_entry_path(name), Err(CorralError::IllegalPath { .. })),
                "expected IllegalPath for {name}"
            );
        }
    }
}
