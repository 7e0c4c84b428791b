//! Path identity helpers.
//!
//! Folder paths are the key for overrides, ignores and manual apps. They are
//! compared through [`normalize_key`] so that `C:\Apps\Foo\`, `c:/apps/foo`
//! and `C:\Apps\x\..\Foo` name the same application on Windows.

use std::path::{Component, Path, PathBuf};

/// Canonical string form of a path used for equality checks.
///
/// Separators become `/`, `.` and `..` are folded lexically, repeated and
/// trailing separators are dropped (except for a bare root) and on Windows
/// the result is lowercased.
pub fn normalize_key(path: &Path) -> String {
    let mut key = fold_dots(&path.to_string_lossy().replace('\\', "/"));
    if cfg!(windows) {
        key = key.to_lowercase();
    }
    key
}

pub fn same_path(a: &Path, b: &Path) -> bool {
    normalize_key(a) == normalize_key(b)
}

// Works on the `/`-separated string so Windows spellings fold on any host.
fn fold_dots(key: &str) -> String {
    let prefix = if key.starts_with("//") {
        "//"
    } else if key.starts_with('/') {
        "/"
    } else {
        ""
    };
    let mut parts: Vec<&str> = Vec::new();
    for part in key.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." && !is_drive(last) => {
                    parts.pop();
                }
                Some(&last) if is_drive(last) => {}
                None if !prefix.is_empty() => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    match parts.as_slice() {
        [] if prefix.is_empty() => ".".to_string(),
        [drive] if prefix.is_empty() && is_drive(drive) => format!("{drive}/"),
        _ => format!("{prefix}{}", parts.join("/")),
    }
}

fn is_drive(part: &str) -> bool {
    part.len() == 2 && part.ends_with(':')
}

/// Absolute form of `path` with `.` and `..` folded, without resolving
/// symlinks. Never produces the `\\?\` verbatim prefix, which `cmd.exe`
/// cannot run.
pub fn absolute(path: &Path) -> PathBuf {
    let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Path rendered with the host's separator, for command lines and banners.
pub fn native(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('/', "\\")
    } else {
        s.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_separators_trimmed() {
        assert_eq!(normalize_key(Path::new("/srv/apps/foo/")), "/srv/apps/foo");
        assert_eq!(normalize_key(Path::new("/srv/apps/foo//")), "/srv/apps/foo");
        assert_eq!(normalize_key(Path::new("/")), "/");
    }

    #[test]
    fn test_backslashes_fold_to_forward() {
        let key = normalize_key(Path::new(r"C:\Apps\Foo\"));
        assert!(key.ends_with("apps/foo") || key.ends_with("Apps/Foo"));
        assert!(!key.contains('\\'));
        let drive_root = if cfg!(windows) { "c:/" } else { "C:/" };
        assert_eq!(normalize_key(Path::new("C:/")), drive_root);
    }

    #[test]
    fn test_same_path() {
        assert!(same_path(Path::new("/a/b/"), Path::new("/a/b")));
        assert!(!same_path(Path::new("/a/b"), Path::new("/a/bc")));
    }

    #[test]
    fn test_dot_segments_fold() {
        assert_eq!(normalize_key(Path::new("/srv/x/../apps/./b")), "/srv/apps/b");
        assert_eq!(normalize_key(Path::new("/srv/apps/b/..")), "/srv/apps");
        assert_eq!(normalize_key(Path::new("/../srv")), "/srv");
        assert_eq!(normalize_key(Path::new("../a/./b")), "../a/b");
        assert_eq!(normalize_key(Path::new("a/..")), ".");
        assert!(same_path(Path::new("/srv/x/../apps/b"), Path::new("/srv/apps/b/")));
    }

    #[test]
    fn test_dot_segments_fold_in_windows_spellings() {
        let key = normalize_key(Path::new(r"C:\Apps\x\..\Foo"));
        let expected = if cfg!(windows) {
            "c:/apps/foo"
        } else {
            "C:/Apps/Foo"
        };
        assert_eq!(key, expected);
        let drive_root = if cfg!(windows) { "c:/" } else { "C:/" };
        assert_eq!(normalize_key(Path::new(r"C:\..\..")), drive_root);
    }

    #[test]
    fn test_absolute_folds_parent_components() {
        let abs = absolute(Path::new("/srv/x/../apps/./b"));
        if cfg!(unix) {
            assert_eq!(abs, PathBuf::from("/srv/apps/b"));
        }
        assert!(!abs.components().any(|c| matches!(c, Component::ParentDir)));
        assert!(same_path(&abs, Path::new("/srv/apps/b")));
    }
}
