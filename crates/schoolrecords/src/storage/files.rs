//! JSON file reads and writes under the data directory.
//!
//! Collections are always written whole. Writes land in a temp file next to
//! the target and are renamed into place.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Create `dir` and its parents if missing.
///
/// # Errors
///
/// Returns [`Error::DirectoryCreate`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Read a JSON file, or `None` if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(&content).map_err(|source| Error::CollectionLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Serialize `value` and replace `path` with it.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    write_atomic(path, content.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::internal(format!("no parent directory for {}", path.display())))?;
    ensure_dir(dir)?;

    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{stem}-{}.tmp", Uuid::new_v4()));

    let write_err = |source: std::io::Error| Error::CollectionWrite {
        path: path.to_path_buf(),
        source,
    };
    fs::write(&tmp, bytes).map_err(write_err)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(source));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Resolve a caller-supplied relative path inside `root`.
///
/// Only plain name components are accepted: no absolute paths, no `..`,
/// no prefixes. The check is lexical so it also covers files that do not
/// exist yet.
///
/// # Errors
///
/// Returns [`Error::PathOutsideRoot`] if the path is empty or would escape
/// `root`.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let outside = || Error::PathOutsideRoot {
        path: relative.to_string(),
    };

    let candidate = Path::new(relative);
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for component in candidate.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(outside());
            }
        }
    }

    if depth == 0 {
        return Err(outside());
    }
    Ok(resolved)
}

/// The file-save primitive: write a JSON document to a path under `root`.
///
/// Only `.json` targets are accepted. Returns the absolute path written.
///
/// # Errors
///
/// Returns [`Error::PathOutsideRoot`] for unsafe paths,
/// [`Error::Validation`] for non-JSON targets, or an I/O error.
pub fn save_file(
    root: &Path,
    relative: &str,
    value: &serde_json::Value,
    pretty: bool,
) -> Result<PathBuf> {
    let path = resolve_within(root, relative)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(Error::validation("filename", "only .json files can be saved"));
    }

    write_json(&path, value, pretty)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("nope.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_empty_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "  \n").unwrap();

        let value: Option<Vec<u32>> = read_json(&path).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_read_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2,").unwrap();

        let err = read_json::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, Error::CollectionLoad { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/values.json");

        write_json(&path, &vec![1u32, 2, 3], false).unwrap();
        let back: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.json");
        write_json(&path, &json!({"a": 1}), true).unwrap();
        write_json(&path, &json!({"a": 2}), true).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["values.json".to_string()]);
    }

    #[test]
    fn test_resolve_within_accepts_plain_paths() {
        let root = Path::new("/data");
        assert_eq!(
            resolve_within(root, "students.json").unwrap(),
            PathBuf::from("/data/students.json")
        );
        assert_eq!(
            resolve_within(root, "./backups/a.json").unwrap(),
            PathBuf::from("/data/backups/a.json")
        );
    }

    #[test]
    fn test_resolve_within_rejects_escapes() {
        let root = Path::new("/data");
        for bad in ["../etc/passwd", "a/../../b.json", "/etc/passwd", "", ".", "./"] {
            let err = resolve_within(root, bad).unwrap_err();
            assert!(
                matches!(err, Error::PathOutsideRoot { .. }),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_save_file_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_file(dir.path(), "settings.json", &json!({"schoolName": "X"}), true)
            .unwrap();

        assert_eq!(path, dir.path().join("settings.json"));
        let back: serde_json::Value = read_json(&path).unwrap().unwrap();
        assert_eq!(back["schoolName"], "X");
    }

    #[test]
    fn test_save_file_rejects_non_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_file(dir.path(), "script.sh", &json!({}), true).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(!dir.path().join("script.sh").exists());
    }
}
