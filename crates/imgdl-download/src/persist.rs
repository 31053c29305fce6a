//! Atomic file writes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use imgdl_core::DownloadError;

/// Write `bytes` to `path` so that readers only ever see the old file or the
/// complete new one.
///
/// The data goes into a temporary file in the destination directory, which is
/// then renamed over `path`. Concurrent writers of the same path race
/// harmlessly: the last rename wins.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    let fail = |e: &dyn std::fmt::Display| DownloadError::persist(path, e.to_string());

    let dir = path
        .parent()
        .ok_or_else(|| DownloadError::persist(path, "no parent directory"))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| fail(&e))?;
    tmp.write_all(bytes).map_err(|e| fail(&e))?;
    tmp.as_file().sync_all().map_err(|e| fail(&e))?;
    tmp.persist(path).map_err(|e| fail(&e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_write_creates_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("a.jpg");

        assert_ok!(write_atomic(&target, b"jpeg"));

        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("a.jpg");
        std::fs::write(&target, b"old contents that are longer").unwrap();

        assert_ok!(write_atomic(&target, b"new"));

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let temp = tempfile::tempdir().unwrap();
        write_atomic(&temp.path().join("a.jpg"), b"x").unwrap();
        write_atomic(&temp.path().join("b.jpg"), b"y").unwrap();

        let names: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_missing_directory_is_a_persist_error() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("missing").join("a.jpg");

        let err = assert_err!(write_atomic(&target, b"x"));

        assert!(matches!(err, DownloadError::Persist { path, .. } if path == target));
        assert!(!target.exists());
    }
}
