//! Storage operations
//!
//! File system writes and removals backing uploaded images.

use log::{info, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::StorageError;

/// Write an upload's bytes to its allocated path.
///
/// On failure any partial file is removed best-effort; no metadata row
/// references the path at this point, so a leftover would only be an orphan.
pub fn write_bytes(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Err(e) = fs::write(path, data) {
        remove_file_quiet(path);
        return Err(StorageError::WriteFailed(path.to_path_buf(), e));
    }
    info!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Best-effort unlink: a missing file counts as success, any other failure
/// is logged and swallowed, leaving a reclaimable orphan at worst.
pub fn remove_file_quiet(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => info!("Removed file {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("a.png");
        write_bytes(&path, b"pixels").expect("write");
        assert_eq!(fs::read(&path).expect("read"), b"pixels");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("no-such-dir").join("a.png");
        assert!(matches!(
            write_bytes(&path, b"pixels"),
            Err(StorageError::WriteFailed(_, _))
        ));
    }

    #[test]
    fn test_remove_missing_file_is_success() {
        let root = tempfile::tempdir().expect("tempdir");
        // Removing a path that never existed must not panic or log an error
        remove_file_quiet(&root.path().join("ghost.png"));
    }

    #[test]
    fn test_remove_existing_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join("a.png");
        fs::write(&path, b"pixels").expect("write");
        remove_file_quiet(&path);
        assert!(!path.exists());
    }
}
