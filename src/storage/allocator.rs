//! Storage path allocation
//!
//! Derives a collision-free, per-user storage location for an accepted
//! upload. Uniqueness comes from a 128-bit random token, so concurrent
//! allocations need no coordination; the database's UNIQUE constraint on the
//! stored filename is the defensive backstop.

use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::UserId;
use crate::error::StorageError;

/// An allocated on-disk location for a new upload. No file exists at `path`
/// yet; only the owner directory has been created.
#[derive(Debug, Clone)]
pub struct StorageSlot {
    /// Globally unique leaf name, `{token}.{ext}`.
    pub stored_filename: String,
    pub path: PathBuf,
}

/// Allocate a storage slot under `upload_root/u{owner_id}/`.
///
/// Ensures the per-owner directory exists; `create_dir_all` is idempotent
/// and safe under concurrent calls for the same owner.
pub fn allocate(
    upload_root: &Path,
    owner_id: UserId,
    extension: &str,
) -> Result<StorageSlot, StorageError> {
    let owner_dir = upload_root.join(format!("u{}", owner_id));
    fs::create_dir_all(&owner_dir)
        .map_err(|e| StorageError::DirectoryCreate(owner_dir.clone(), e))?;

    let mut token = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut token);

    let stored_filename = format!("{}.{}", hex::encode(token), extension);
    let path = owner_dir.join(&stored_filename);

    Ok(StorageSlot {
        stored_filename,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_allocations_are_unique() {
        let root = tempfile::tempdir().expect("tempdir");
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let slot = allocate(root.path(), 1, "png").expect("allocate");
            assert!(seen.insert(slot.stored_filename), "duplicate leaf name");
        }
    }

    #[test]
    fn test_owner_directory_created() {
        let root = tempfile::tempdir().expect("tempdir");
        let slot = allocate(root.path(), 7, "jpg").expect("allocate");

        assert!(root.path().join("u7").is_dir());
        assert!(slot.path.starts_with(root.path().join("u7")));
        // The slot names a location; nothing is written yet
        assert!(!slot.path.exists());
    }

    #[test]
    fn test_leaf_carries_extension() {
        let root = tempfile::tempdir().expect("tempdir");
        let slot = allocate(root.path(), 1, "webp").expect("allocate");
        assert!(slot.stored_filename.ends_with(".webp"));
    }

    #[test]
    fn test_allocate_is_idempotent_per_owner() {
        let root = tempfile::tempdir().expect("tempdir");
        allocate(root.path(), 3, "png").expect("first");
        // Second call for the same owner must not fail on the existing dir
        allocate(root.path(), 3, "png").expect("second");
    }
}
