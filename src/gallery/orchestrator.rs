//! Upload/delete orchestration
//!
//! The metadata row and the on-disk file are one logical unit with two
//! physical halves. Uploads write the file before committing the row and
//! compensate by deleting the file if the commit fails; deletes remove the
//! row first and then unlink the file best-effort. Either way a row without
//! a backing file can never be observed; a file without a row is a tolerated
//! orphan.

use log::{info, warn};
use std::path::Path;

use crate::db::{Database, ImageId, ImageRecord, UserId};
use crate::error::{AccessError, UploadError};
use crate::storage::{allocate, pick_extension, remove_file_quiet, write_bytes};

/// Store an uploaded file for `owner_id` and commit its metadata row.
///
/// The caller has already authenticated the owner and extracted a non-empty
/// payload; everything from filename validation onward happens here.
pub fn store_upload(
    db: &Database,
    upload_root: &Path,
    owner_id: UserId,
    declared_name: &str,
    data: &[u8],
) -> Result<ImageRecord, UploadError> {
    // 1. Validate the declared filename before touching disk
    let extension = pick_extension(declared_name)?;

    // 2. Allocate a per-owner slot; may create the owner directory, never a file
    let slot = allocate(upload_root, owner_id, &extension)?;

    // 3. Write the payload; a failed write leaves no row to dangle
    write_bytes(&slot.path, data)?;

    // 4. Commit the metadata row, compensating with file removal on failure
    match db.insert_image(owner_id, declared_name, &slot.stored_filename, &slot.path) {
        Ok(record) => {
            info!(
                "Stored image {} for user {} as {}",
                record.id, owner_id, record.stored_filename
            );
            Ok(record)
        }
        Err(e) => {
            warn!(
                "Metadata commit failed for {}, removing written file: {}",
                slot.path.display(),
                e
            );
            remove_file_quiet(&slot.path);
            Err(UploadError::Record(e))
        }
    }
}

/// Fetch an image on behalf of `requester`, enforcing ownership.
///
/// An absent id is `NotFound`; an existing image owned by someone else is
/// `Forbidden`. Callers present both the same way so that probing ids does
/// not reveal which images exist.
pub fn fetch_owned(
    db: &Database,
    image_id: ImageId,
    requester: UserId,
) -> Result<ImageRecord, AccessError> {
    let Some(record) = db.image_by_id(image_id)? else {
        return Err(AccessError::NotFound(image_id));
    };

    if record.owner_id != requester {
        return Err(AccessError::Forbidden(image_id));
    }

    Ok(record)
}

/// Delete an image owned by `requester`: row first, then the backing file.
///
/// The file unlink is best-effort; "already absent" counts as success, so a
/// concurrent delete that lost the row race cannot crash here.
pub fn remove_image(
    db: &Database,
    image_id: ImageId,
    requester: UserId,
) -> Result<(), AccessError> {
    let record = fetch_owned(db, image_id, requester)?;

    db.delete_image(record.id)?;
    remove_file_quiet(&record.stored_path);

    info!("Deleted image {} for user {}", record.id, requester);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    fn open_db() -> Database {
        let db = Database::open(":memory:").expect("open in-memory db");
        db.init_schema().expect("init schema");
        db
    }

    fn add_user(db: &Database, name: &str) -> UserId {
        db.insert_user(name, "verifier").expect("insert user")
    }

    #[test]
    fn test_upload_persists_row_and_file() {
        let db = open_db();
        let root = tempfile::tempdir().expect("tempdir");
        let owner = add_user(&db, "alice");

        let record = store_upload(&db, root.path(), owner, "photo.PNG", b"pixels")
            .expect("upload");

        assert_eq!(record.original_filename, "photo.PNG");
        assert_ne!(record.stored_filename, record.original_filename);
        assert!(record.stored_filename.ends_with(".png"));
        assert_eq!(
            std::fs::read(&record.stored_path).expect("read back"),
            b"pixels"
        );

        let listed = db.images_by_owner(owner).expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, record.id);
    }

    #[test]
    fn test_invalid_file_type_has_no_side_effects() {
        let db = open_db();
        let root = tempfile::tempdir().expect("tempdir");
        let owner = add_user(&db, "alice");

        let result = store_upload(&db, root.path(), owner, "script.exe", b"MZ");
        assert!(matches!(
            result,
            Err(UploadError::Storage(StorageError::InvalidFileType(_)))
        ));

        // Validation fails before allocation: no owner directory, no rows
        assert!(!root.path().join(format!("u{}", owner)).exists());
        assert!(db.images_by_owner(owner).expect("list").is_empty());
    }

    #[test]
    fn test_failed_commit_removes_written_file() {
        // A database with no schema accepts no rows, forcing the metadata
        // commit to fail after the file write succeeded.
        let db = Database::open(":memory:").expect("open in-memory db");
        let root = tempfile::tempdir().expect("tempdir");

        let result = store_upload(&db, root.path(), 1, "photo.png", b"pixels");
        assert!(matches!(result, Err(UploadError::Record(_))));

        // Compensation removed the just-written file
        let owner_dir = root.path().join("u1");
        let leftovers: Vec<_> = std::fs::read_dir(&owner_dir)
            .map(|entries| entries.collect())
            .unwrap_or_default();
        assert!(leftovers.is_empty(), "compensation should remove the file");
    }

    #[test]
    fn test_fetch_absent_image_is_not_found() {
        let db = open_db();
        let owner = add_user(&db, "alice");
        assert!(matches!(
            fetch_owned(&db, 999, owner),
            Err(AccessError::NotFound(999))
        ));
    }

    #[test]
    fn test_cross_user_access_is_forbidden() {
        let db = open_db();
        let root = tempfile::tempdir().expect("tempdir");
        let alice = add_user(&db, "alice");
        let bob = add_user(&db, "bob");

        let record =
            store_upload(&db, root.path(), alice, "cat.png", b"pixels").expect("upload");

        assert!(matches!(
            fetch_owned(&db, record.id, bob),
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(
            remove_image(&db, record.id, bob),
            Err(AccessError::Forbidden(_))
        ));

        // The target row and file are unchanged
        assert!(db.image_by_id(record.id).expect("lookup").is_some());
        assert!(record.stored_path.exists());
    }

    #[test]
    fn test_delete_removes_row_and_file() {
        let db = open_db();
        let root = tempfile::tempdir().expect("tempdir");
        let owner = add_user(&db, "alice");

        let record =
            store_upload(&db, root.path(), owner, "cat.png", b"pixels").expect("upload");

        remove_image(&db, record.id, owner).expect("delete");
        assert!(db.images_by_owner(owner).expect("list").is_empty());
        assert!(!record.stored_path.exists());

        // Deleting the same id again reports NotFound, not a crash
        assert!(matches!(
            remove_image(&db, record.id, owner),
            Err(AccessError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_tolerates_missing_file() {
        let db = open_db();
        let root = tempfile::tempdir().expect("tempdir");
        let owner = add_user(&db, "alice");

        let record =
            store_upload(&db, root.path(), owner, "cat.png", b"pixels").expect("upload");
        std::fs::remove_file(&record.stored_path).expect("unlink out of band");

        // Row delete still succeeds; the unlink treats "absent" as done
        remove_image(&db, record.id, owner).expect("delete");
        assert!(db.image_by_id(record.id).expect("lookup").is_none());
    }
}
