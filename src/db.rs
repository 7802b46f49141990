//! SQLite-backed persistence for user accounts and image metadata.
//!
//! Uses `rusqlite` with the `bundled` feature so no system SQLite library is
//! required. All calls are synchronous rusqlite operations executed under a
//! `Mutex`; the schema is expected to exist before the server starts
//! (`verify_tables`), with `init_schema` provided for setup tooling and
//! tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::DbError;

/// Tables the server refuses to start without.
const REQUIRED_TABLES: [&str; 2] = ["users", "images"];

pub type UserId = i64;
pub type ImageId = i64;

/// A registered account row.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string; never compared by equality, only verified.
    pub password_hash: String,
}

/// A committed image metadata row. The backing file at `stored_path` must
/// exist for as long as the row does.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: ImageId,
    pub owner_id: UserId,
    /// User-supplied name, untrusted and display-only.
    pub original_filename: String,
    /// System-generated unique on-disk leaf name.
    pub stored_filename: String,
    pub stored_path: PathBuf,
    /// RFC 3339 timestamp assigned at commit time.
    pub created_at: String,
}

/// Relational store backed by a single SQLite database file.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `url`.
    ///
    /// Passing `":memory:"` creates an in-memory database (useful for tests).
    pub fn open(url: &str) -> Result<Self, DbError> {
        let conn =
            Connection::open(url).map_err(|e| DbError::Open(url.to_string(), e))?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.apply_pragmas()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("mutex poisoned")
    }

    fn apply_pragmas(&self) -> Result<(), DbError> {
        self.conn().execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(())
    }

    /// Check that the expected tables exist. Schema setup is a separate
    /// step; a half-provisioned database aborts startup instead of failing
    /// on the first request.
    pub fn verify_tables(&self) -> Result<(), DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let existing = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<String>, _>>()?;

        let missing: Vec<String> = REQUIRED_TABLES
            .iter()
            .filter(|table| !existing.contains(**table))
            .map(|table| table.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DbError::MissingTables(missing))
        }
    }

    /// Create the required tables and indexes if they do not already exist.
    /// Idempotent; used by setup tooling and tests.
    pub fn init_schema(&self) -> Result<(), DbError> {
        self.conn().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                username      TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS images (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id           INTEGER NOT NULL REFERENCES users(id),
                original_filename TEXT NOT NULL,
                stored_filename   TEXT NOT NULL UNIQUE,
                stored_path       TEXT NOT NULL,
                created_at        TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_images_user ON images(user_id);
            ",
        )?;
        Ok(())
    }

    // --------------------
    // User rows
    // --------------------

    /// Case-sensitive existence check for a username.
    pub fn user_exists(&self, username: &str) -> Result<bool, DbError> {
        let exists = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                params![username],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    /// Insert a new account; the UNIQUE constraint on `username` backstops
    /// the caller's existence check under concurrent registration.
    pub fn insert_user(&self, username: &str, password_hash: &str) -> Result<UserId, DbError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::DuplicateUsername(username.to_string())
            } else {
                DbError::Sqlite(e)
            }
        })?;
        Ok(conn.last_insert_rowid())
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<UserRecord>, DbError> {
        let record = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DbError> {
        let record = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // --------------------
    // Image rows
    // --------------------

    /// Commit a metadata row for a file already written to `stored_path`.
    /// `created_at` is assigned here, at commit time. A UNIQUE violation on
    /// `stored_filename` should be unreachable given the random allocator
    /// and is reported as a distinct error.
    pub fn insert_image(
        &self,
        owner_id: UserId,
        original_filename: &str,
        stored_filename: &str,
        stored_path: &Path,
    ) -> Result<ImageRecord, DbError> {
        let created_at = Utc::now().to_rfc3339();
        let path_text = stored_path.to_string_lossy().into_owned();

        let conn = self.conn();
        conn.execute(
            "INSERT INTO images (user_id, original_filename, stored_filename, stored_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![owner_id, original_filename, stored_filename, path_text, created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::DuplicateStoredFilename(stored_filename.to_string())
            } else {
                DbError::Sqlite(e)
            }
        })?;

        Ok(ImageRecord {
            id: conn.last_insert_rowid(),
            owner_id,
            original_filename: original_filename.to_string(),
            stored_filename: stored_filename.to_string(),
            stored_path: stored_path.to_path_buf(),
            created_at,
        })
    }

    /// List a user's images, newest first; ties broken by insertion order.
    /// Computed fresh on every call.
    pub fn images_by_owner(&self, owner_id: UserId) -> Result<Vec<ImageRecord>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, original_filename, stored_filename, stored_path, created_at
             FROM images WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let records = stmt
            .query_map(params![owner_id], row_to_image)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn image_by_id(&self, id: ImageId) -> Result<Option<ImageRecord>, DbError> {
        let record = self
            .conn()
            .query_row(
                "SELECT id, user_id, original_filename, stored_filename, stored_path, created_at
                 FROM images WHERE id = ?1",
                params![id],
                row_to_image,
            )
            .optional()?;
        Ok(record)
    }

    /// Remove an image row. Deleting an id that is already gone is a no-op,
    /// not an error.
    pub fn delete_image(&self, id: ImageId) -> Result<(), DbError> {
        self.conn()
            .execute("DELETE FROM images WHERE id = ?1", params![id])?;
        Ok(())
    }
}

fn row_to_image(row: &rusqlite::Row<'_>) -> Result<ImageRecord, rusqlite::Error> {
    Ok(ImageRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        original_filename: row.get(2)?,
        stored_filename: row.get(3)?,
        stored_path: PathBuf::from(row.get::<_, String>(4)?),
        created_at: row.get(5)?,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
