//! Error types
//!
//! Defines domain-specific error types for each module of the image hosting
//! server.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    InvalidInput(String),
    UsernameTaken(String),
    HashingFailed(String),
    Db(DbError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AuthError::UsernameTaken(u) => write!(f, "Username already exists: {}", u),
            AuthError::HashingFailed(msg) => write!(f, "Password hashing failed: {}", msg),
            AuthError::Db(e) => write!(f, "Credential store error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<DbError> for AuthError {
    fn from(error: DbError) -> Self {
        AuthError::Db(error)
    }
}

/// Database module errors
#[derive(Debug)]
pub enum DbError {
    Open(String, rusqlite::Error),
    MissingTables(Vec<String>),
    DuplicateUsername(String),
    DuplicateStoredFilename(String),
    Sqlite(rusqlite::Error),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Open(path, e) => write!(f, "Failed to open database {}: {}", path, e),
            DbError::MissingTables(tables) => {
                write!(
                    f,
                    "Missing database tables: {}. Run the schema setup first",
                    tables.join(", ")
                )
            }
            DbError::DuplicateUsername(u) => write!(f, "Duplicate username: {}", u),
            DbError::DuplicateStoredFilename(name) => {
                write!(f, "Duplicate stored filename: {}", name)
            }
            DbError::Sqlite(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for DbError {}

impl From<rusqlite::Error> for DbError {
    fn from(error: rusqlite::Error) -> Self {
        DbError::Sqlite(error)
    }
}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    InvalidFileType(String),
    DirectoryCreate(PathBuf, io::Error),
    WriteFailed(PathBuf, io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidFileType(name) => write!(f, "File type not allowed: {}", name),
            StorageError::DirectoryCreate(path, e) => {
                write!(f, "Failed to create directory {}: {}", path.display(), e)
            }
            StorageError::WriteFailed(path, e) => {
                write!(f, "Failed to write file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors from the upload sequence: validation and disk failures leave no
/// metadata behind, a failed metadata commit is compensated by removing the
/// already-written file.
#[derive(Debug)]
pub enum UploadError {
    Storage(StorageError),
    Record(DbError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Storage(e) => write!(f, "Upload failed: {}", e),
            UploadError::Record(e) => write!(f, "Upload metadata commit failed: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<StorageError> for UploadError {
    fn from(error: StorageError) -> Self {
        UploadError::Storage(error)
    }
}

/// Errors when fetching or deleting a stored image on behalf of a user.
#[derive(Debug)]
pub enum AccessError {
    NotFound(i64),
    Forbidden(i64),
    Db(DbError),
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NotFound(id) => write!(f, "Image not found: {}", id),
            AccessError::Forbidden(id) => write!(f, "Access denied for image: {}", id),
            AccessError::Db(e) => write!(f, "Image lookup error: {}", e),
        }
    }
}

impl std::error::Error for AccessError {}

impl From<DbError> for AccessError {
    fn from(error: DbError) -> Self {
        AccessError::Db(error)
    }
}

/// General server error that encompasses all startup failure modes
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Db(DbError),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Db(e) => write!(f, "Database error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<DbError> for ServerError {
    fn from(error: DbError) -> Self {
        ServerError::Db(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}
