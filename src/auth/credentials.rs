//! Credential storage and verification
//!
//! Accounts are stored as username plus an Argon2 password verifier; the raw
//! password never reaches the database.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::info;

use crate::db::{Database, UserId};
use crate::error::{AuthError, DbError};

/// Create a new account and return its id.
///
/// Usernames are trimmed and matched case-sensitively; a taken username is a
/// conflict. Passwords are hashed as supplied (no trimming), but a
/// whitespace-only password counts as empty.
pub fn register(db: &Database, username: &str, password: &str) -> Result<UserId, AuthError> {
    // 1. Reject blank input up front
    let username = username.trim();
    if username.is_empty() || password.trim().is_empty() {
        return Err(AuthError::InvalidInput(
            "username and password are required".to_string(),
        ));
    }

    // 2. Enforce username uniqueness (exact match)
    if db.user_exists(username)? {
        return Err(AuthError::UsernameTaken(username.to_string()));
    }

    // 3. Store only the one-way verifier
    let password_hash = hash_password(password)?;
    match db.insert_user(username, &password_hash) {
        Ok(user_id) => {
            info!("Registered user {} (id {})", username, user_id);
            Ok(user_id)
        }
        // Lost a registration race; same outcome as the existence check
        Err(DbError::DuplicateUsername(taken)) => Err(AuthError::UsernameTaken(taken)),
        Err(e) => Err(AuthError::Db(e)),
    }
}

/// Check a username/password pair against the store.
///
/// Returns `Ok(None)` both for an unknown username and for a wrong password;
/// callers cannot tell the two apart, so the error shape does not leak which
/// usernames exist.
pub fn verify(db: &Database, username: &str, password: &str) -> Result<Option<UserId>, AuthError> {
    let username = username.trim();

    let Some(user) = db.user_by_username(username)? else {
        return Ok(None);
    };

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| AuthError::HashingFailed(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(Some(user.id)),
        Err(_) => Ok(None),
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashingFailed(e.to_string()))
}
