//! Username/password accounts.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`) with a per-user random salt.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params};
use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

const SALT_LEN: usize = 16;
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 64;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username must be 3-64 letters, digits, '_', '-' or '.'")]
    InvalidUsername,
    #[error("password must be at least 8 characters")]
    WeakPassword,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and lowercase a username, rejecting empty, over-long, or
/// punctuation-heavy names.
#[must_use]
pub fn normalize_username(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    let len = normalized.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return None;
    }
    if !normalized
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return None;
    }
    Some(normalized)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt_bytes: [u8; SALT_LEN] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string. Malformed hashes, other
/// algorithms and costs above the current parameters never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    if parsed.algorithm != Algorithm::Argon2id.ident() {
        return false;
    }
    let Ok(params) = Params::try_from(&parsed) else {
        return false;
    };
    if params.m_cost() > Params::DEFAULT_M_COST
        || params.t_cost() > Params::DEFAULT_T_COST
        || params.p_cost() > Params::DEFAULT_P_COST
    {
        return false;
    }
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Create an account.
///
/// # Errors
///
/// Returns a validation error, [`AuthError::UsernameTaken`] for a duplicate
/// name, or a database error.
pub async fn register(pool: &PgPool, username: &str, password: &str) -> Result<User, AuthError> {
    let username = normalize_username(username).ok_or(AuthError::InvalidUsername)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let row = sqlx::query(
        "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)
         ON CONFLICT (username) DO NOTHING
         RETURNING id, username, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&username)
    .bind(&password_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::UsernameTaken)?;

    tracing::info!(%username, "user registered");
    Ok(User { id: row.get("id"), username: row.get("username"), created_at: row.get("created_at") })
}

/// Check credentials and return the account.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] for an unknown user or a wrong
/// password, or a database error.
pub async fn login(pool: &PgPool, username: &str, password: &str) -> Result<User, AuthError> {
    let username = normalize_username(username).ok_or(AuthError::InvalidCredentials)?;
    let row = sqlx::query("SELECT id, username, password_hash, created_at FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let stored: String = row.get("password_hash");
    if !verify_password(password, &stored) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(User { id: row.get("id"), username: row.get("username"), created_at: row.get("created_at") })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
