//! Argon2id password hashing, run on the blocking pool.

use anyhow::Context as _;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ApiError;

/// Argon2id hash of a random secret, built with the default parameters so
/// verifying against it costs the same as verifying a stored hash.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$JTu7PifAMO+ECciehyriSQ$d13HxMczKLuXBO4qZMcETn/u1W7T/4TwXnab9OXyx2U";

fn hash_blocking(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        tracing::error!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash a password into a PHC string.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .context("join password hashing task")??;
    Ok(hash)
}

/// Check a password against a stored PHC string. Unparseable hashes never match.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, ApiError> {
    let ok = tokio::task::spawn_blocking(move || verify_blocking(&password, &password_hash))
        .await
        .context("join password verification task")?;
    Ok(ok)
}

/// Spend one verification on a login whose email matched nobody.
pub async fn verify_unknown_user(password: String) -> Result<(), ApiError> {
    verify_password(password, UNKNOWN_USER_HASH.to_owned()).await?;
    Ok(())
}
