//! Password hashing with bcrypt.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking
//! thread pool and are awaited inside the request. Results are never cached.

use crate::domain::{AppError, AppResult};
use anyhow::anyhow;

/// Hash a password using bcrypt with the given cost. The salt is embedded in
/// the returned string.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow!("hashing task failed: {e}")))?
        .map_err(|e| {
            tracing::error!(error = %e, "bcrypt hash error");
            AppError::Internal(e.into())
        })
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// itself is malformed.
pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow!("verify task failed: {e}")))?
        .map_err(|e| {
            tracing::error!(error = %e, "bcrypt verify error");
            AppError::Internal(e.into())
        })
}
