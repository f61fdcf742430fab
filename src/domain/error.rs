//! Error taxonomy shared by the services and the storage backends.

use thiserror::Error;

/// Failure reported by a storage backend.
///
/// A unique-constraint violation is kept apart from every other failure so the
/// services can turn it into `DuplicateEmail`/`DuplicateUsername` instead of a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the column name.
    #[error("unique constraint violated on `{0}`")]
    Conflict(&'static str),

    /// The store could not be reached or returned an unexpected error.
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the auth and admin services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You are blocked from entering this site")]
    Blocked,

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Username already in use")]
    DuplicateUsername,

    /// Form input rejected before touching storage.
    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(anyhow::Error),

    /// Hashing or other in-process failure unrelated to storage.
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl AppError {
    /// True for the errors that are re-rendered inside the submitting form.
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials
                | AppError::Blocked
                | AppError::DuplicateEmail
                | AppError::DuplicateUsername
                | AppError::Validation(_)
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict("email") => AppError::DuplicateEmail,
            StoreError::Conflict("username") => AppError::DuplicateUsername,
            StoreError::Conflict(field) => {
                AppError::StorageUnavailable(anyhow::anyhow!("unique constraint on {field}"))
            }
            StoreError::Unavailable(e) => AppError::StorageUnavailable(e),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_duplicate_errors() {
        assert!(matches!(
            AppError::from(StoreError::Conflict("email")),
            AppError::DuplicateEmail
        ));
        assert!(matches!(
            AppError::from(StoreError::Conflict("username")),
            AppError::DuplicateUsername
        ));
        assert!(matches!(
            AppError::from(StoreError::Conflict("other")),
            AppError::StorageUnavailable(_)
        ));
    }

    #[test]
    fn form_errors_are_classified() {
        assert!(AppError::Blocked.is_form_error());
        assert!(AppError::Validation("x".into()).is_form_error());
        assert!(!AppError::NotFound.is_form_error());
        assert!(!AppError::StorageUnavailable(anyhow::anyhow!("down")).is_form_error());
    }
}
