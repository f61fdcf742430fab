use super::error::StoreResult;
use super::user::{User, UserUpdate};
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for user record persistence.
///
/// Implementations must enforce uniqueness of `username` and `email` at write
/// time and report a violation as `StoreError::Conflict` naming the column.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    // ---
    /// Insert a new user.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Get user by exact email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// List users ordered by creation time. With a term, keep those whose
    /// username or email contains it, ignoring case.
    async fn list_users(&self, search: Option<&str>) -> StoreResult<Vec<User>>;

    /// Overwrite username, email and role. Returns `false` if the id is unknown.
    async fn update_user(&self, user_id: Uuid, update: &UserUpdate) -> StoreResult<bool>;

    /// Set the blocked flag. Returns `false` if the id is unknown.
    async fn set_blocked(&self, user_id: Uuid, blocked: bool) -> StoreResult<bool>;

    /// Hard-delete a user. Returns `false` if the id is unknown.
    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> StoreResult<()>;
}

/// Type alias for any backend that implements UserRepository.
pub type RepositoryPtr = Arc<dyn UserRepository>;
