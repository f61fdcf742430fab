//! In-process user store used by the `memory` backend and by tests.
//!
//! Mirrors the Postgres schema constraints: `username` and `email` are unique
//! and violations are reported as `StoreError::Conflict`.

use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{RepositoryPtr, StoreError, StoreResult, User, UserRepository, UserUpdate};

/// Creates a new, empty in-memory repository.
pub fn create_memory_repository() -> RepositoryPtr {
    Arc::new(MemoryRepository::default())
}

#[derive(Default)]
pub struct MemoryRepository {
    // Insertion order doubles as creation order.
    users: RwLock<Vec<User>>,
}

/// Checks the unique columns against every record except `skip`.
fn check_unique(
    users: &[User],
    username: &str,
    email: &str,
    skip: Option<Uuid>,
) -> StoreResult<()> {
    // ---
    for u in users.iter().filter(|u| Some(u.id) != skip) {
        if u.email == email {
            return Err(StoreError::Conflict("email"));
        }
        if u.username == username {
            return Err(StoreError::Conflict("username"));
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl UserRepository for MemoryRepository {
    // ---
    async fn create_user(&self, user: User) -> StoreResult<User> {
        // ---
        let mut users = self.users.write().await;
        check_unique(&users, &user.username, &user.email, None)?;
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        // ---
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        // ---
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self, search: Option<&str>) -> StoreResult<Vec<User>> {
        // ---
        let users = self.users.read().await;
        let Some(term) = search.map(str::to_lowercase) else {
            return Ok(users.clone());
        };

        Ok(users
            .iter()
            .filter(|u| {
                u.username.to_lowercase().contains(&term) || u.email.to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }

    async fn update_user(&self, user_id: Uuid, update: &UserUpdate) -> StoreResult<bool> {
        // ---
        let mut users = self.users.write().await;
        let Some(index) = users.iter().position(|u| u.id == user_id) else {
            return Ok(false);
        };
        check_unique(&users, &update.username, &update.email, Some(user_id))?;

        let user = &mut users[index];
        user.username = update.username.clone();
        user.email = update.email.clone();
        user.role = update.role;
        Ok(true)
    }

    async fn set_blocked(&self, user_id: Uuid, blocked: bool) -> StoreResult<bool> {
        // ---
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.is_blocked = blocked;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, user_id: Uuid) -> StoreResult<bool> {
        // ---
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != user_id);
        Ok(users.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
