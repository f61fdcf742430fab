//! User management for the admin panel.
//!
//! Callers are already behind the admin guard; nothing here re-checks the
//! session.

use super::auth::{insert_user, normalize_identity};
use crate::domain::{
    AppError, AppResult, MetricsPtr, RepositoryPtr, Role, UserUpdate, UserView,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Path ids are taken as text; anything that is not a UUID cannot match a record.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

/// Blank or missing selects the default role.
fn parse_role(role: Option<&str>) -> AppResult<Role> {
    // ---
    match role.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(Role::User),
        Some(r) => r
            .parse::<Role>()
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

#[derive(Clone)]
pub struct AdminService {
    // ---
    repository: RepositoryPtr,
    metrics: MetricsPtr,
    bcrypt_cost: u32,
}

impl AdminService {
    // ---
    pub fn new(repository: RepositoryPtr, metrics: MetricsPtr, bcrypt_cost: u32) -> Self {
        Self {
            repository,
            metrics,
            bcrypt_cost,
        }
    }

    /// All users in creation order, or those whose username or email contains
    /// `search` ignoring case.
    pub async fn list_users(&self, search: Option<&str>) -> AppResult<Vec<UserView>> {
        // ---
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let users = self.repository.list_users(search).await?;
        debug!(count = users.len(), ?search, "listed users");
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> AppResult<Uuid> {
        // ---
        let role = parse_role(role)?;
        let user_id =
            insert_user(&self.repository, username, email, password, role, self.bcrypt_cost)
                .await?;

        self.metrics.record_user_created("admin");
        self.metrics.record_admin_action("create");
        info!(%user_id, %role, "admin created user");
        Ok(user_id)
    }

    pub async fn get_user_for_edit(&self, id: &str) -> AppResult<UserView> {
        // ---
        let user_id = parse_id(id).ok_or(AppError::NotFound)?;
        self.repository
            .get_user_by_id(user_id)
            .await?
            .map(UserView::from)
            .ok_or(AppError::NotFound)
    }

    /// Overwrites username, email and role. Password and block status are kept.
    ///
    /// Uniqueness is left to the store, and a conflict here is not a form error.
    pub async fn update_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        role: &str,
    ) -> AppResult<()> {
        // ---
        let user_id = parse_id(id).ok_or(AppError::NotFound)?;
        let (username, email) = normalize_identity(username, email)?;
        let role = parse_role(Some(role))?;

        let update = UserUpdate {
            username,
            email,
            role,
        };
        let found = self
            .repository
            .update_user(user_id, &update)
            .await
            .map_err(|e| AppError::StorageUnavailable(anyhow::Error::new(e)))?;

        if !found {
            return Err(AppError::NotFound);
        }

        self.metrics.record_admin_action("update");
        info!(%user_id, "admin updated user");
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> AppResult<()> {
        // ---
        let Some(user_id) = parse_id(id) else {
            return Ok(());
        };
        if self.repository.delete_user(user_id).await? {
            self.metrics.record_admin_action("delete");
            info!(%user_id, "admin deleted user");
        }
        Ok(())
    }

    pub async fn block_user(&self, id: &str) -> AppResult<()> {
        self.set_blocked(id, true).await
    }

    pub async fn unblock_user(&self, id: &str) -> AppResult<()> {
        self.set_blocked(id, false).await
    }

    async fn set_blocked(&self, id: &str, blocked: bool) -> AppResult<()> {
        // ---
        let Some(user_id) = parse_id(id) else {
            return Ok(());
        };
        if self.repository.set_blocked(user_id, blocked).await? {
            let action = if blocked { "block" } else { "unblock" };
            self.metrics.record_admin_action(action);
            info!(%user_id, blocked, "admin changed block status");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{create_memory_repository, create_noop_metrics};

    fn service() -> (AdminService, RepositoryPtr) {
        let repository = create_memory_repository();
        let service = AdminService::new(repository.clone(), create_noop_metrics().unwrap(), 4);
        (service, repository)
    }

    #[tokio::test]
    async fn search_matches_username_or_email_ignoring_case() {
        let (admin, _) = service();
        admin.create_user("alice", "alice@x.com", "pw", None).await.unwrap();
        admin.create_user("Alina", "bob@x.com", "pw", None).await.unwrap();
        admin.create_user("carol", "carol@x.com", "pw", None).await.unwrap();

        let names: Vec<_> = admin
            .list_users(Some("ali"))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "Alina"]);

        assert_eq!(admin.list_users(Some("   ")).await.unwrap().len(), 3);
        assert_eq!(admin.list_users(None).await.unwrap().len(), 3);
        assert!(admin.list_users(Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_user_role_selection() {
        let (admin, repo) = service();
        let id = admin.create_user("a", "a@x.com", "pw", Some("admin")).await.unwrap();
        assert_eq!(repo.get_user_by_id(id).await.unwrap().unwrap().role, Role::Admin);

        let id = admin.create_user("b", "b@x.com", "pw", Some(" ")).await.unwrap();
        assert_eq!(repo.get_user_by_id(id).await.unwrap().unwrap().role, Role::User);

        let err = admin.create_user("c", "c@x.com", "pw", Some("root")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn create_user_rejects_duplicate_email() {
        let (admin, _) = service();
        admin.create_user("a", "a@x.com", "pw", None).await.unwrap();
        let err = admin.create_user("b", "a@x.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn edit_of_missing_or_malformed_id_is_not_found() {
        let (admin, _) = service();
        assert!(matches!(admin.get_user_for_edit("42").await.unwrap_err(), AppError::NotFound));
        assert!(matches!(
            admin.get_user_for_edit(&Uuid::new_v4().to_string()).await.unwrap_err(),
            AppError::NotFound
        ));
        assert!(matches!(
            admin.update_user("42", "x", "x@x.com", "user").await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn update_keeps_password_and_block_status() {
        let (admin, repo) = service();
        let id = admin.create_user("a", "a@x.com", "pw", None).await.unwrap();
        admin.block_user(&id.to_string()).await.unwrap();
        let before = repo.get_user_by_id(id).await.unwrap().unwrap();

        admin
            .update_user(&id.to_string(), "renamed", "new@x.com", "admin")
            .await
            .unwrap();

        let after = repo.get_user_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.username, "renamed");
        assert_eq!(after.email, "new@x.com");
        assert_eq!(after.role, Role::Admin);
        assert_eq!(after.password_hash, before.password_hash);
        assert!(after.is_blocked);
    }

    #[tokio::test]
    async fn update_conflict_is_a_storage_failure() {
        let (admin, _) = service();
        admin.create_user("a", "a@x.com", "pw", None).await.unwrap();
        let id = admin.create_user("b", "b@x.com", "pw", None).await.unwrap();

        let err = admin
            .update_user(&id.to_string(), "b", "a@x.com", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn update_of_unknown_id_with_taken_values_is_not_found() {
        let (admin, _) = service();
        admin.create_user("alice", "alice@x.com", "pw", None).await.unwrap();

        let err = admin
            .update_user(&Uuid::new_v4().to_string(), "alice", "alice@x.com", "user")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound), "got {err:?}");
    }

    #[tokio::test]
    async fn mutations_on_missing_ids_are_silent() {
        let (admin, _) = service();
        let missing = Uuid::new_v4().to_string();
        for id in ["42", missing.as_str()] {
            assert!(admin.delete_user(id).await.is_ok());
            assert!(admin.block_user(id).await.is_ok());
            assert!(admin.unblock_user(id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn block_unblock_and_delete() {
        let (admin, repo) = service();
        let id = admin.create_user("a", "a@x.com", "pw", None).await.unwrap();

        admin.block_user(&id.to_string()).await.unwrap();
        assert!(repo.get_user_by_id(id).await.unwrap().unwrap().is_blocked);
        admin.unblock_user(&id.to_string()).await.unwrap();
        assert!(!repo.get_user_by_id(id).await.unwrap().unwrap().is_blocked);

        admin.delete_user(&id.to_string()).await.unwrap();
        assert!(repo.get_user_by_id(id).await.unwrap().is_none());
        assert!(admin.list_users(None).await.unwrap().is_empty());
    }
}
