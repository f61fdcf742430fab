//! Registration, login and logout for both login flows.
//!
//! Stored users authenticate against the user repository. The admin operator
//! authenticates against the static credential from configuration and never
//! touches the repository.

use super::password::{hash_password, verify_password};
use crate::config::AdminConfig;
use crate::domain::{
    AppError, AppResult, Identity, MetricsPtr, RepositoryPtr, Role, Session, SessionStorePtr, User,
};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Trims the identifying fields and rejects blanks.
pub(crate) fn normalize_identity(username: &str, email: &str) -> AppResult<(String, String)> {
    // ---
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    Ok((username.to_string(), email.to_string()))
}

/// Hashes the password and inserts a new record.
///
/// The email lookup is only a fast path for the common case; the repository's
/// unique index decides, and its conflict maps to the same error.
pub(crate) async fn insert_user(
    repository: &RepositoryPtr,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
    bcrypt_cost: u32,
) -> AppResult<Uuid> {
    // ---
    let (username, email) = normalize_identity(username, email)?;
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }

    if repository.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(password, bcrypt_cost).await?;
    let user = repository
        .create_user(User::new(username, email, password_hash, role))
        .await?;

    Ok(user.id)
}

#[derive(Clone)]
pub struct AuthService {
    // ---
    repository: RepositoryPtr,
    sessions: SessionStorePtr,
    metrics: MetricsPtr,
    admin: AdminConfig,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        sessions: SessionStorePtr,
        metrics: MetricsPtr,
        admin: AdminConfig,
        session_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        // ---
        Self {
            repository,
            sessions,
            metrics,
            admin,
            session_ttl,
            bcrypt_cost,
        }
    }

    /// Self-service signup. The new account always gets the `user` role.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<Uuid> {
        // ---
        let user_id = insert_user(
            &self.repository,
            username,
            email,
            password,
            Role::User,
            self.bcrypt_cost,
        )
        .await?;

        self.metrics.record_user_created("signup");
        info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Authenticates a stored user and opens a `user` session.
    ///
    /// The blocked flag is consulted only after the password matched.
    pub async fn login_user(&self, email: &str, password: &str) -> AppResult<Session> {
        // ---
        let email = email.trim();
        let Some(user) = self.repository.get_user_by_email(email).await? else {
            warn!("login for unknown email");
            self.metrics.record_login("user", "invalid_credentials");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "login with wrong password");
            self.metrics.record_login("user", "invalid_credentials");
            return Err(AppError::InvalidCredentials);
        }

        if user.is_blocked {
            warn!(user_id = %user.id, "login by blocked user");
            self.metrics.record_login("user", "blocked");
            return Err(AppError::Blocked);
        }

        let session = self
            .open_session(Identity::User {
                user_id: user.id,
                email: user.email,
            })
            .await?;

        self.metrics.record_login("user", "success");
        info!(user_id = %user.id, "user logged in");
        Ok(session)
    }

    /// Authenticates the configured operator and opens an `admin` session.
    pub async fn login_admin(&self, email: &str, password: &str) -> AppResult<Session> {
        // ---
        let email = email.trim();
        if email != self.admin.email {
            warn!("admin login with non-operator email");
            self.metrics.record_login("admin", "invalid_credentials");
            return Err(AppError::InvalidCredentials);
        }

        if !verify_password(password, &self.admin.password_hash).await? {
            warn!("admin login with wrong password");
            self.metrics.record_login("admin", "invalid_credentials");
            return Err(AppError::InvalidCredentials);
        }

        let session = self
            .open_session(Identity::AdminOperator {
                email: email.to_string(),
            })
            .await?;

        self.metrics.record_login("admin", "success");
        info!("admin operator logged in");
        Ok(session)
    }

    /// Resolves a cookie token into a live session.
    pub async fn current_session(&self, token: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.load(token).await?)
    }

    /// Destroys the session and returns the role it held, so the caller can
    /// pick the right login page afterwards.
    pub async fn logout(&self, session: Option<&Session>) -> AppResult<Option<Role>> {
        // ---
        let Some(session) = session else {
            return Ok(None);
        };

        let role = session.role();
        self.sessions.destroy(&session.token).await?;
        info!(%role, "session destroyed");
        Ok(Some(role))
    }

    async fn open_session(&self, identity: Identity) -> AppResult<Session> {
        // ---
        let session = Session::issue(identity, self.session_ttl);
        self.sessions.save(&session).await?;
        Ok(session)
    }
}
