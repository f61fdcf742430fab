use super::error::StoreResult;
use super::user::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Who a session was issued to.
///
/// The admin operator is not a stored user, so it carries no user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    // ---
    User { user_id: Uuid, email: String },
    AdminOperator { email: String },
}

impl Identity {
    // ---
    pub fn role(&self) -> Role {
        match self {
            Identity::User { .. } => Role::User,
            Identity::AdminOperator { .. } => Role::Admin,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::User { email, .. } | Identity::AdminOperator { email } => email,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User { user_id, .. } => Some(*user_id),
            Identity::AdminOperator { .. } => None,
        }
    }
}

/// Server-side session keyed by the opaque cookie token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    // ---
    pub token: String,
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    // ---
    /// Issues a session with a fresh random token.
    ///
    /// A TTL past the representable range saturates at the latest timestamp.
    pub fn issue(identity: Identity, ttl: Duration) -> Self {
        // ---
        let created_at = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            token: Uuid::new_v4().to_string(),
            identity,
            created_at,
            expires_at,
        }
    }

    pub fn role(&self) -> Role {
        self.identity.role()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Abstraction for server-side session persistence with a fixed TTL.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    // ---
    /// Persist a newly issued session until its `expires_at`.
    async fn save(&self, session: &Session) -> StoreResult<()>;

    /// Look up a live session. Expired or unknown tokens yield `None`.
    async fn load(&self, token: &str) -> StoreResult<Option<Session>>;

    /// Remove a session. Unknown tokens are not an error.
    async fn destroy(&self, token: &str) -> StoreResult<()>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> StoreResult<()>;
}

/// Type alias for any backend that implements SessionStore.
pub type SessionStorePtr = Arc<dyn SessionStore>;

/// True iff a session exists and its identity holds `required`.
pub fn has_role(session: Option<&Session>, required: Role) -> bool {
    session.is_some_and(|s| s.role() == required)
}
