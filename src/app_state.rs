//! Application state management.
//!
//! `AppState` is the dependency container handed to every handler through
//! axum's `State` extractor. It is built once at startup, never mutated, and
//! cheap to clone because every backend sits behind an `Arc`.

use crate::config::{AdminConfig, SessionConfig};
use crate::domain::{MetricsPtr, RepositoryPtr, SessionStorePtr};
use crate::services::{AdminService, AuthService};

/// Shared application state passed to all axum handlers.
///
/// Handlers depend on the storage traits, never on a concrete backend; the
/// same router runs over Postgres/Redis in production and over the in-memory
/// stores in tests.
#[derive(Clone)]
pub struct AppState {
    /// User records (Postgres or memory).
    repository: RepositoryPtr,

    /// Server-side sessions keyed by cookie token (Redis or memory).
    sessions: SessionStorePtr,

    metrics: MetricsPtr,

    auth: AuthService,
    admin: AdminService,

    /// Cookie lifetime and attributes.
    session_config: SessionConfig,
}

impl AppState {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        sessions: SessionStorePtr,
        metrics: MetricsPtr,
        admin_config: AdminConfig,
        session_config: SessionConfig,
        bcrypt_cost: u32,
    ) -> Self {
        // ---
        let auth = AuthService::new(
            repository.clone(),
            sessions.clone(),
            metrics.clone(),
            admin_config,
            session_config.ttl,
            bcrypt_cost,
        );
        let admin = AdminService::new(repository.clone(), metrics.clone(), bcrypt_cost);

        AppState {
            repository,
            sessions,
            metrics,
            auth,
            admin,
            session_config,
        }
    }

    pub(crate) fn repository(&self) -> &RepositoryPtr {
        &self.repository
    }

    pub(crate) fn sessions(&self) -> &SessionStorePtr {
        &self.sessions
    }

    pub(crate) fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }

    pub(crate) fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub(crate) fn admin(&self) -> &AdminService {
        &self.admin
    }

    pub(crate) fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }
}
