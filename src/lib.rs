// src/lib.rs
use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use handlers::*;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod services;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use config::*;
pub use handlers::CurrentSession;
pub use services::{hash_password, verify_password, AdminService, AuthService};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_repository, // ---
    create_memory_session_store,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_redis_session_store,
    init_database_with_retry,
};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` selects the filter; `LOG_FORMAT=json` switches to JSON lines.
/// Calling it again is harmless.
pub fn init_tracing() {
    // ---
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_portal=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let _ = if json_logs {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
}

/// Build the HTTP router with backends chosen by environment variables.
///
/// `PORTAL_STORAGE_TYPE=postgres` connects to Postgres (running migrations)
/// and Redis; `memory` keeps everything in process.
pub async fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;

    let metrics = if config.server.metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    let (repository, sessions) = match &config.storage {
        StorageConfig::Postgres { database, redis } => {
            let pool = init_database_with_retry(database).await?;
            let redis_client = redis::Client::open(redis.url.clone())?;
            (
                create_postgres_repository(pool),
                create_redis_session_store(redis_client),
            )
        }
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; users and sessions are lost on restart");
            (create_memory_repository(), create_memory_session_store())
        }
    };

    let state = AppState::new(
        repository,
        sessions,
        metrics,
        config.admin,
        config.session,
        config.server.bcrypt_cost,
    );

    Ok(build_router(state))
}

/// Wires routes, guards and response layers around an already built state.
///
/// Layers run outermost first: no-cache headers, tracing, request metrics,
/// session resolution, login-page redirect, then the per-group role guard.
pub fn build_router(state: AppState) -> Router {
    // ---
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/add", get(add_user_form))
        .route("/admin/users/{id}/edit", get(edit_user_form))
        .route("/admin/users/{id}", post(update_user))
        .route("/admin/users/{id}/delete", post(delete_user))
        .route("/admin/users/{id}/block", post(block_user))
        .route("/admin/users/{id}/unblock", post(unblock_user))
        .route_layer(middleware::from_fn(require_role::<AdminOnly>));

    let user_routes = Router::new()
        .route("/user/home", get(home))
        .route_layer(middleware::from_fn(require_role::<UserOnly>));

    Router::new()
        .route("/", get(login_form))
        .route("/login", get(login_form).post(login))
        .route("/signup", get(signup_form).post(signup))
        .route("/logout", get(logout))
        .route("/check-session", get(check_session))
        .route("/admin/login", get(admin_login_form).post(admin_login))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(admin_routes)
        .merge(user_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(redirect_authenticated))
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .layer(middleware::from_fn_with_state(state.clone(), track_http_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .with_state(state)
}
