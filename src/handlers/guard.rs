//! Session cookie handling and role-based route guards.
//!
//! Layering, outermost first:
//! 1. [`load_session`] resolves the cookie into a [`CurrentSession`] extension
//!    on every request.
//! 2. [`redirect_authenticated`] bounces a logged-in caller away from its own
//!    login page.
//! 3. [`require_role`] runs as a `route_layer` on each protected group and
//!    hands the [`Session`] to the handler as an `Extension`.

use crate::app_state::AppState;
use crate::config::SessionConfig;
use crate::domain::{has_role, AppError, Role, Session};
use axum::{
    extract::{Request, State},
    http::{
        header::{InvalidHeaderValue, COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub(crate) const SESSION_COOKIE_NAME: &str = "portal_session";

pub(crate) const USER_LOGIN_PATH: &str = "/login";
pub(crate) const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub(crate) const USER_HOME_PATH: &str = "/user/home";
pub(crate) const ADMIN_HOME_PATH: &str = "/admin/dashboard";

/// Session resolved from the request cookie, `None` when absent or expired.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

/// Where each role logs in.
pub(crate) fn login_path(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_LOGIN_PATH,
        Role::User => USER_LOGIN_PATH,
    }
}

/// Builds the `HttpOnly` session cookie. `Max-Age` matches the session TTL.
pub(crate) fn session_cookie(
    config: &SessionConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    // ---
    let max_age = config.ttl.as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie(
    config: &SessionConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    // ---
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    // ---
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

/// Resolves the session cookie for every request.
///
/// A store outage is a 500; a missing or expired session is simply absent.
pub async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // ---
    let session = match extract_session_token(req.headers()) {
        Some(token) => match state.auth().current_session(&token).await {
            Ok(session) => session,
            Err(e) => return e.into_response(),
        },
        None => None,
    };

    if let Some(s) = &session {
        debug!(role = %s.role(), "request carries session");
    }
    req.extensions_mut().insert(CurrentSession(session));
    next.run(req).await
}

/// Sends a caller already holding the matching role away from that role's
/// login page. A user session on `/admin/login` is left alone, and vice versa.
pub async fn redirect_authenticated(req: Request, next: Next) -> Response {
    // ---
    let session = req
        .extensions()
        .get::<CurrentSession>()
        .and_then(|current| current.0.as_ref());

    let target = match req.uri().path() {
        ADMIN_LOGIN_PATH if has_role(session, Role::Admin) => Some(ADMIN_HOME_PATH),
        USER_LOGIN_PATH if has_role(session, Role::User) => Some(USER_HOME_PATH),
        _ => None,
    };

    match target {
        Some(path) => Redirect::to(path).into_response(),
        None => next.run(req).await,
    }
}

/// Marker for a role a route group demands.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct AdminOnly;
pub struct UserOnly;

impl RequiredRole for AdminOnly {
    const ROLE: Role = Role::Admin;
}

impl RequiredRole for UserOnly {
    const ROLE: Role = Role::User;
}

/// Lets the request through only when its session holds `R::ROLE`.
///
/// A missing session and a session of the other role are treated the same:
/// `303 See Other` to the required role's login page.
pub async fn require_role<R: RequiredRole>(mut req: Request, next: Next) -> Response {
    // ---
    let session = req
        .extensions()
        .get::<CurrentSession>()
        .and_then(|current| current.0.clone())
        .filter(|s| has_role(Some(s), R::ROLE));

    let Some(session) = session else {
        let required = R::ROLE;
        debug!(path = %req.uri().path(), %required, "guard rejected request");
        return Redirect::to(login_path(required)).into_response();
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Converts a header build failure into the application error type.
pub(crate) fn cookie_error(e: InvalidHeaderValue) -> AppError {
    AppError::Internal(anyhow::anyhow!("invalid cookie header: {e}"))
}
