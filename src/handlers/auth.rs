use super::guard::{
    clear_session_cookie, cookie_error, login_path, session_cookie, CurrentSession,
    ADMIN_HOME_PATH, USER_HOME_PATH, USER_LOGIN_PATH,
};
use super::views;
use crate::app_state::AppState;
use crate::domain::{AppError, Role, Session};
use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Missing fields deserialize as empty strings so they surface as form
/// errors instead of extractor rejections.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    is_authenticated: bool,
    role: Option<Role>,
}

/// Redirects to `path` and sets the session cookie.
fn start_session(state: &AppState, session: &Session, path: &str) -> Result<Response, AppError> {
    // ---
    let cookie = session_cookie(state.session_config(), &session.token).map_err(cookie_error)?;
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(path)).into_response())
}

/// `GET /` and `GET /login`.
pub async fn login_form() -> impl IntoResponse {
    views::login_page(None)
}

/// `POST /login`. Blocked accounts get their own message.
#[tracing::instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    // ---
    match state.auth().login_user(&form.email, &form.password).await {
        Ok(session) => start_session(&state, &session, USER_HOME_PATH),
        Err(e) if e.is_form_error() => Ok(views::login_page(Some(&e.to_string())).into_response()),
        Err(e) => Err(e),
    }
}

pub async fn signup_form() -> impl IntoResponse {
    views::signup_page(None)
}

/// `POST /signup`. Success sends the new user to the login page.
#[tracing::instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    // ---
    match state
        .auth()
        .register_user(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to(USER_LOGIN_PATH).into_response()),
        Err(e) if e.is_form_error() => Ok(views::signup_page(Some(&e.to_string())).into_response()),
        Err(e) => Err(e),
    }
}

pub async fn admin_login_form() -> impl IntoResponse {
    views::admin_login_page(None)
}

/// `POST /admin/login` against the configured operator credential.
#[tracing::instrument(skip(state, form))]
pub async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    // ---
    match state.auth().login_admin(&form.email, &form.password).await {
        Ok(session) => start_session(&state, &session, ADMIN_HOME_PATH),
        Err(AppError::InvalidCredentials) => {
            Ok(views::admin_login_page(Some("Invalid admin credentials")).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /logout`. Always clears the cookie, then sends the caller to the login
/// page of the role it held (`/login` when there was no session).
#[tracing::instrument(skip(state, current))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Response, AppError> {
    // ---
    let role = match state.auth().logout(current.0.as_ref()).await {
        Ok(role) => role,
        Err(e) => {
            error!(error = %e, "failed to destroy session");
            current.0.as_ref().map(Session::role)
        }
    };

    let target = role.map_or(USER_LOGIN_PATH, login_path);
    let cookie = clear_session_cookie(state.session_config()).map_err(cookie_error)?;
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(target)).into_response())
}

/// `GET /check-session`.
pub async fn check_session(Extension(current): Extension<CurrentSession>) -> Json<SessionStatus> {
    // ---
    Json(SessionStatus {
        is_authenticated: current.0.is_some(),
        role: current.0.as_ref().map(Session::role),
    })
}
