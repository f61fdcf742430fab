//! Admin panel handlers. Every route here sits behind `require_role::<AdminOnly>`.

use super::views;
use crate::app_state::AppState;
use crate::domain::{AppError, Session};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

const USERS_PATH: &str = "/admin/users";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
}

pub async fn dashboard(Extension(session): Extension<Session>) -> impl IntoResponse {
    views::dashboard_page(session.identity.email())
}

/// `GET /admin/users?search=term`.
#[tracing::instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    // ---
    let search = query.search.as_deref();
    let users = state.admin().list_users(search).await?;
    Ok(views::users_page(&users, search).into_response())
}

pub async fn add_user_form() -> impl IntoResponse {
    views::add_user_page(None)
}

#[tracing::instrument(skip(state, form))]
pub async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> Result<Response, AppError> {
    // ---
    let result = state
        .admin()
        .create_user(&form.username, &form.email, &form.password, form.role.as_deref())
        .await;

    match result {
        Ok(_) => Ok(Redirect::to(USERS_PATH).into_response()),
        Err(e) if e.is_form_error() => {
            Ok(views::add_user_page(Some(&e.to_string())).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /admin/users/{id}/edit`. Unknown ids render the 404 page.
#[tracing::instrument(skip(state))]
pub async fn edit_user_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    // ---
    let user = state.admin().get_user_for_edit(&id).await?;
    Ok(views::edit_user_page(&user, None).into_response())
}

#[tracing::instrument(skip(state, form))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<UpdateUserForm>,
) -> Result<Response, AppError> {
    // ---
    let result = state
        .admin()
        .update_user(&id, &form.username, &form.email, &form.role)
        .await;

    match result {
        Ok(()) => Ok(Redirect::to(USERS_PATH).into_response()),
        Err(e) if e.is_form_error() => {
            let user = state.admin().get_user_for_edit(&id).await?;
            Ok(views::edit_user_page(&user, Some(&e.to_string())).into_response())
        }
        Err(e) => Err(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    // ---
    state.admin().delete_user(&id).await?;
    Ok(Redirect::to(USERS_PATH))
}

#[tracing::instrument(skip(state))]
pub async fn block_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    // ---
    state.admin().block_user(&id).await?;
    Ok(Redirect::to(USERS_PATH))
}

#[tracing::instrument(skip(state))]
pub async fn unblock_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    // ---
    state.admin().unblock_user(&id).await?;
    Ok(Redirect::to(USERS_PATH))
}
