use super::views;
use crate::domain::Session;
use axum::{response::IntoResponse, Extension};

/// `GET /user/home`, behind `require_role::<UserOnly>`.
pub async fn home(Extension(session): Extension<Session>) -> impl IntoResponse {
    views::home_page(session.identity.email())
}
