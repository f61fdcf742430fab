use super::views;
use crate::domain::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Form errors are normally caught by the handler and shown inside the form;
/// anything reaching this impl renders the standalone error page.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, views::error_page(&self.to_string())).into_response()
            }
            AppError::StorageUnavailable(ref e) => {
                tracing::error!(error = %e, "storage failure");
                internal_error()
            }
            AppError::Internal(ref e) => {
                tracing::error!(error = %e, "internal failure");
                internal_error()
            }
            other => {
                (StatusCode::BAD_REQUEST, views::error_page(&other.to_string())).into_response()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        views::error_page("Something went wrong"),
    )
        .into_response()
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, views::error_page("Page not found")).into_response()
}
