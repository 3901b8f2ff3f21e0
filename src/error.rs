//! Errors surfaced by request handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const TICKET_NOT_FOUND: &str = "error.ticket.notFound";
pub const COMMENT_NOT_FOUND: &str = "error.ticketComment.notFound";
pub const ROUTE_NOT_FOUND: &str = "error.route.notFound";

#[derive(Debug, Error)]
pub enum AppError {
    /// A path-addressed entity does not exist, or does not belong to the
    /// entity it was addressed under.
    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(code) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": code }))).into_response()
            }
            AppError::Storage(err) => {
                error!(error = %format!("{:#}", err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "error.internal" })),
                )
                    .into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound(TICKET_NOT_FOUND).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_status() {
        let response = AppError::from(anyhow!("disk full")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AppError::NotFound(COMMENT_NOT_FOUND).to_string(),
            "not found: error.ticketComment.notFound"
        );
    }
}
