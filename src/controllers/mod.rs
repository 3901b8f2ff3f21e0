pub mod ticket_comments;
pub mod tickets;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::{AppError, ROUTE_NOT_FOUND};
use crate::view::Reply;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/tickets", get(tickets::get_index))
        .route("/tickets/", get(tickets::get_index))
        .route(
            "/tickets/create",
            get(tickets::get_create).post(tickets::post_create),
        )
        .route("/tickets/{ticket}", get(tickets::get_view))
        .route(
            "/tickets/{ticket}/edit",
            get(tickets::get_edit).post(tickets::post_edit),
        )
        .route(
            "/tickets/{ticket}/delete",
            get(tickets::get_delete).post(tickets::post_delete),
        )
        .route(
            "/tickets/{ticket}/comments",
            post(ticket_comments::post_create),
        )
        .route(
            "/tickets/{ticket}/comments/{comment}/delete",
            get(ticket_comments::get_delete).post(ticket_comments::post_delete),
        )
        .fallback(unmatched)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Reply {
    Reply::redirect(tickets::TICKETS_URL)
}

async fn unmatched(uri: axum::http::Uri) -> AppError {
    debug!(path = %uri.path(), "no route");
    AppError::NotFound(ROUTE_NOT_FOUND)
}
