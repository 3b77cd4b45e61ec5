mod health;
mod messages;
mod progress;
mod questions;
mod sessions;
mod videos;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::db::Database;
use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route(
            "/api/sessions",
            post(sessions::create).fallback(fallback_handler),
        )
        .route(
            "/api/messages",
            post(messages::send).fallback(fallback_handler),
        )
        .route(
            "/api/messages/:sessionId",
            get(messages::list).fallback(fallback_handler),
        )
        .route(
            "/api/questions/next",
            get(questions::next).fallback(fallback_handler),
        )
        .route(
            "/api/questions/validate",
            post(questions::validate).fallback(fallback_handler),
        )
        .route(
            "/api/progress/:userId",
            get(progress::snapshot).fallback(fallback_handler),
        )
        .route(
            "/api/videos/generate",
            post(videos::generate).fallback(fallback_handler),
        )
        .route(
            "/api/videos/:videoId/status",
            get(videos::status).fallback(fallback_handler),
        )
        .route(
            "/api/videos/cleanup",
            post(videos::cleanup).fallback(fallback_handler),
        );

    app = app.nest("/health", health::router());
    app = app.nest("/api/health", health::router());

    app.fallback(fallback_handler).with_state(state)
}

pub(crate) fn require_db(state: &AppState) -> Result<Arc<Database>, AppError> {
    state
        .db()
        .ok_or_else(|| AppError::service_unavailable("service unavailable"))
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
