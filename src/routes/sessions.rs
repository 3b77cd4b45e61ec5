use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::db::operations::sessions as sessions_ops;
use crate::response::AppError;
use crate::routes::require_db;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    user_id: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionDto {
    session_id: String,
    user_id: String,
    created_at: String,
}

/// Creating a session deactivates the user's previous sessions so one
/// session per user is active at a time.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = payload.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::validation("userId is required"));
    }

    let session_id = payload
        .session_id
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let db = require_db(&state)?;
    let created_at = Utc::now();

    sessions_ops::deactivate_for_user(db.pool(), &user_id)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "session deactivation failed");
            AppError::internal("session create failed")
        })?;

    sessions_ops::insert(db.pool(), &session_id, &user_id, created_at)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "session insert failed");
            AppError::internal("session create failed")
        })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: SessionDto {
            session_id,
            user_id,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }))
}
