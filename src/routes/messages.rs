use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::db::operations::messages as messages_ops;
use crate::response::AppError;
use crate::routes::require_db;
use crate::services::chat::{self, ChatError};
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    session_id: String,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageDto {
    role: String,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageResponse {
    message: MessageDto,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptMessageDto {
    role: String,
    content: String,
    created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptResponse {
    messages: Vec<TranscriptMessageDto>,
}

pub async fn send(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.session_id.trim().is_empty() {
        return Err(AppError::validation("sessionId is required"));
    }

    let db = require_db(&state)?;
    let llm = state.llm();

    let reply = chat::send_message(db.as_ref(), llm.as_ref(), &payload.session_id, &payload.content)
        .await
        .map_err(|err| match err {
            ChatError::SessionNotFound => AppError::not_found("session not found"),
            ChatError::EmptyMessage => AppError::validation("content is required"),
            ChatError::Llm(inner) => {
                tracing::warn!(error = %inner, "chat completion failed");
                AppError::upstream("tutor is unavailable right now")
            }
            ChatError::Sql(inner) => {
                tracing::warn!(error = %inner, "chat persistence failed");
                AppError::internal("chat failed")
            }
        })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: SendMessageResponse {
            message: MessageDto {
                role: reply.role,
                content: reply.content,
            },
        },
    }))
}

pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;

    let rows = messages_ops::list_for_session(db.pool(), session_id.trim())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "transcript load failed");
            AppError::internal("transcript load failed")
        })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: TranscriptResponse {
            messages: rows
                .into_iter()
                .map(|row| TranscriptMessageDto {
                    role: row.role,
                    content: row.content,
                    created_at: row.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                })
                .collect(),
        },
    }))
}
