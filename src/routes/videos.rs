use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::routes::require_db;
use crate::services::video::{self, VideoError};
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    session_id: String,
    question_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoHandleDto {
    video_id: String,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatusDto {
    video_id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CleanupDto {
    deleted: usize,
    files: Vec<String>,
}

pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.session_id.trim().is_empty() || payload.question_id.trim().is_empty() {
        return Err(AppError::validation("sessionId and questionId are required"));
    }

    let db = require_db(&state)?;
    let video_service = state.video();

    let handle = video_service
        .start_generation(db, payload.session_id.trim(), payload.question_id.trim())
        .await
        .map_err(|err| match err {
            VideoError::SessionNotFound => AppError::not_found("session not found"),
            VideoError::QuestionNotFound => AppError::not_found("question not found"),
            other => {
                tracing::warn!(error = %other, "video generation start failed");
                AppError::internal("video generation failed to start")
            }
        })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: VideoHandleDto {
            video_id: handle.video_id,
            status: handle.status.as_str(),
        },
    }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;

    let record = video::status(db.as_ref(), video_id.trim())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "video status lookup failed");
            AppError::internal("video status lookup failed")
        })?
        .ok_or_else(|| AppError::not_found("video not found"))?;

    Ok(Json(SuccessResponse {
        success: true,
        data: VideoStatusDto {
            video_id: record.id,
            status: record.status.as_str(),
            video_url: record.video_url,
            error: record.error,
        },
    }))
}

pub async fn cleanup(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db = require_db(&state)?;
    let video_service = state.video();

    let summary = video_service
        .cleanup_old(db.as_ref())
        .await
        .map_err(|err| match err {
            VideoError::Storage(inner) => {
                tracing::warn!(error = %inner, "storage cleanup failed");
                AppError::upstream("storage cleanup failed")
            }
            other => {
                tracing::warn!(error = %other, "video cleanup failed");
                AppError::internal("video cleanup failed")
            }
        })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: CleanupDto {
            deleted: summary.deleted,
            files: summary.files,
        },
    }))
}
