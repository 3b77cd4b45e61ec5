use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::db::operations::{mastery as mastery_ops, topics as topics_ops};
use crate::response::AppError;
use crate::routes::require_db;
use crate::services::progress as progress_service;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicMasteryDto {
    topic_id: String,
    name: String,
    questions_attempted: i64,
    questions_correct: i64,
    mastery_percentage: f64,
    needs_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_attempted_at: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDto {
    level: i32,
    total_attempted: i64,
    total_correct: i64,
    current_streak: i64,
    best_streak: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_practice_at: Option<String>,
    topics: Vec<TopicMasteryDto>,
}

pub async fn snapshot(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::validation("userId is required"));
    }

    let db = require_db(&state)?;
    let mut conn = db.pool().acquire().await.map_err(|err| {
        tracing::warn!(error = %err, "connection acquire failed");
        AppError::internal("progress load failed")
    })?;

    let progress = progress_service::get_or_create(&mut conn, &user_id)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "progress load failed");
            AppError::internal("progress load failed")
        })?;

    let mastery_rows = mastery_ops::list_for_user(&mut *conn, &user_id)
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "mastery load failed");
            AppError::internal("progress load failed")
        })?;

    let catalog = topics_ops::list_all(&mut *conn).await.map_err(|err| {
        tracing::warn!(error = %err, "topic catalog load failed");
        AppError::internal("progress load failed")
    })?;

    let topics = catalog
        .iter()
        .filter_map(|topic| {
            mastery_rows
                .iter()
                .find(|m| m.topic_id == topic.id)
                .map(|m| TopicMasteryDto {
                    topic_id: m.topic_id.clone(),
                    name: topic.name.clone(),
                    questions_attempted: m.questions_attempted,
                    questions_correct: m.questions_correct,
                    mastery_percentage: m.mastery_percentage,
                    needs_review: m.needs_review,
                    last_attempted_at: m.last_attempted_at.map(iso),
                })
        })
        .collect();

    Ok(Json(SuccessResponse {
        success: true,
        data: ProgressDto {
            level: progress.level,
            total_attempted: progress.total_attempted,
            total_correct: progress.total_correct,
            current_streak: progress.current_streak,
            best_streak: progress.best_streak,
            last_practice_at: progress.last_practice_at.map(iso),
            topics,
        },
    }))
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
