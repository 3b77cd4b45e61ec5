use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::operations::sessions as sessions_ops;
use crate::response::AppError;
use crate::routes::require_db;
use crate::services::answer_validator::{self, ValidateError, ValidateInput};
use crate::services::question_selector::{self, SelectorError};
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestionQuery {
    session_id: String,
    #[serde(default)]
    difficulty: Option<i32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    question_id: String,
    question: String,
    topic_id: String,
    difficulty: i32,
    dividend: i64,
    divisor: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    session_id: String,
    question_id: String,
    answer: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationDto {
    is_correct: bool,
    attempts: i64,
    feedback: String,
    offer_video: bool,
    new_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    correct_answer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remainder: Option<i64>,
}

pub async fn next(
    State(state): State<AppState>,
    Query(query): Query<NextQuestionQuery>,
) -> Result<impl IntoResponse, AppError> {
    if query.session_id.trim().is_empty() {
        return Err(AppError::validation("sessionId is required"));
    }

    let db = require_db(&state)?;
    let mut conn = db.pool().acquire().await.map_err(|err| {
        tracing::warn!(error = %err, "connection acquire failed");
        AppError::internal("next question failed")
    })?;

    let session = sessions_ops::find(&mut *conn, query.session_id.trim())
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, "session lookup failed");
            AppError::internal("next question failed")
        })?
        .ok_or_else(|| AppError::not_found("session not found"))?;

    let selected =
        question_selector::next_question(&mut conn, &session.user_id, query.difficulty)
            .await
            .map_err(|err| match err {
                SelectorError::NoTopics => {
                    tracing::error!("topic catalog is empty");
                    AppError::internal("next question failed")
                }
                SelectorError::Sql(inner) => {
                    tracing::warn!(error = %inner, "question selection failed");
                    AppError::internal("next question failed")
                }
            })?;

    let question = selected.question;
    Ok(Json(SuccessResponse {
        success: true,
        data: QuestionDto {
            question: format!("What is {} ÷ {}?", question.dividend, question.divisor),
            question_id: question.id,
            topic_id: question.topic_id,
            difficulty: question.difficulty,
            dividend: question.dividend,
            divisor: question.divisor,
        },
    }))
}

pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.session_id.trim().is_empty() || payload.question_id.trim().is_empty() {
        return Err(AppError::validation("sessionId and questionId are required"));
    }

    let db = require_db(&state)?;
    let llm = state.llm();

    let outcome = answer_validator::validate_answer(
        db.as_ref(),
        llm.as_ref(),
        ValidateInput {
            session_id: payload.session_id.trim().to_string(),
            question_id: payload.question_id.trim().to_string(),
            answer: payload.answer,
        },
    )
    .await
    .map_err(|err| match err {
        ValidateError::SessionNotFound => AppError::not_found("session not found"),
        ValidateError::QuestionNotFound => AppError::not_found("question not found"),
        ValidateError::EmptyAnswer => AppError::validation("answer is required"),
        ValidateError::Sql(inner) => {
            tracing::warn!(error = %inner, "answer validation failed");
            AppError::internal("answer validation failed")
        }
    })?;

    Ok(Json(SuccessResponse {
        success: true,
        data: ValidationDto {
            is_correct: outcome.is_correct,
            attempts: outcome.attempts,
            feedback: outcome.feedback,
            offer_video: outcome.offer_video,
            new_level: outcome.new_level,
            correct_answer: outcome.correct_answer,
            remainder: outcome.remainder,
        },
    }))
}
