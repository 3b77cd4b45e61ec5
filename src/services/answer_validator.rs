use chrono::Utc;
use thiserror::Error;

use crate::db::operations::{
    attempts as attempts_ops, questions as questions_ops, sessions as sessions_ops,
};
use crate::db::Database;
use crate::engine::verdict::{self, FeedbackStage};
use crate::services::llm_provider::{extract_json, LLMProvider};
use crate::services::{progress, topic_mastery};

const FALLBACK_HINT: &str = "Try breaking down the problem into smaller steps.";

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("session not found")]
    SessionNotFound,
    #[error("question not found")]
    QuestionNotFound,
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ValidateInput {
    pub session_id: String,
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub is_correct: bool,
    pub attempts: i64,
    pub offer_video: bool,
    pub new_level: i32,
    pub correct_answer: Option<i64>,
    pub remainder: Option<i64>,
    pub feedback: String,
}

/// Records one submission and applies its downstream effects. The whole
/// read-modify-write (attempt upsert, timesServed, mastery, progress, level)
/// runs in a single transaction so concurrent submissions from multiple
/// clients serialize on the attempt row. The LLM hint happens after commit.
pub async fn validate_answer(
    db: &Database,
    llm: &LLMProvider,
    input: ValidateInput,
) -> Result<ValidationOutcome, ValidateError> {
    if input.answer.trim().is_empty() {
        return Err(ValidateError::EmptyAnswer);
    }

    let mut tx = db.pool().begin().await?;

    let session = sessions_ops::find(&mut *tx, &input.session_id)
        .await?
        .ok_or(ValidateError::SessionNotFound)?;
    let user_id = session.user_id;

    let question = questions_ops::find(&mut *tx, &input.question_id)
        .await?
        .ok_or(ValidateError::QuestionNotFound)?;

    let is_correct = verdict::is_exact_match(&input.answer, question.correct_answer);

    let attempt = attempts_ops::upsert_submission(
        &mut *tx,
        &user_id,
        &question.id,
        is_correct,
        input.answer.trim(),
        Utc::now(),
    )
    .await?;

    questions_ops::increment_times_served(&mut *tx, &question.id).await?;

    let new_level = if is_correct {
        topic_mastery::record_attempt(&mut tx, &user_id, &question.topic_id, true).await?;
        progress::record_outcome(&mut tx, &user_id, true).await?;
        progress::recompute_level(&mut tx, &user_id).await?
    } else {
        if verdict::mastery_update_due(attempt.attempts_made, false) {
            topic_mastery::record_attempt(&mut tx, &user_id, &question.topic_id, false).await?;
        }
        // Totals and streak only advance through correct outcomes; the level
        // is read here, not recomputed.
        progress::get_or_create(&mut tx, &user_id).await?.level
    };

    tx.commit().await?;

    let feedback = match verdict::feedback_stage(attempt.attempts_made, is_correct) {
        FeedbackStage::Correct => "Correct! Great work.".to_string(),
        FeedbackStage::Retry => "Incorrect. Please try again.".to_string(),
        FeedbackStage::Hint => {
            let hint = generate_hint(llm, &question, input.answer.trim()).await;
            format!("Not quite right. Here's a hint: {hint}")
        }
        FeedbackStage::Reveal => reveal_feedback(&question),
    };

    Ok(ValidationOutcome {
        is_correct,
        attempts: attempt.attempts_made,
        offer_video: verdict::offer_video(attempt.attempts_made, is_correct),
        new_level,
        correct_answer: (!is_correct).then_some(question.correct_answer),
        remainder: (!is_correct).then_some(question.remainder),
        feedback,
    })
}

fn reveal_feedback(question: &questions_ops::Question) -> String {
    if question.remainder > 0 {
        format!(
            "That's not correct. {} ÷ {} = {} remainder {}.",
            question.dividend, question.divisor, question.correct_answer, question.remainder
        )
    } else {
        format!(
            "That's not correct. {} ÷ {} = {}.",
            question.dividend, question.divisor, question.correct_answer
        )
    }
}

async fn generate_hint(
    llm: &LLMProvider,
    question: &questions_ops::Question,
    user_answer: &str,
) -> String {
    if !llm.is_available() {
        return FALLBACK_HINT.to_string();
    }

    let system = "You are a mathematics teaching assistant. Give short, encouraging hints.";
    let prompt = format!(
        "A student answered \"{user_answer}\" to the problem {} ÷ {}. \
         Respond with JSON of the form {{\"hint\": \"...\"}} containing one \
         short hint that nudges them toward the method without revealing the answer.",
        question.dividend, question.divisor
    );

    match llm.complete_with_system(system, &prompt).await {
        Ok(text) => extract_json(&text)
            .ok()
            .and_then(|v| v.get("hint").and_then(|h| h.as_str()).map(String::from))
            .unwrap_or_else(|| FALLBACK_HINT.to_string()),
        Err(err) => {
            tracing::warn!(error = %err, "hint generation failed");
            FALLBACK_HINT.to_string()
        }
    }
}
