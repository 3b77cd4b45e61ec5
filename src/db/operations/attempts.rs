use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct QuestionAttempt {
    pub user_id: String,
    pub question_id: String,
    pub attempts_made: i64,
    pub is_correct: bool,
    pub user_answer: Option<String>,
    pub video_requested: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn map_attempt(row: &PgRow) -> QuestionAttempt {
    QuestionAttempt {
        user_id: row.try_get("userId").unwrap_or_default(),
        question_id: row.try_get("questionId").unwrap_or_default(),
        attempts_made: row.try_get("attemptsMade").unwrap_or(0),
        is_correct: row.try_get("isCorrect").unwrap_or(false),
        user_answer: row.try_get("userAnswer").ok(),
        video_requested: row.try_get("videoRequested").unwrap_or(false),
        started_at: row.try_get("startedAt").unwrap_or_else(|_| Utc::now()),
        completed_at: row.try_get("completedAt").ok(),
    }
}

/// One row per (user, question): the first submission creates it, later
/// submissions bump the counter and overwrite the latest verdict. A correct
/// submission stamps completedAt; an earlier stamp is never cleared.
pub async fn upsert_submission(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    question_id: &str,
    is_correct: bool,
    user_answer: &str,
    now: DateTime<Utc>,
) -> Result<QuestionAttempt, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO "question_attempts" (
            "userId", "questionId", "attemptsMade", "isCorrect",
            "userAnswer", "startedAt", "completedAt"
        ) VALUES ($1, $2, 1, $3, $4, $5, CASE WHEN $3 THEN $5 ELSE NULL END)
        ON CONFLICT ("userId", "questionId") DO UPDATE SET
            "attemptsMade" = "question_attempts"."attemptsMade" + 1,
            "isCorrect" = EXCLUDED."isCorrect",
            "userAnswer" = EXCLUDED."userAnswer",
            "completedAt" = CASE
                WHEN EXCLUDED."isCorrect" THEN $5
                ELSE "question_attempts"."completedAt"
            END
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(is_correct)
    .bind(user_answer)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(map_attempt(&row))
}

pub async fn mark_video_requested(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    question_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "question_attempts" SET "videoRequested" = TRUE
        WHERE "userId" = $1 AND "questionId" = $2
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .execute(executor)
    .await?;
    Ok(())
}
