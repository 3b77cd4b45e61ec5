use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct UserProgress {
    pub user_id: String,
    pub level: i32,
    pub total_attempted: i64,
    pub total_correct: i64,
    pub current_streak: i64,
    pub best_streak: i64,
    pub last_practice_at: Option<DateTime<Utc>>,
}

fn map_progress(row: &PgRow) -> UserProgress {
    UserProgress {
        user_id: row.try_get("userId").unwrap_or_default(),
        level: row.try_get("level").unwrap_or(1),
        total_attempted: row.try_get("totalAttempted").unwrap_or(0),
        total_correct: row.try_get("totalCorrect").unwrap_or(0),
        current_streak: row.try_get("currentStreak").unwrap_or(0),
        best_streak: row.try_get("bestStreak").unwrap_or(0),
        last_practice_at: row.try_get("lastPracticeAt").ok(),
    }
}

pub async fn find(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<Option<UserProgress>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "user_progress" WHERE "userId" = $1"#)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| map_progress(&r)))
}

pub async fn insert_default(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "user_progress" ("userId")
        VALUES ($1)
        ON CONFLICT ("userId") DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn apply_outcome(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    is_correct: bool,
    now: DateTime<Utc>,
) -> Result<Option<UserProgress>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE "user_progress" SET
            "totalAttempted" = "totalAttempted" + 1,
            "totalCorrect" = "totalCorrect" + CASE WHEN $2 THEN 1 ELSE 0 END,
            "currentStreak" = CASE WHEN $2 THEN "currentStreak" + 1 ELSE 0 END,
            "bestStreak" = GREATEST("bestStreak", CASE WHEN $2 THEN "currentStreak" + 1 ELSE 0 END),
            "lastPracticeAt" = $3
        WHERE "userId" = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(is_correct)
    .bind(now)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|r| map_progress(&r)))
}

pub async fn set_level(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    level: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE "user_progress" SET "level" = $2 WHERE "userId" = $1"#)
        .bind(user_id)
        .bind(level)
        .execute(executor)
        .await?;
    Ok(())
}
