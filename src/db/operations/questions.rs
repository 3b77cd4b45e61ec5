use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub topic_id: String,
    pub dividend: i64,
    pub divisor: i64,
    pub correct_answer: i64,
    pub remainder: i64,
    pub difficulty: i32,
    pub signature: String,
    pub times_served: i64,
    pub created_at: DateTime<Utc>,
}

fn map_question(row: &PgRow) -> Question {
    Question {
        id: row.try_get("id").unwrap_or_default(),
        topic_id: row.try_get("topicId").unwrap_or_default(),
        dividend: row.try_get("dividend").unwrap_or(0),
        divisor: row.try_get("divisor").unwrap_or(1),
        correct_answer: row.try_get("correctAnswer").unwrap_or(0),
        remainder: row.try_get("remainder").unwrap_or(0),
        difficulty: row.try_get("difficulty").unwrap_or(1),
        signature: row.try_get("signature").unwrap_or_default(),
        times_served: row.try_get("timesServed").unwrap_or(0),
        created_at: row.try_get("createdAt").unwrap_or_else(|_| Utc::now()),
    }
}

pub async fn find(
    executor: impl PgExecutor<'_>,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "questions" WHERE "id" = $1"#)
        .bind(question_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| map_question(&r)))
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    question: &Question,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "questions" (
            "id", "topicId", "dividend", "divisor", "correctAnswer",
            "remainder", "difficulty", "signature", "timesServed", "createdAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&question.id)
    .bind(&question.topic_id)
    .bind(question.dividend)
    .bind(question.divisor)
    .bind(question.correct_answer)
    .bind(question.remainder)
    .bind(question.difficulty)
    .bind(&question.signature)
    .bind(question.times_served)
    .bind(question.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Uniform random pick from the pool of questions at a difficulty the user
/// has never attempted, optionally restricted to a topic set.
pub async fn pick_unattempted(
    executor: impl PgExecutor<'_>,
    difficulty: i32,
    topic_ids: Option<&[String]>,
    user_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    let row = match topic_ids {
        Some(topics) => {
            sqlx::query(
                r#"
                SELECT * FROM "questions" q
                WHERE q."difficulty" = $1
                  AND q."topicId" = ANY($2)
                  AND NOT EXISTS (
                      SELECT 1 FROM "question_attempts" a
                      WHERE a."questionId" = q."id" AND a."userId" = $3
                  )
                ORDER BY RANDOM()
                LIMIT 1
                "#,
            )
            .bind(difficulty)
            .bind(topics)
            .bind(user_id)
            .fetch_optional(executor)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT * FROM "questions" q
                WHERE q."difficulty" = $1
                  AND NOT EXISTS (
                      SELECT 1 FROM "question_attempts" a
                      WHERE a."questionId" = q."id" AND a."userId" = $2
                  )
                ORDER BY RANDOM()
                LIMIT 1
                "#,
            )
            .bind(difficulty)
            .bind(user_id)
            .fetch_optional(executor)
            .await?
        }
    };
    Ok(row.map(|r| map_question(&r)))
}

pub async fn increment_times_served(
    executor: impl PgExecutor<'_>,
    question_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE "questions" SET "timesServed" = "timesServed" + 1 WHERE "id" = $1"#)
        .bind(question_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Signatures of every question this user has submitted an answer for.
pub async fn attempted_signatures(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT q."signature" AS "signature"
        FROM "questions" q
        JOIN "question_attempts" a ON a."questionId" = q."id"
        WHERE a."userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(rows
        .iter()
        .filter_map(|r| r.try_get::<String, _>("signature").ok())
        .collect())
}
