use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct TopicMastery {
    pub user_id: String,
    pub topic_id: String,
    pub questions_attempted: i64,
    pub questions_correct: i64,
    pub mastery_percentage: f64,
    pub needs_review: bool,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

fn map_mastery(row: &PgRow) -> TopicMastery {
    TopicMastery {
        user_id: row.try_get("userId").unwrap_or_default(),
        topic_id: row.try_get("topicId").unwrap_or_default(),
        questions_attempted: row.try_get("questionsAttempted").unwrap_or(0),
        questions_correct: row.try_get("questionsCorrect").unwrap_or(0),
        mastery_percentage: row.try_get("masteryPercentage").unwrap_or(0.0),
        needs_review: row.try_get("needsReview").unwrap_or(false),
        last_attempted_at: row.try_get("lastAttemptedAt").ok(),
    }
}

pub async fn find(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    topic_id: &str,
) -> Result<Option<TopicMastery>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT * FROM "topic_mastery" WHERE "userId" = $1 AND "topicId" = $2"#,
    )
    .bind(user_id)
    .bind(topic_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|r| map_mastery(&r)))
}

pub async fn list_for_user(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<Vec<TopicMastery>, sqlx::Error> {
    let rows = sqlx::query(r#"SELECT * FROM "topic_mastery" WHERE "userId" = $1"#)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.iter().map(map_mastery).collect())
}

pub async fn list_for_topics(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    topic_ids: &[String],
) -> Result<Vec<TopicMastery>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "topic_mastery"
        WHERE "userId" = $1 AND "topicId" = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(topic_ids)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(map_mastery).collect())
}

pub async fn upsert(
    executor: impl PgExecutor<'_>,
    mastery: &TopicMastery,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "topic_mastery" (
            "userId", "topicId", "questionsAttempted", "questionsCorrect",
            "masteryPercentage", "needsReview", "lastAttemptedAt"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT ("userId", "topicId") DO UPDATE SET
            "questionsAttempted" = EXCLUDED."questionsAttempted",
            "questionsCorrect" = EXCLUDED."questionsCorrect",
            "masteryPercentage" = EXCLUDED."masteryPercentage",
            "needsReview" = EXCLUDED."needsReview",
            "lastAttemptedAt" = EXCLUDED."lastAttemptedAt"
        "#,
    )
    .bind(&mastery.user_id)
    .bind(&mastery.topic_id)
    .bind(mastery.questions_attempted)
    .bind(mastery.questions_correct)
    .bind(mastery.mastery_percentage)
    .bind(mastery.needs_review)
    .bind(mastery.last_attempted_at)
    .execute(executor)
    .await?;
    Ok(())
}
