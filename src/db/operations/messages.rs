use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

fn map_message(row: &PgRow) -> MessageRow {
    MessageRow {
        id: row.try_get("id").unwrap_or_default(),
        session_id: row.try_get("sessionId").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        role: row.try_get("role").unwrap_or_default(),
        content: row.try_get("content").unwrap_or_default(),
        created_at: row.try_get("createdAt").unwrap_or_else(|_| Utc::now()),
    }
}

pub async fn list_for_session(
    executor: impl PgExecutor<'_>,
    session_id: &str,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "messages"
        WHERE "sessionId" = $1
        ORDER BY "createdAt" ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(map_message).collect())
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    session_id: &str,
    user_id: &str,
    role: &str,
    content: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "messages" ("id", "sessionId", "userId", "role", "content", "createdAt")
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(session_id)
    .bind(user_id)
    .bind(role)
    .bind(content)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}
