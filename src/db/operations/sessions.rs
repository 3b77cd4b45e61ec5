use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn map_session(row: &PgRow) -> Session {
    Session {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        is_active: row.try_get("isActive").unwrap_or(false),
        created_at: row.try_get("createdAt").unwrap_or_else(|_| Utc::now()),
    }
}

pub async fn find(
    executor: impl PgExecutor<'_>,
    session_id: &str,
) -> Result<Option<Session>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "sessions" WHERE "id" = $1"#)
        .bind(session_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| map_session(&r)))
}

pub async fn deactivate_for_user(
    executor: impl PgExecutor<'_>,
    user_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(r#"UPDATE "sessions" SET "isActive" = FALSE WHERE "userId" = $1"#)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    session_id: &str,
    user_id: &str,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "sessions" ("id", "userId", "isActive", "createdAt")
        VALUES ($1, $2, TRUE, $3)
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(created_at)
    .execute(executor)
    .await?;
    Ok(())
}
