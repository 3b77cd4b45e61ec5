use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStatus {
    Generating,
    Ready,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Generating => "generating",
            VideoStatus::Ready => "ready",
            VideoStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "ready" => VideoStatus::Ready,
            "failed" => VideoStatus::Failed,
            _ => VideoStatus::Generating,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub id: String,
    pub question_id: String,
    pub session_id: String,
    pub status: VideoStatus,
    pub video_url: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn map_video(row: &PgRow) -> VideoRecord {
    VideoRecord {
        id: row.try_get("id").unwrap_or_default(),
        question_id: row.try_get("questionId").unwrap_or_default(),
        session_id: row.try_get("sessionId").unwrap_or_default(),
        status: VideoStatus::parse(
            row.try_get::<String, _>("status").unwrap_or_default().as_str(),
        ),
        video_url: row.try_get("videoUrl").ok(),
        error: row.try_get("error").ok(),
        created_at: row.try_get("createdAt").unwrap_or_else(|_| Utc::now()),
        updated_at: row.try_get("updatedAt").unwrap_or_else(|_| Utc::now()),
    }
}

pub async fn insert_generating(
    executor: impl PgExecutor<'_>,
    video_id: &str,
    question_id: &str,
    session_id: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO "videos" (
            "id", "questionId", "sessionId", "status", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(video_id)
    .bind(question_id)
    .bind(session_id)
    .bind(VideoStatus::Generating.as_str())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find(
    executor: impl PgExecutor<'_>,
    video_id: &str,
) -> Result<Option<VideoRecord>, sqlx::Error> {
    let row = sqlx::query(r#"SELECT * FROM "videos" WHERE "id" = $1"#)
        .bind(video_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| map_video(&r)))
}

pub async fn mark_ready(
    executor: impl PgExecutor<'_>,
    video_id: &str,
    video_url: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "videos" SET "status" = $2, "videoUrl" = $3, "updatedAt" = $4
        WHERE "id" = $1
        "#,
    )
    .bind(video_id)
    .bind(VideoStatus::Ready.as_str())
    .bind(video_url)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn mark_failed(
    executor: impl PgExecutor<'_>,
    video_id: &str,
    error: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "videos" SET "status" = $2, "error" = $3, "updatedAt" = $4
        WHERE "id" = $1
        "#,
    )
    .bind(video_id)
    .bind(VideoStatus::Failed.as_str())
    .bind(error)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

/// Terminal records past the retention cutoff, oldest first.
pub async fn terminal_older_than(
    executor: impl PgExecutor<'_>,
    cutoff: DateTime<Utc>,
) -> Result<Vec<VideoRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "videos"
        WHERE "createdAt" < $1 AND "status" IN ('ready', 'failed')
        ORDER BY "createdAt" ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(map_video).collect())
}

pub async fn delete_by_ids(
    executor: impl PgExecutor<'_>,
    video_ids: &[String],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "videos" WHERE "id" = ANY($1)"#)
        .bind(video_ids)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
