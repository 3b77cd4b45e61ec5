use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

#[derive(Debug, Clone)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub level_min: i32,
    pub level_max: i32,
    pub prerequisite_topic_ids: Vec<String>,
    pub concept_tags: Vec<String>,
    pub difficulty_weight: f64,
    pub position: i32,
}

fn map_topic(row: &PgRow) -> Topic {
    Topic {
        id: row.try_get("id").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        level_min: row.try_get("levelMin").unwrap_or(1),
        level_max: row.try_get("levelMax").unwrap_or(1),
        prerequisite_topic_ids: row.try_get("prerequisiteTopicIds").unwrap_or_default(),
        concept_tags: row.try_get("conceptTags").unwrap_or_default(),
        difficulty_weight: row.try_get("difficultyWeight").unwrap_or(1.0),
        position: row.try_get("position").unwrap_or(0),
    }
}

pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Topic>, sqlx::Error> {
    let rows = sqlx::query(r#"SELECT * FROM "topics" ORDER BY "position" ASC"#)
        .fetch_all(executor)
        .await?;
    Ok(rows.iter().map(map_topic).collect())
}

pub async fn list_for_level(
    executor: impl PgExecutor<'_>,
    level: i32,
) -> Result<Vec<Topic>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM "topics"
        WHERE "levelMin" <= $1 AND "levelMax" >= $1
        ORDER BY "position" ASC
        "#,
    )
    .bind(level)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(map_topic).collect())
}

pub async fn insert_if_absent(
    executor: impl PgExecutor<'_>,
    topic: &Topic,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO "topics" (
            "id", "name", "levelMin", "levelMax",
            "prerequisiteTopicIds", "conceptTags", "difficultyWeight", "position"
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT ("id") DO NOTHING
        "#,
    )
    .bind(&topic.id)
    .bind(&topic.name)
    .bind(topic.level_min)
    .bind(topic.level_max)
    .bind(&topic.prerequisite_topic_ids)
    .bind(&topic.concept_tags)
    .bind(topic.difficulty_weight)
    .bind(topic.position)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
