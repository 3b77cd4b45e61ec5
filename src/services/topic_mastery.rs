use chrono::Utc;
use sqlx::PgConnection;

use crate::db::operations::mastery as mastery_ops;
use crate::db::operations::mastery::TopicMastery;
use crate::db::operations::topics as topics_ops;
use crate::engine::mastery;

/// Upserts the per-topic accuracy counters for one validated answer and
/// recomputes the all-time ratio and review flag.
pub async fn record_attempt(
    conn: &mut PgConnection,
    user_id: &str,
    topic_id: &str,
    is_correct: bool,
) -> Result<TopicMastery, sqlx::Error> {
    let existing = mastery_ops::find(&mut *conn, user_id, topic_id).await?;
    let (prior_attempted, prior_correct) = existing
        .map(|m| (m.questions_attempted, m.questions_correct))
        .unwrap_or((0, 0));

    let (attempted, correct, percentage, review) =
        mastery::apply_attempt(prior_attempted, prior_correct, is_correct);

    let row = TopicMastery {
        user_id: user_id.to_string(),
        topic_id: topic_id.to_string(),
        questions_attempted: attempted,
        questions_correct: correct,
        mastery_percentage: percentage,
        needs_review: review,
        last_attempted_at: Some(Utc::now()),
    };
    mastery_ops::upsert(&mut *conn, &row).await?;
    Ok(row)
}

/// Mastery rows below the review threshold, optionally restricted to topics
/// presented at `level`.
pub async fn weak_topics(
    conn: &mut PgConnection,
    user_id: &str,
    level: Option<i32>,
) -> Result<Vec<TopicMastery>, sqlx::Error> {
    let rows = mastery_ops::list_for_user(&mut *conn, user_id).await?;
    let mut weak: Vec<TopicMastery> = rows
        .into_iter()
        .filter(|m| mastery::needs_review(m.mastery_percentage))
        .collect();

    if let Some(level) = level {
        let valid: Vec<String> = topics_ops::list_for_level(&mut *conn, level)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        weak.retain(|m| valid.contains(&m.topic_id));
    }

    Ok(weak)
}

/// Topic recommendation in priority order: a topic flagged for review, then
/// the first level-valid topic never attempted, then the first level-valid
/// topic. Catalog position decides "first". None when nothing is presented
/// at this level.
pub async fn recommend_topic(
    conn: &mut PgConnection,
    user_id: &str,
    level: i32,
) -> Result<Option<String>, sqlx::Error> {
    let mastery_rows = mastery_ops::list_for_user(&mut *conn, user_id).await?;

    let catalog = topics_ops::list_all(&mut *conn).await?;
    for topic in &catalog {
        let flagged = mastery_rows
            .iter()
            .any(|m| m.topic_id == topic.id && m.needs_review);
        if flagged {
            return Ok(Some(topic.id.clone()));
        }
    }

    let level_topics = topics_ops::list_for_level(&mut *conn, level).await?;
    if level_topics.is_empty() {
        return Ok(None);
    }

    for topic in &level_topics {
        let attempted = mastery_rows.iter().any(|m| m.topic_id == topic.id);
        if !attempted {
            return Ok(Some(topic.id.clone()));
        }
    }

    Ok(level_topics.first().map(|t| t.id.clone()))
}
