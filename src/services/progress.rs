use chrono::Utc;
use sqlx::PgConnection;

use crate::db::operations::progress as progress_ops;
use crate::db::operations::progress::UserProgress;
use crate::db::operations::{mastery as mastery_ops, topics as topics_ops};
use crate::engine::level;

/// Returns the user's progress row, creating it at level 1 with zeroed
/// counters on first access.
pub async fn get_or_create(
    conn: &mut PgConnection,
    user_id: &str,
) -> Result<UserProgress, sqlx::Error> {
    if let Some(progress) = progress_ops::find(&mut *conn, user_id).await? {
        return Ok(progress);
    }
    progress_ops::insert_default(&mut *conn, user_id).await?;
    Ok(progress_ops::find(&mut *conn, user_id)
        .await?
        .unwrap_or(UserProgress {
            user_id: user_id.to_string(),
            level: level::MIN_LEVEL,
            total_attempted: 0,
            total_correct: 0,
            current_streak: 0,
            best_streak: 0,
            last_practice_at: None,
        }))
}

/// Applies one outcome to the aggregate counters. An incorrect outcome
/// resets the streak; bestStreak only ever grows.
pub async fn record_outcome(
    conn: &mut PgConnection,
    user_id: &str,
    is_correct: bool,
) -> Result<UserProgress, sqlx::Error> {
    let existing = get_or_create(&mut *conn, user_id).await?;
    let updated = progress_ops::apply_outcome(&mut *conn, user_id, is_correct, Utc::now()).await?;
    Ok(updated.unwrap_or(existing))
}

/// Re-evaluates the level transition rule against mastery at the current
/// level. Topics without attempts are excluded from the average rather than
/// counted as zero. Invoked once per validated answer, after the mastery
/// update; nothing else changes the level.
pub async fn recompute_level(
    conn: &mut PgConnection,
    user_id: &str,
) -> Result<i32, sqlx::Error> {
    let progress = get_or_create(&mut *conn, user_id).await?;

    let topics = topics_ops::list_for_level(&mut *conn, progress.level).await?;
    if topics.is_empty() {
        return Ok(progress.level);
    }

    let topic_ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
    let rows = mastery_ops::list_for_topics(&mut *conn, user_id, &topic_ids).await?;
    let attempted: Vec<f64> = rows
        .iter()
        .filter(|m| m.questions_attempted > 0)
        .map(|m| m.mastery_percentage)
        .collect();

    let avg_mastery = if attempted.is_empty() {
        None
    } else {
        Some(attempted.iter().sum::<f64>() / attempted.len() as f64)
    };

    let new_level = level::next_level(
        progress.level,
        avg_mastery,
        progress.current_streak,
        progress.total_attempted,
    );

    if new_level != progress.level {
        progress_ops::set_level(&mut *conn, user_id, new_level).await?;
        tracing::info!(
            user_id,
            from = progress.level,
            to = new_level,
            "level transition"
        );
    }

    Ok(new_level)
}
