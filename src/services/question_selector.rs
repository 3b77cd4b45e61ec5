use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgConnection;
use thiserror::Error;

use crate::db::operations::questions as questions_ops;
use crate::db::operations::questions::Question;
use crate::db::operations::topics as topics_ops;
use crate::engine::{bands, level};
use crate::services::{progress, topic_mastery};

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("no topics seeded")]
    NoTopics,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct SelectedQuestion {
    pub question: Question,
    pub synthesized: bool,
}

/// Picks the next question for a user: read the level (or honor a clamped
/// caller override), target weak topics first, serve an unattempted pooled
/// question at random, and synthesize a fresh one when the pool is dry.
pub async fn next_question(
    conn: &mut PgConnection,
    user_id: &str,
    difficulty_override: Option<i32>,
) -> Result<SelectedQuestion, SelectorError> {
    let difficulty = match difficulty_override {
        Some(value) => level::clamp_level(value),
        None => progress::get_or_create(&mut *conn, user_id).await?.level,
    };

    let weak = topic_mastery::weak_topics(&mut *conn, user_id, Some(difficulty)).await?;
    let mut candidates: Vec<String> = weak.into_iter().map(|m| m.topic_id).collect();
    if candidates.is_empty() {
        if let Some(topic_id) =
            topic_mastery::recommend_topic(&mut *conn, user_id, difficulty).await?
        {
            candidates.push(topic_id);
        }
    }

    let topic_filter = if candidates.is_empty() {
        None
    } else {
        Some(candidates.as_slice())
    };

    if let Some(question) =
        questions_ops::pick_unattempted(&mut *conn, difficulty, topic_filter, user_id).await?
    {
        return Ok(SelectedQuestion {
            question,
            synthesized: false,
        });
    }

    let topic_id = match candidates.first() {
        Some(topic_id) => topic_id.clone(),
        None => topics_ops::list_all(&mut *conn)
            .await?
            .first()
            .map(|t| t.id.clone())
            .ok_or(SelectorError::NoTopics)?,
    };

    let question = synthesize(&mut *conn, user_id, &topic_id, difficulty).await?;
    Ok(SelectedQuestion {
        question,
        synthesized: true,
    })
}

async fn synthesize(
    conn: &mut PgConnection,
    user_id: &str,
    topic_id: &str,
    difficulty: i32,
) -> Result<Question, SelectorError> {
    let taken: HashSet<String> = questions_ops::attempted_signatures(&mut *conn, user_id)
        .await?
        .into_iter()
        .collect();

    let params = {
        let mut rng = rand::rng();
        bands::draw_unique(difficulty, &mut rng, |sig| taken.contains(sig))
    };

    let question = Question {
        id: uuid::Uuid::new_v4().to_string(),
        topic_id: topic_id.to_string(),
        dividend: params.dividend,
        divisor: params.divisor,
        correct_answer: params.quotient,
        remainder: params.remainder,
        difficulty,
        signature: bands::signature(params.dividend, params.divisor),
        times_served: 0,
        created_at: Utc::now(),
    };
    questions_ops::insert(&mut *conn, &question).await?;

    tracing::debug!(
        user_id,
        topic_id,
        difficulty,
        signature = %question.signature,
        "synthesized question"
    );
    Ok(question)
}
