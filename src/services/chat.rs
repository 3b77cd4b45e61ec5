use thiserror::Error;

use crate::db::operations::{messages as messages_ops, sessions as sessions_ops, topics as topics_ops};
use crate::db::Database;
use crate::services::llm_provider::{ChatMessage, LLMError, LLMProvider};
use crate::services::{progress, topic_mastery};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("session not found")]
    SessionNotFound,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Llm(#[from] LLMError),
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub role: String,
    pub content: String,
}

/// One tutor turn: load the transcript, answer with the LLM under a system
/// prompt assembled from the student's progress and weak topics, persist
/// both sides of the exchange.
pub async fn send_message(
    db: &Database,
    llm: &LLMProvider,
    session_id: &str,
    content: &str,
) -> Result<ChatReply, ChatError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let mut conn = db.pool().acquire().await?;

    let session = sessions_ops::find(&mut *conn, session_id)
        .await?
        .ok_or(ChatError::SessionNotFound)?;
    let user_id = session.user_id.clone();

    let system = build_system_prompt(&mut conn, &user_id).await?;

    let history = messages_ops::list_for_session(&mut *conn, session_id).await?;
    let mut messages: Vec<ChatMessage> = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    for row in &history {
        if row.role == "system" {
            continue;
        }
        messages.push(ChatMessage {
            role: row.role.clone(),
            content: row.content.clone(),
        });
    }
    messages.push(ChatMessage::user(content));

    let response = llm.chat(&messages).await?;
    let assistant_content = response
        .first_content()
        .map(|s| s.to_string())
        .ok_or(LLMError::EmptyChoices)?;

    messages_ops::insert(&mut *conn, session_id, &user_id, "user", content).await?;
    messages_ops::insert(&mut *conn, session_id, &user_id, "assistant", &assistant_content)
        .await?;

    Ok(ChatReply {
        role: "assistant".to_string(),
        content: assistant_content,
    })
}

async fn build_system_prompt(
    conn: &mut sqlx::PgConnection,
    user_id: &str,
) -> Result<String, sqlx::Error> {
    let snapshot = progress::get_or_create(&mut *conn, user_id).await?;
    let weak = topic_mastery::weak_topics(&mut *conn, user_id, None).await?;

    let mut prompt = format!(
        "You are a helpful mathematics tutor specializing in long division. \
         Help students understand the step-by-step process, explain remainders, \
         and guide them through solving division problems. Answer clearly and \
         concisely. The student is currently at level {} of 10.",
        snapshot.level
    );

    if !weak.is_empty() {
        let catalog = topics_ops::list_all(&mut *conn).await?;
        let names: Vec<String> = weak
            .iter()
            .filter_map(|m| {
                catalog
                    .iter()
                    .find(|t| t.id == m.topic_id)
                    .map(|t| t.name.clone())
            })
            .collect();
        if !names.is_empty() {
            prompt.push_str(&format!(
                " They are currently struggling with: {}.",
                names.join(", ")
            ));
        }
    }

    Ok(prompt)
}
