use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{Duration, Utc};
use thiserror::Error;

use crate::db::operations::questions::Question;
use crate::db::operations::videos::VideoStatus;
use crate::db::operations::{
    attempts as attempts_ops, questions as questions_ops, sessions as sessions_ops,
    videos as videos_ops,
};
use crate::db::Database;
use crate::services::llm_provider::{extract_json, LLMError, LLMProvider};
use crate::services::sandbox::{SandboxClient, SandboxError};
use crate::services::storage::{StorageClient, StorageError};

const DEFAULT_RETENTION_HOURS: i64 = 24;
const RENDER_LOG_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("session not found")]
    SessionNotFound,
    #[error("question not found")]
    QuestionNotFound,
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("render failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone)]
pub struct VideoHandle {
    pub video_id: String,
    pub status: VideoStatus,
}

#[derive(Debug, Clone)]
pub struct CleanupSummary {
    pub deleted: usize,
    pub files: Vec<String>,
}

/// Orchestrates the render pipeline: explanation text, an animation script,
/// a sandboxed render, and the storage upload. Generation is decoupled from
/// the request; callers poll the status row until it leaves `generating`.
pub struct VideoService {
    llm: LLMProvider,
    sandbox: SandboxClient,
    storage: StorageClient,
}

impl VideoService {
    pub fn from_env() -> Self {
        Self {
            llm: LLMProvider::from_env(),
            sandbox: SandboxClient::from_env(),
            storage: StorageClient::from_env(),
        }
    }

    /// Inserts the `generating` row, marks the attempt, and spawns the
    /// pipeline task. Returns the polling handle immediately.
    pub async fn start_generation(
        self: &Arc<Self>,
        db: Arc<Database>,
        session_id: &str,
        question_id: &str,
    ) -> Result<VideoHandle, VideoError> {
        let mut conn = db.pool().acquire().await?;

        let session = sessions_ops::find(&mut *conn, session_id)
            .await?
            .ok_or(VideoError::SessionNotFound)?;
        let question = questions_ops::find(&mut *conn, question_id)
            .await?
            .ok_or(VideoError::QuestionNotFound)?;

        let video_id = uuid::Uuid::new_v4().to_string();
        videos_ops::insert_generating(&mut *conn, &video_id, &question.id, &session.id).await?;
        attempts_ops::mark_video_requested(&mut *conn, &session.user_id, &question.id).await?;
        drop(conn);

        let service = Arc::clone(self);
        let task_id = video_id.clone();
        tokio::spawn(async move {
            service.run_pipeline(db, task_id, question).await;
        });

        Ok(VideoHandle {
            video_id,
            status: VideoStatus::Generating,
        })
    }

    async fn run_pipeline(&self, db: Arc<Database>, video_id: String, question: Question) {
        let outcome = self.render_and_upload(&video_id, &question).await;

        let result = match outcome {
            Ok(url) => {
                tracing::info!(video_id = %video_id, url = %url, "video ready");
                videos_ops::mark_ready(db.pool(), &video_id, &url).await
            }
            Err(err) => {
                tracing::warn!(video_id = %video_id, error = %err, "video generation failed");
                videos_ops::mark_failed(db.pool(), &video_id, &err.to_string()).await
            }
        };

        if let Err(err) = result {
            tracing::error!(video_id = %video_id, error = %err, "failed to persist video status");
        }
    }

    async fn render_and_upload(
        &self,
        video_id: &str,
        question: &Question,
    ) -> Result<String, VideoError> {
        let explanation = self.generate_explanation(question).await?;
        let scene_code = self.generate_scene_code(question, &explanation).await?;
        let video_bytes = self.render_in_sandbox(&scene_code).await?;
        let url = self
            .storage
            .upload(&format!("{video_id}.mp4"), video_bytes, "video/mp4")
            .await?;
        Ok(url)
    }

    async fn generate_explanation(&self, question: &Question) -> Result<String, VideoError> {
        let system = "You are a mathematics teaching assistant. Explain solutions simply.";
        let prompt = format!(
            "Explain, step by step, how to solve {} ÷ {} with long division. \
             Respond with JSON of the form {{\"explanation\": \"...\"}} using \
             short sentences a child can follow.",
            question.dividend, question.divisor
        );

        let text = self.llm.complete_with_system(system, &prompt).await?;
        extract_json(&text)
            .ok()
            .and_then(|v| {
                v.get("explanation")
                    .and_then(|e| e.as_str())
                    .map(String::from)
            })
            .ok_or_else(|| VideoError::Render("unparseable explanation".to_string()))
    }

    async fn generate_scene_code(
        &self,
        question: &Question,
        explanation: &str,
    ) -> Result<String, VideoError> {
        let system = "You write Manim animation scripts. Output only Python code.";
        let prompt = format!(
            "Write a Manim scene class named ExplanationScene that animates this \
             long-division walkthrough of {} ÷ {}:\n\n{explanation}\n\n\
             Output only the Python source, no commentary.",
            question.dividend, question.divisor
        );

        let code = self.llm.complete_with_system(system, &prompt).await?;
        Ok(strip_code_fences(&code))
    }

    async fn render_in_sandbox(&self, scene_code: &str) -> Result<Vec<u8>, VideoError> {
        let sandbox_id = self.sandbox.create().await?;
        let rendered = self.render_steps(&sandbox_id, scene_code).await;

        // Teardown happens on both outcomes.
        if let Err(err) = self.sandbox.delete(&sandbox_id).await {
            tracing::warn!(sandbox_id = %sandbox_id, error = %err, "sandbox teardown failed");
        }

        rendered
    }

    async fn render_steps(
        &self,
        sandbox_id: &str,
        scene_code: &str,
    ) -> Result<Vec<u8>, VideoError> {
        let ascii: String = scene_code.chars().filter(|c| c.is_ascii()).collect();
        let encoded = BASE64.encode(ascii.as_bytes());
        self.sandbox
            .exec(sandbox_id, &format!("echo '{encoded}' | base64 -d > scene.py"))
            .await?;

        let render = self
            .sandbox
            .exec(sandbox_id, "python3 -m manim -ql scene.py ExplanationScene 2>&1")
            .await?;

        let located = self
            .sandbox
            .exec(
                sandbox_id,
                "find media -name 'ExplanationScene.mp4' -type f 2>/dev/null",
            )
            .await?;
        let video_path = located.result.trim().to_string();
        if video_path.is_empty() {
            return Err(VideoError::Render(truncate(&render.result, RENDER_LOG_LIMIT)));
        }

        let transfer = self
            .sandbox
            .exec(sandbox_id, &format!("cat {video_path} | base64 | tr -d '\\n'"))
            .await?;
        let cleaned: String = transfer
            .result
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
            .collect();

        BASE64
            .decode(cleaned.as_bytes())
            .map_err(|err| VideoError::Render(format!("video transfer corrupted: {err}")))
    }

    /// Removes terminal video rows past the retention window along with
    /// their storage objects.
    pub async fn cleanup_old(&self, db: &Database) -> Result<CleanupSummary, VideoError> {
        let retention_hours = std::env::var("VIDEO_RETENTION_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_RETENTION_HOURS);
        let cutoff = Utc::now() - Duration::hours(retention_hours);

        let stale = videos_ops::terminal_older_than(db.pool(), cutoff).await?;
        if stale.is_empty() {
            return Ok(CleanupSummary {
                deleted: 0,
                files: Vec::new(),
            });
        }

        let files: Vec<String> = stale
            .iter()
            .filter(|v| v.video_url.is_some())
            .map(|v| format!("{}.mp4", v.id))
            .collect();
        if !files.is_empty() {
            self.storage.remove(&files).await?;
        }

        let ids: Vec<String> = stale.iter().map(|v| v.id.clone()).collect();
        let deleted = videos_ops::delete_by_ids(db.pool(), &ids).await?;

        Ok(CleanupSummary {
            deleted: deleted as usize,
            files,
        })
    }
}

pub async fn status(
    db: &Database,
    video_id: &str,
) -> Result<Option<videos_ops::VideoRecord>, sqlx::Error> {
    videos_ops::find(db.pool(), video_id).await
}

fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```python") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    text.trim().to_string()
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```python\nclass ExplanationScene:\n    pass\n```";
        assert_eq!(
            strip_code_fences(fenced),
            "class ExplanationScene:\n    pass"
        );
        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_truncate_respects_limit() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
