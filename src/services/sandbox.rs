use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_SNAPSHOT: &str = "manim-voiceover-v4";
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    #[serde(default)]
    pub exit_code: i64,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateResponse {
    id: String,
}

/// HTTP client for the remote render sandbox. One sandbox is created per
/// render and deleted after it, whether the render succeeded or not.
#[derive(Clone)]
pub struct SandboxClient {
    api_url: Option<String>,
    api_key: Option<String>,
    snapshot: String,
    client: reqwest::Client,
}

impl SandboxClient {
    pub fn from_env() -> Self {
        let api_url = std::env::var("SANDBOX_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string());
        let api_key = std::env::var("SANDBOX_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let snapshot = std::env::var("SANDBOX_SNAPSHOT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string());

        let timeout = std::env::var("SANDBOX_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_url,
            api_key,
            snapshot,
            client,
        }
    }

    fn base(&self) -> Result<(&str, &str), SandboxError> {
        let url = self
            .api_url
            .as_deref()
            .ok_or(SandboxError::NotConfigured("SANDBOX_API_URL"))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or(SandboxError::NotConfigured("SANDBOX_API_KEY"))?;
        Ok((url, key))
    }

    pub async fn create(&self) -> Result<String, SandboxError> {
        let (url, key) = self.base()?;
        let resp = self
            .client
            .post(format!("{url}/sandboxes"))
            .bearer_auth(key)
            .json(&serde_json::json!({ "snapshot": self.snapshot }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let created: CreateResponse = resp.json().await?;
        Ok(created.id)
    }

    pub async fn exec(&self, sandbox_id: &str, command: &str) -> Result<ExecResult, SandboxError> {
        let (url, key) = self.base()?;
        let resp = self
            .client
            .post(format!("{url}/sandboxes/{sandbox_id}/exec"))
            .bearer_auth(key)
            .json(&serde_json::json!({ "command": command }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete(&self, sandbox_id: &str) -> Result<(), SandboxError> {
        let (url, key) = self.base()?;
        let resp = self
            .client
            .delete(format!("{url}/sandboxes/{sandbox_id}"))
            .bearer_auth(key)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SandboxError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SandboxError::HttpStatus { status, body })
}
