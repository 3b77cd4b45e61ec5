use std::time::Duration;

use thiserror::Error;

const DEFAULT_BUCKET: &str = "videos";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Object storage client for rendered videos (Supabase storage REST).
/// Objects are publicly readable; writes go through the service key.
#[derive(Clone)]
pub struct StorageClient {
    base_url: Option<String>,
    service_key: Option<String>,
    bucket: String,
    client: reqwest::Client,
}

impl StorageClient {
    pub fn from_env() -> Self {
        let base_url = std::env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string());
        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let bucket = std::env::var("STORAGE_BUCKET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url,
            service_key,
            bucket,
            client,
        }
    }

    fn base(&self) -> Result<(&str, &str), StorageError> {
        let url = self
            .base_url
            .as_deref()
            .ok_or(StorageError::NotConfigured("SUPABASE_URL"))?;
        let key = self
            .service_key
            .as_deref()
            .ok_or(StorageError::NotConfigured("SUPABASE_SERVICE_KEY"))?;
        Ok((url, key))
    }

    pub fn public_url(&self, path: &str) -> String {
        let base = self.base_url.as_deref().unwrap_or_default();
        format!("{base}/storage/v1/object/public/{}/{path}", self.bucket)
    }

    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let (url, key) = self.base()?;
        let resp = self
            .client
            .post(format!("{url}/storage/v1/object/{}/{path}", self.bucket))
            .bearer_auth(key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(self.public_url(path))
    }

    pub async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }
        let (url, key) = self.base()?;
        let resp = self
            .client
            .delete(format!("{url}/storage/v1/object/{}", self.bucket))
            .bearer_auth(key)
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StorageError::HttpStatus { status, body })
}
