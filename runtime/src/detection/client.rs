use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde_json::Value;
use tokio::time::Duration;

use super::types::DetectionResult;

/// Boundary to the external detection service. The pipeline only ever sees
/// this trait, so tests swap in a stub instead of a live endpoint.
#[async_trait]
pub trait DetectionService: Send + Sync {
    async fn detect(&self, filename: &str, ledger: &[u8]) -> Result<DetectionResult>;
}

pub struct HttpDetectionClient {
    http: Client,
    base: String,
}

impl HttpDetectionClient {
    pub fn new(base: String) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(600))
            .build()
            .expect("client");
        Self { http, base }
    }
}

#[async_trait]
impl DetectionService for HttpDetectionClient {
    /// One multipart upload, no retries. A failed attempt is terminal for
    /// the current ingestion.
    async fn detect(&self, filename: &str, ledger: &[u8]) -> Result<DetectionResult> {
        let part = multipart::Part::bytes(ledger.to_vec())
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .context("failed to build multipart payload")?;
        let form = multipart::Form::new().part("file", part);

        let response = match self
            .http
            .post(format!("{}/api/detect", self.base))
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => anyhow::bail!("Network error | {err}"),
        };

        let status = response.status();
        if status.is_success() {
            return response
                .json::<DetectionResult>()
                .await
                .context("failed to decode detection result body");
        }

        let body = response.text().await.unwrap_or_default();
        match error_detail(&body) {
            Some(detail) => anyhow::bail!("{detail}"),
            None if !body.trim().is_empty() => {
                anyhow::bail!("detection service error {status}: {body}")
            }
            None => anyhow::bail!("detection service error {status}"),
        }
    }
}

/// Service error bodies carry a human-readable `detail` field; prefer it
/// over raw transport text.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .map(|detail| detail.to_string())
}
