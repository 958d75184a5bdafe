//! Gamma presentation client
//!
//! Generations are asynchronous: `POST /generations` returns a generation id
//! and `GET /generations/{id}` reports its status and, once finished, the
//! hosted and exported URLs. Authentication uses the `X-API-KEY` header.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::path::Path;
use tether_core::domain::job::{JobId, JobSnapshot, JobState};
use tether_core::domain::status::ProviderStatus;
use tether_core::dto::presentation::{
    GenerationRequest, generation_error, generation_id, generation_status,
};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::provider::{JobProvider, StatusSource};
use crate::ApiClient;

const API_KEY_HEADER: &str = "X-API-KEY";

/// Client for the Gamma generations API
#[derive(Debug, Clone)]
pub struct GammaClient {
    api: ApiClient,
    api_key: String,
}

impl GammaClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://public-api.gamma.app/v1.0";

    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(api_key, base_url, Client::new())
    }

    pub fn with_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            api: ApiClient::with_client(base_url, client),
            api_key: api_key.into(),
        }
    }

    /// Downloads an exported asset to a local file
    pub async fn download_asset(&self, url: &str, path: &Path) -> Result<u64> {
        debug!("Downloading {} to {}", url, path.display());
        self.api.download(url, path).await
    }

    fn snapshot(id: JobId, raw: JsonValue) -> JobSnapshot {
        let mut status = generation_status(&raw);
        if status.is_empty() {
            status = "unknown".to_string();
        }

        let mut snapshot = JobSnapshot::new(id, ProviderStatus::Gamma(status));
        if snapshot.status.classify() == Some(JobState::Failed) {
            let detail = generation_error(&raw)
                .unwrap_or_else(|| format!("Generation failed: {}", raw));
            snapshot = snapshot.with_error(detail);
        }

        snapshot.with_payload(raw)
    }
}

#[async_trait]
impl StatusSource for GammaClient {
    fn provider_name(&self) -> &str {
        "gamma"
    }

    async fn get_status(&self, id: &JobId) -> Result<JobSnapshot> {
        debug!("Fetching Gamma generation {}", id);

        let response = self
            .api
            .get(&format!("generations/{}", id))
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let raw = self.api.handle_response(response).await?;
        Ok(Self::snapshot(id.clone(), raw))
    }
}

#[async_trait]
impl JobProvider for GammaClient {
    type Request = GenerationRequest;

    async fn submit(&self, request: &GenerationRequest) -> Result<JobSnapshot> {
        debug!("Creating Gamma generation ({} chars of input)", request.input_text.len());

        let response = self
            .api
            .post("generations")
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let raw = self.api.handle_response(response).await?;

        let id = generation_id(&raw).ok_or_else(|| {
            ClientError::ParseError(format!(
                "Failed to extract generation ID from response: {}",
                raw
            ))
        })?;

        // Creation responses usually carry only the id
        if generation_status(&raw).is_empty() {
            return Ok(JobSnapshot::new(id, ProviderStatus::Gamma("pending".to_string()))
                .with_payload(raw));
        }

        Ok(Self::snapshot(JobId::new(id), raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_failed_generation() {
        let snapshot = GammaClient::snapshot(
            JobId::new("gen_1"),
            json!({ "status": "FAILED", "error": { "message": "credits exhausted" } }),
        );
        assert_eq!(snapshot.state(), JobState::Failed);
        assert_eq!(snapshot.error.as_deref(), Some("credits exhausted"));
    }

    #[test]
    fn test_snapshot_missing_status() {
        let snapshot = GammaClient::snapshot(JobId::new("gen_2"), json!({}));
        assert_eq!(snapshot.status, ProviderStatus::Gamma("unknown".to_string()));
        assert_eq!(snapshot.state(), JobState::Pending);
    }
}
