//! OpenAI deep research client
//!
//! Research runs as a background response: `POST /responses` with
//! `background: true` returns immediately with an id, and
//! `GET /responses/{id}` reports progress until the report is ready.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tether_core::domain::job::{JobId, JobSnapshot, JobState};
use tether_core::domain::status::ProviderStatus;
use tether_core::dto::research::{CreateResponse, ResearchRequest, ResponseObject};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::provider::{JobProvider, StatusSource};
use crate::ApiClient;

/// Client for the OpenAI Responses API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api: ApiClient,
    api_key: String,
}

impl OpenAiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "o1";

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

    /// Builds a snapshot from a response object
    ///
    /// `fallback_id` is used when the body does not echo the id back.
    fn snapshot(raw: JsonValue, fallback_id: Option<&JobId>) -> Result<JobSnapshot> {
        let parsed = ResponseObject::from_json(&raw).ok_or_else(|| {
            ClientError::ParseError(format!("Unexpected response object: {}", raw))
        })?;

        let id = match (parsed.id.as_deref(), fallback_id) {
            (Some(id), _) => JobId::new(id),
            (None, Some(id)) => id.clone(),
            (None, None) => {
                return Err(ClientError::ParseError(format!(
                    "Response has no id: {}",
                    raw
                )));
            }
        };

        let status = ProviderStatus::OpenAi(parsed.status.clone().unwrap_or_else(|| "unknown".into()));
        let mut snapshot = JobSnapshot::new(id, status);

        if snapshot.status.classify() == Some(JobState::Failed) {
            let detail = parsed
                .failure_detail()
                .unwrap_or_else(|| format!("Response ended with status '{}'", snapshot.status));
            snapshot = snapshot.with_error(detail);
        }

        Ok(snapshot.with_payload(raw))
    }
}

#[async_trait]
impl StatusSource for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn get_status(&self, id: &JobId) -> Result<JobSnapshot> {
        debug!("Fetching OpenAI response {}", id);

        let response = self
            .api
            .get(&format!("responses/{}", id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let raw = self.api.handle_response(response).await?;
        Self::snapshot(raw, Some(id))
    }
}

#[async_trait]
impl JobProvider for OpenAiClient {
    type Request = ResearchRequest;

    async fn submit(&self, request: &ResearchRequest) -> Result<JobSnapshot> {
        debug!("Creating OpenAI background response with model {}", request.model);

        let response = self
            .api
            .post("responses")
            .bearer_auth(&self.api_key)
            .json(&CreateResponse::background(request))
            .send()
            .await?;

        let raw = self.api.handle_response(response).await?;
        Self::snapshot(raw, None)
    }
}
