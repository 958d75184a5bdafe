//! DeepSeek reasoning client
//!
//! DeepSeek answers a chat completion synchronously, so a submission is
//! already terminal and carries the full result. There is no remote job to
//! reconnect to afterwards.

use async_trait::async_trait;
use reqwest::Client;
use tether_core::domain::job::{JobId, JobSnapshot};
use tether_core::domain::status::ProviderStatus;
use tether_core::dto::research::{ChatCompletionRequest, ResearchRequest};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::provider::{JobProvider, StatusSource};
use crate::ApiClient;

/// Client for the DeepSeek chat completions API
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    api: ApiClient,
    api_key: String,
}

impl DeepSeekClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.deepseek.com";
    pub const DEFAULT_MODEL: &'static str = "deepseek-reasoner";

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
}

#[async_trait]
impl StatusSource for DeepSeekClient {
    fn provider_name(&self) -> &str {
        "deepseek"
    }

    async fn get_status(&self, id: &JobId) -> Result<JobSnapshot> {
        Err(ClientError::Unsupported(format!(
            "DeepSeek answers synchronously; request {} has no remote state to poll",
            id
        )))
    }
}

#[async_trait]
impl JobProvider for DeepSeekClient {
    type Request = ResearchRequest;

    async fn submit(&self, request: &ResearchRequest) -> Result<JobSnapshot> {
        debug!("Sending DeepSeek chat completion with model {}", request.model);

        let response = self
            .api
            .post("v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest::reasoning(request))
            .send()
            .await?;

        let raw = self.api.handle_response(response).await?;

        let id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("deepseek_{}", uuid::Uuid::new_v4().simple()));

        Ok(JobSnapshot::new(id, ProviderStatus::Immediate).with_payload(raw))
    }
}
