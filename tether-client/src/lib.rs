//! Tether HTTP Clients
//!
//! Type-safe HTTP clients for the remote providers that run Tether jobs.
//!
//! Each provider client speaks its own wire format and exposes the same two
//! operations through the [`JobProvider`] and [`StatusSource`] traits:
//! submitting a job and reading its current status. Everything the job
//! runner needs to know about a provider goes through those traits.
//!
//! # Example
//!
//! ```no_run
//! use tether_client::{OpenAiClient, StatusSource};
//! use tether_core::domain::job::JobId;
//!
//! #[tokio::main]
//! async fn main() -> tether_client::Result<()> {
//!     let client = OpenAiClient::new("sk-...", OpenAiClient::DEFAULT_BASE_URL);
//!
//!     let snapshot = client.get_status(&JobId::new("resp_abc123")).await?;
//!
//!     println!("{} is {}", snapshot.id, snapshot.state());
//!     Ok(())
//! }
//! ```

pub mod error;
mod deepseek;
mod gamma;
mod openai;
mod provider;

// Re-export commonly used types
pub use deepseek::DeepSeekClient;
pub use error::{ClientError, Result};
pub use gamma::GammaClient;
pub use openai::OpenAiClient;
pub use provider::{JobProvider, StatusSource};

use reqwest::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use std::path::Path;

/// Shared HTTP plumbing for the provider clients
///
/// Holds the provider base URL and the reqwest client. Timeouts, proxies and
/// TLS settings are configured on the reqwest client passed to
/// [`ApiClient::with_client`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the provider (e.g., "https://api.openai.com/v1")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Example
    /// ```
    /// use tether_client::ApiClient;
    ///
    /// let api = ApiClient::new("https://api.openai.com/v1/");
    /// assert_eq!(api.base_url(), "https://api.openai.com/v1");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// # Example
    /// ```
    /// use tether_client::ApiClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(120))
    ///     .build()
    ///     .unwrap();
    ///
    /// let api = ApiClient::with_client("https://public-api.gamma.app/v1.0", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the provider
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Download `url` into `path`, returning the number of bytes written
    ///
    /// The URL is absolute; export links usually live on a CDN, not below the
    /// provider base URL.
    pub async fn download(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let bytes = response.bytes().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;

        Ok(bytes.len() as u64)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and return its JSON body
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed. Bodies are kept as raw JSON; the provider clients
    /// read the fields they need from it.
    pub(crate) async fn handle_response(&self, response: reqwest::Response) -> Result<JsonValue> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
