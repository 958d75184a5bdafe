//! Configuration module
//!
//! Handles CLI settings: provider credentials, endpoints, default models and
//! the output directory. Values come from the process environment layered
//! over an optional `.env` file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tether_client::{DeepSeekClient, GammaClient, OpenAiClient};

/// Research backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResearchProvider {
    /// OpenAI background deep research
    #[default]
    #[value(name = "openai")]
    OpenAi,
    /// DeepSeek reasoning, answered synchronously
    #[value(name = "deepseek")]
    DeepSeek,
}

impl ResearchProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchProvider::OpenAi => "openai",
            ResearchProvider::DeepSeek => "deepseek",
        }
    }
}

/// CLI settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_default_model: String,

    pub deepseek_api_key: Option<String>,
    #[serde(default = "default_deepseek_base_url")]
    pub deepseek_base_url: String,
    #[serde(default = "default_deepseek_model")]
    pub deepseek_default_model: String,

    pub gamma_api_key: Option<String>,
    #[serde(default = "default_gamma_base_url")]
    pub gamma_base_url: String,

    /// Provider used by `research` when none is given
    #[serde(default)]
    pub reasoning_default_provider: ResearchProvider,

    /// Where results go when no output path is given
    #[serde(default = "default_output_dir")]
    pub tether_output_dir: PathBuf,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub tether_http_timeout: u64,
}

fn default_openai_base_url() -> String {
    OpenAiClient::DEFAULT_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    OpenAiClient::DEFAULT_MODEL.to_string()
}

fn default_deepseek_base_url() -> String {
    DeepSeekClient::DEFAULT_BASE_URL.to_string()
}

fn default_deepseek_model() -> String {
    DeepSeekClient::DEFAULT_MODEL.to_string()
}

fn default_gamma_base_url() -> String {
    GammaClient::DEFAULT_BASE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("99-TMP/OUTPUT")
}

fn default_http_timeout() -> u64 {
    120
}

impl Settings {
    /// Loads settings from the environment and a `.env` file
    ///
    /// `env_file` is read when given; otherwise a `.env` in the working
    /// directory or one of its parents is used if present. Variables already
    /// set in the process environment take precedence over the file.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let mut vars = HashMap::new();

        match env_file {
            Some(path) => {
                let entries = dotenvy::from_path_iter(path)
                    .with_context(|| format!("Failed to read env file {}", path.display()))?;
                for entry in entries {
                    let (key, value) = entry
                        .with_context(|| format!("Invalid entry in {}", path.display()))?;
                    vars.insert(key, value);
                }
            }
            None => {
                if let Ok(entries) = dotenvy::dotenv_iter() {
                    for entry in entries {
                        let (key, value) = entry.context("Invalid entry in .env")?;
                        vars.insert(key, value);
                    }
                }
            }
        }

        vars.extend(utf8_vars(std::env::vars_os()));
        Self::from_vars(vars)
    }

    /// Builds settings from explicit key/value pairs
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        envy::from_iter(vars).context("Invalid configuration")
    }

    pub fn default_model(&self, provider: ResearchProvider) -> &str {
        match provider {
            ResearchProvider::OpenAi => &self.openai_default_model,
            ResearchProvider::DeepSeek => &self.deepseek_default_model,
        }
    }

    pub fn openai(&self) -> Result<OpenAiClient> {
        let key = require(&self.openai_api_key, "OPENAI_API_KEY")?;
        Ok(OpenAiClient::with_client(
            key,
            &self.openai_base_url,
            self.http_client()?,
        ))
    }

    pub fn deepseek(&self) -> Result<DeepSeekClient> {
        let key = require(&self.deepseek_api_key, "DEEPSEEK_API_KEY")?;
        Ok(DeepSeekClient::with_client(
            key,
            &self.deepseek_base_url,
            self.http_client()?,
        ))
    }

    pub fn gamma(&self) -> Result<GammaClient> {
        let key = require(&self.gamma_api_key, "GAMMA_API_KEY")?;
        Ok(GammaClient::with_client(
            key,
            &self.gamma_base_url,
            self.http_client()?,
        ))
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.tether_http_timeout))
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Keeps the variables that are valid UTF-8; no setting can be anything else
fn utf8_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} is not set (export it or add it to a .env file)", key))
}
