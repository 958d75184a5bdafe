//! Provider status normalization
//!
//! Providers describe the same three states with different words. Each known
//! provider gets its own variant so its vocabulary is mapped in one place,
//! instead of probing response fields at the call sites.

use tracing::warn;

use crate::domain::job::JobState;

/// Status string as reported by a provider, tagged with its vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    /// OpenAI Responses API (`queued`, `in_progress`, `completed`, ...)
    OpenAi(String),
    /// Gamma generations API (`pending`, `completed`, `failed`, ...)
    Gamma(String),
    /// Synchronous providers answer the submission with the final result
    Immediate,
}

impl ProviderStatus {
    /// Name of the provider vocabulary
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderStatus::OpenAi(_) => "openai",
            ProviderStatus::Gamma(_) => "gamma",
            ProviderStatus::Immediate => "immediate",
        }
    }

    /// The status exactly as the provider spelled it
    pub fn raw(&self) -> &str {
        match self {
            ProviderStatus::OpenAi(s) | ProviderStatus::Gamma(s) => s,
            ProviderStatus::Immediate => "completed",
        }
    }

    /// Maps the status onto a [`JobState`], or `None` if the word is unknown
    pub fn classify(&self) -> Option<JobState> {
        match self {
            ProviderStatus::OpenAi(s) => match s.to_ascii_lowercase().as_str() {
                "queued" | "in_progress" | "processing" | "pending" => Some(JobState::Pending),
                "completed" => Some(JobState::Succeeded),
                "failed" | "cancelled" | "incomplete" => Some(JobState::Failed),
                _ => None,
            },
            ProviderStatus::Gamma(s) => match s.to_ascii_lowercase().as_str() {
                "pending" | "queued" | "processing" | "in_progress" | "running" => {
                    Some(JobState::Pending)
                }
                "completed" | "succeeded" => Some(JobState::Succeeded),
                "failed" | "error" => Some(JobState::Failed),
                _ => None,
            },
            ProviderStatus::Immediate => Some(JobState::Succeeded),
        }
    }

    /// Total mapping onto a [`JobState`]
    ///
    /// Unknown words are treated as still pending so that new provider
    /// statuses do not abort a long wait.
    pub fn normalize(&self) -> JobState {
        self.classify().unwrap_or_else(|| {
            warn!(
                provider = self.provider(),
                status = self.raw(),
                "Unrecognized provider status, treating as pending"
            );
            JobState::Pending
        })
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw())
    }
}
