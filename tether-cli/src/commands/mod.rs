//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod assets;
mod extract;
mod poll;
mod present;
mod research;

pub use assets::AssetsArgs;
pub use extract::ExtractArgs;
pub use poll::{PollArgs, PollProvider};
pub use present::PresentArgs;
pub use research::ResearchArgs;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::*;
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tether_client::{JobProvider, StatusSource};
use tether_core::domain::job::{JobId, JobSnapshot, JobState};
use tether_runner::{AdaptivePoller, JobError, Materializer, RunnerConfig, Submitter};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::progress::ConsoleProgress;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a research query
    Research(ResearchArgs),
    /// Wait for (or check) a job submitted earlier
    Poll(PollArgs),
    /// Generate a presentation
    Present(PresentArgs),
    /// Show or download the exports of a presentation
    Assets(AssetsArgs),
    /// Extract the markdown report from a saved raw research response
    Extract(ExtractArgs),
}

/// Everything a command needs from the invocation
pub struct Context {
    pub settings: Settings,
    pub verbose: bool,
    pub cancel: CancellationToken,
}

impl Context {
    /// A poller wired to console progress and Ctrl+C
    pub fn poller<S: StatusSource + ?Sized>(
        &self,
        source: Arc<S>,
        config: &RunnerConfig,
    ) -> AdaptivePoller<S> {
        AdaptivePoller::new(source, config)
            .with_progress(Arc::new(ConsoleProgress::new(self.verbose)))
            .with_cancellation(self.cancel.clone())
    }

    /// A submitter that gives up when Ctrl+C arrives
    pub fn submitter<P: JobProvider + ?Sized>(
        &self,
        provider: Arc<P>,
        config: &RunnerConfig,
    ) -> Submitter<P> {
        Submitter::new(provider, config).with_cancellation(self.cancel.clone())
    }

    /// Fails once Ctrl+C has arrived so that nothing more is written
    pub fn ensure_active(&self, during: &str) -> Result<(), JobError> {
        if self.cancel.is_cancelled() {
            return Err(JobError::Cancelled {
                during: during.to_string(),
            });
        }
        Ok(())
    }

    /// Runs `work` unless Ctrl+C arrives first
    pub async fn until_cancelled<F: Future>(
        &self,
        during: &str,
        work: F,
    ) -> Result<F::Output, JobError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(JobError::Cancelled {
                during: during.to_string(),
            }),
            output = work => Ok(output),
        }
    }

    pub fn materializer(&self) -> Materializer {
        Materializer::new(&self.settings.tether_output_dir)
    }
}

/// Options shared by every command that waits on a job
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Overall wait budget in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Query the status once and return instead of waiting
    #[arg(long)]
    pub check_only: bool,
}

impl WaitArgs {
    /// Applies the overrides to a base configuration
    pub fn config(&self, base: RunnerConfig) -> Result<RunnerConfig> {
        let config = match self.timeout {
            Some(secs) => base.with_timeout(Duration::from_secs(secs)),
            None => base,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `ctx` - Settings, verbosity and the cancellation token
pub async fn handle_command(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Research(args) => research::handle_research(args, ctx).await,
        Commands::Poll(args) => poll::handle_poll(args, ctx).await,
        Commands::Present(args) => present::handle_present(args, ctx).await,
        Commands::Assets(args) => assets::handle_assets(args, ctx).await,
        Commands::Extract(args) => extract::handle_extract(args).await,
    }
}

/// Waits for a job, or checks it once
///
/// Returns `None` when a single check found the job still pending. When the
/// wait stops short of a result that may still come, the command to resume is
/// printed.
pub async fn await_job<S: StatusSource + ?Sized>(
    poller: &AdaptivePoller<S>,
    id: &JobId,
    check_only: bool,
    provider: PollProvider,
) -> Result<Option<JobSnapshot>> {
    if check_only {
        let snapshot = poller.check(id).await?;
        // The poller has already warned about an unrecognized status
        let state = snapshot.status.classify().unwrap_or(JobState::Pending);
        return match state {
            JobState::Succeeded => Ok(Some(snapshot)),
            JobState::Failed => Err(JobError::JobFailed {
                id: id.clone(),
                detail: snapshot
                    .error
                    .unwrap_or_else(|| format!("provider reported '{}'", snapshot.status)),
                elapsed: Duration::ZERO,
            }
            .into()),
            JobState::Pending => {
                // The provider's own answer carries progress details
                let shown = snapshot.payload.unwrap_or_else(|| {
                    json!({
                        "id": id,
                        "status": snapshot.status.raw(),
                        "state": state,
                    })
                });
                println!("{}", serde_json::to_string_pretty(&shown)?);
                print_resume_hint(id, provider);
                Ok(None)
            }
        };
    }

    match poller.wait(id).await {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            if e.is_resumable() {
                print_resume_hint(id, provider);
            }
            Err(e.into())
        }
    }
}

/// Prints how to pick a job back up later
pub fn print_resume_hint(id: &JobId, provider: PollProvider) {
    eprintln!(
        "{} {}",
        "Resume with:".bold(),
        provider.resume_command(id).cyan()
    );
}

/// Reads an inline value or the contents of its file counterpart
pub fn read_input(inline: Option<String>, file: Option<&Path>, what: &str) -> Result<String> {
    let text = match (inline, file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {} from {}", what, path.display()))?,
        (Some(_), Some(_)) => anyhow::bail!("Give the {} inline or as a file, not both", what),
        (None, None) => anyhow::bail!("No {} given", what),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        anyhow::bail!("The {} is empty", what);
    }
    Ok(text)
}

/// Prints where materialized files went, and what could not be written
pub fn report_written(written: &[PathBuf], failures: &[(PathBuf, std::io::Error)]) {
    for path in written {
        eprintln!("{} {}", "✓ Saved".green(), path.display());
    }
    for (path, e) in failures {
        eprintln!(
            "{} {}: {}",
            "⚠ Could not write".yellow(),
            path.display(),
            e
        );
    }
}
