//! Tether CLI
//!
//! Command-line interface for submitting long-running provider jobs and
//! tracking them until their results land on disk.

mod commands;
mod config;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use colored::*;
use commands::{Commands, Context, handle_command};
use config::Settings;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tether_runner::JobError;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Submit, poll and collect long-running research and presentation jobs", long_about = None)]
struct Cli {
    /// Load API keys and settings from this .env file
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Show every poll attempt and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout only carries results
    let default_filter = if cli.verbose { "tether=debug" } else { "tether=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping");
            interrupt.cancel();
        }
    });

    match run_until_cancelled(run(cli, cancel.clone()), &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let settings = Settings::load(cli.env_file.as_deref())?;

    let ctx = Context {
        settings,
        verbose: cli.verbose,
        cancel,
    };

    handle_command(cli.command, &ctx).await
}

/// Drives a command until it finishes or Ctrl+C arrives
///
/// The command is polled first, so a step that reacts to the interrupt
/// itself still reports its own outcome. A step that does not is dropped.
async fn run_until_cancelled<F>(work: F, cancel: &CancellationToken) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        biased;
        result = work => result,
        _ = cancel.cancelled() => Err(JobError::Cancelled {
            during: "command".to_string(),
        }
        .into()),
    }
}

/// Exit code for a failed invocation
///
/// Job outcomes keep their own codes wherever they sit in the error chain.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<JobError>())
        .and_then(|job| u8::try_from(job.exit_code()).ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tether_core::domain::job::JobId;

    #[test]
    fn test_exit_code_for_job_errors() {
        let timeout = anyhow::Error::new(JobError::Timeout {
            id: JobId::new("resp_1"),
            elapsed: Duration::from_secs(1800),
            timeout: Duration::from_secs(1800),
            last_status: "in_progress".into(),
        });
        assert_eq!(exit_code(&timeout), 5);

        let wrapped = anyhow::Error::new(JobError::Interrupted {
            id: JobId::new("resp_1"),
            elapsed: Duration::ZERO,
        })
        .context("while waiting");
        assert_eq!(exit_code(&wrapped), 130);

        assert_eq!(exit_code(&anyhow::anyhow!("bad config")), 1);
    }

    #[tokio::test]
    async fn test_interrupt_ends_unaware_command() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_until_cancelled(std::future::pending::<Result<()>>(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(exit_code(&err), 130);
    }

    #[tokio::test]
    async fn test_interrupt_keeps_command_outcome() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let token = cancel.clone();
        let err = run_until_cancelled(
            async move {
                token.cancelled().await;
                Result::<()>::Err(
                    JobError::Interrupted {
                        id: JobId::new("resp_1"),
                        elapsed: Duration::ZERO,
                    }
                    .into(),
                )
            },
            &cancel,
        )
        .await
        .unwrap_err();

        let job = err.downcast_ref::<JobError>().unwrap();
        assert_eq!(job.job_id().map(JobId::as_str), Some("resp_1"));

        let ok = run_until_cancelled(async { Result::<()>::Ok(()) }, &CancellationToken::new()).await;
        assert!(ok.is_ok());
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tether",
            "poll",
            "resp_1",
            "--provider",
            "gamma",
            "--check-only",
            "--env-file",
            "keys.env",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.env_file, Some(PathBuf::from("keys.env")));
        match cli.command {
            Commands::Poll(args) => {
                assert_eq!(args.id, "resp_1");
                assert_eq!(args.provider, commands::PollProvider::Gamma);
                assert!(args.wait.check_only);
            }
            _ => panic!("expected poll"),
        }
    }

    #[test]
    fn test_research_rejects_query_and_file() {
        let result = Cli::try_parse_from([
            "tether",
            "research",
            "What is Rust?",
            "--query-file",
            "q.txt",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["tether", "research", "--query-file", "q.txt", "--poll"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Research(ref a) if a.poll));
    }
}
