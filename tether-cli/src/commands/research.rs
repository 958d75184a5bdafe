//! Research command handler
//!
//! Submits a research query and, when asked to, waits for the report.

use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tether_core::dto::research::ResearchRequest;
use tether_runner::RunnerConfig;

use super::{Context, PollProvider, WaitArgs, await_job, print_resume_hint, read_input};
use crate::config::ResearchProvider;
use crate::output;

#[derive(Args, Debug)]
pub struct ResearchArgs {
    /// Research question
    #[arg(conflicts_with = "query_file", required_unless_present = "query_file")]
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(long, value_name = "PATH")]
    pub query_file: Option<PathBuf>,

    /// Provider to use (default: REASONING_DEFAULT_PROVIDER)
    #[arg(long, value_enum)]
    pub provider: Option<ResearchProvider>,

    /// Model to use instead of the provider default
    #[arg(long)]
    pub model: Option<String>,

    /// Report path; a timestamp is added to the file name
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Wait for the report instead of returning after submission
    #[arg(long)]
    pub poll: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

/// Handle the research command
pub async fn handle_research(args: ResearchArgs, ctx: &Context) -> Result<()> {
    let query = read_input(args.query, args.query_file.as_deref(), "query")?;
    let provider = args
        .provider
        .unwrap_or(ctx.settings.reasoning_default_provider);
    let model = args
        .model
        .unwrap_or_else(|| ctx.settings.default_model(provider).to_string());
    let config = args.wait.config(RunnerConfig::research())?;

    let request = ResearchRequest {
        query,
        model: model.clone(),
    };

    eprintln!(
        "{} {} ({})",
        "Submitting research to".bold(),
        provider.as_str().cyan(),
        model.dimmed()
    );

    match provider {
        ResearchProvider::OpenAi => {
            let client = Arc::new(ctx.settings.openai()?);
            let submitted = ctx.submitter(client.clone(), &config).submit(&request).await?;
            eprintln!(
                "{} {} ({})",
                "✓ Submitted".green(),
                submitted.id.to_string().cyan(),
                submitted.status
            );

            if !args.poll && !args.wait.check_only {
                println!("{}", submitted.id);
                print_resume_hint(&submitted.id, PollProvider::OpenAi);
                return Ok(());
            }

            let poller = ctx.poller(client, &config);
            let Some(finished) =
                await_job(&poller, &submitted.id, args.wait.check_only, PollProvider::OpenAi)
                    .await?
            else {
                return Ok(());
            };

            output::save_research(
                ctx,
                provider.as_str(),
                &model,
                &finished,
                args.output.as_deref(),
            )
            .await
        }
        ResearchProvider::DeepSeek => {
            // Answered in the creation response; there is nothing to poll
            let client = Arc::new(ctx.settings.deepseek()?);
            let finished = ctx.submitter(client, &config).submit(&request).await?;

            output::save_research(
                ctx,
                provider.as_str(),
                &model,
                &finished,
                args.output.as_deref(),
            )
            .await
        }
    }
}
