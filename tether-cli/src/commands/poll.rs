//! Poll command handler
//!
//! Picks up a job submitted earlier, by this or any other process, from its
//! identifier alone.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tether_core::domain::job::JobId;
use tether_runner::RunnerConfig;

use super::{Context, WaitArgs, await_job};
use crate::output;

/// Provider holding the job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PollProvider {
    /// OpenAI deep research response
    #[default]
    #[value(name = "openai")]
    OpenAi,
    /// Gamma presentation generation
    #[value(name = "gamma")]
    Gamma,
}

impl PollProvider {
    /// Command line that resumes waiting on `id`
    pub fn resume_command(&self, id: &JobId) -> String {
        match self {
            PollProvider::OpenAi => format!("tether poll {}", id),
            PollProvider::Gamma => format!("tether poll {} --provider gamma", id),
        }
    }
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Job identifier returned at submission
    pub id: String,

    #[arg(long, value_enum, default_value_t = PollProvider::OpenAi)]
    pub provider: PollProvider,

    /// Model recorded in the report when the response does not name one
    #[arg(long)]
    pub model: Option<String>,

    /// Result path; a timestamp is added to the file name
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

/// Handle the poll command
pub async fn handle_poll(args: PollArgs, ctx: &Context) -> Result<()> {
    let id = JobId::new(args.id.trim());

    match args.provider {
        PollProvider::OpenAi => {
            let config = args.wait.config(RunnerConfig::research())?;
            let poller = ctx.poller(Arc::new(ctx.settings.openai()?), &config);

            let Some(finished) =
                await_job(&poller, &id, args.wait.check_only, args.provider).await?
            else {
                return Ok(());
            };

            let model = args
                .model
                .unwrap_or_else(|| ctx.settings.openai_default_model.clone());
            output::save_research(ctx, "openai", &model, &finished, args.output.as_deref()).await
        }
        PollProvider::Gamma => {
            let config = args.wait.config(RunnerConfig::presentation())?;
            let poller = ctx.poller(Arc::new(ctx.settings.gamma()?), &config);

            let Some(finished) =
                await_job(&poller, &id, args.wait.check_only, args.provider).await?
            else {
                return Ok(());
            };

            output::save_presentation(ctx, &finished, args.output.as_deref()).await
        }
    }
}
