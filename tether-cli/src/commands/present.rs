//! Present command handler
//!
//! Submits a Gamma generation and waits for the hosted result and exports.

use anyhow::Result;
use clap::Args;
use colored::*;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use tether_core::dto::presentation::{
    AccessLevel, CardOptions, CardSplit, ExportFormat, Format, GenerationRequest, ImageOptions,
    ImageSource, SharingOptions, TextAmount, TextMode, TextOptions,
};
use tether_runner::RunnerConfig;

use super::{Context, PollProvider, WaitArgs, await_job, read_input};
use crate::output;

#[derive(Args, Debug)]
pub struct PresentArgs {
    /// Presentation content (text and image URLs)
    #[arg(conflicts_with = "input_file", required_unless_present = "input_file")]
    pub input_text: Option<String>,

    /// Read the content from a file
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// generate, condense or preserve
    #[arg(long, default_value_t = TextMode::Generate)]
    pub text_mode: TextMode,

    /// presentation, document, social or webpage
    #[arg(long, default_value_t = Format::Presentation)]
    pub format: Format,

    #[arg(long)]
    pub num_cards: Option<u32>,

    /// pdf or pptx
    #[arg(long)]
    pub export_as: Option<ExportFormat>,

    /// auto or inputTextBreaks
    #[arg(long)]
    pub card_split: Option<CardSplit>,

    #[arg(long)]
    pub theme_id: Option<String>,

    /// Folder to file the generation in (repeatable)
    #[arg(long = "folder-id", value_name = "ID")]
    pub folder_ids: Vec<String>,

    #[arg(long, conflicts_with = "additional_instructions_file")]
    pub additional_instructions: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub additional_instructions_file: Option<PathBuf>,

    /// brief, medium, detailed or extensive
    #[arg(long)]
    pub text_amount: Option<TextAmount>,

    /// Voice and style, e.g. "professional and confident"
    #[arg(long)]
    pub text_tone: Option<String>,

    #[arg(long)]
    pub text_audience: Option<String>,

    /// Output language code, e.g. en
    #[arg(long)]
    pub text_language: Option<String>,

    /// aiGenerated, pictographic, unsplash, giphy, webAllImages, webFreeToUse,
    /// webFreeToUseCommercially, placeholder or noImages
    #[arg(long)]
    pub image_source: Option<ImageSource>,

    #[arg(long)]
    pub image_model: Option<String>,

    #[arg(long)]
    pub image_style: Option<String>,

    #[arg(long)]
    pub card_dimensions: Option<String>,

    /// Header and footer settings as JSON
    #[arg(long, value_parser = parse_json)]
    pub card_header_footer: Option<JsonValue>,

    /// noAccess, view, comment, edit or fullAccess
    #[arg(long)]
    pub sharing_workspace_access: Option<AccessLevel>,

    /// noAccess, view, comment or edit
    #[arg(long)]
    pub sharing_external_access: Option<AccessLevel>,

    /// Email sharing settings as JSON
    #[arg(long, value_parser = parse_json)]
    pub sharing_email_options: Option<JsonValue>,

    /// Result path; a timestamp is added to the file name
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Return right after submission instead of waiting
    #[arg(long, conflicts_with = "check_only")]
    pub no_poll: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

fn parse_json(value: &str) -> Result<JsonValue, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid JSON: {}", e))
}

impl PresentArgs {
    /// Builds the generation request, reading any input files
    pub fn to_request(&self) -> Result<GenerationRequest> {
        let input_text = read_input(
            self.input_text.clone(),
            self.input_file.as_deref(),
            "input text",
        )?;

        let additional_instructions = match (
            &self.additional_instructions,
            &self.additional_instructions_file,
        ) {
            (None, None) => None,
            (inline, file) => Some(read_input(
                inline.clone(),
                file.as_deref(),
                "additional instructions",
            )?),
        };

        let request = GenerationRequest {
            input_text,
            text_mode: self.text_mode,
            format: Some(self.format),
            num_cards: self.num_cards,
            export_as: self.export_as,
            card_split: self.card_split,
            theme_id: self.theme_id.clone(),
            folder_ids: self.folder_ids.clone(),
            additional_instructions,
            text_options: Some(TextOptions {
                amount: self.text_amount,
                tone: self.text_tone.clone(),
                audience: self.text_audience.clone(),
                language: self.text_language.clone(),
            }),
            image_options: Some(ImageOptions {
                source: self.image_source,
                model: self.image_model.clone(),
                style: self.image_style.clone(),
            }),
            card_options: Some(CardOptions {
                dimensions: self.card_dimensions.clone(),
                header_footer: self.card_header_footer.clone(),
            }),
            sharing_options: Some(SharingOptions {
                workspace_access: self.sharing_workspace_access,
                external_access: self.sharing_external_access,
                email_options: self.sharing_email_options.clone(),
            }),
        };

        Ok(request.prune_empty_options())
    }
}

/// Handle the present command
pub async fn handle_present(args: PresentArgs, ctx: &Context) -> Result<()> {
    let request = args.to_request()?;
    let config = args.wait.config(RunnerConfig::presentation())?;
    let client = Arc::new(ctx.settings.gamma()?);

    eprintln!(
        "{} {} ({} mode)",
        "Generating".bold(),
        request.format.unwrap_or_default(),
        request.text_mode
    );

    let submitted = ctx.submitter(client.clone(), &config).submit(&request).await?;
    eprintln!(
        "{} {}",
        "✓ Generation started:".green(),
        submitted.id.to_string().cyan()
    );

    if args.no_poll {
        return output::save_presentation(ctx, &submitted, args.output.as_deref()).await;
    }

    let poller = ctx.poller(client, &config);
    let Some(finished) =
        await_job(&poller, &submitted.id, args.wait.check_only, PollProvider::Gamma).await?
    else {
        return Ok(());
    };

    output::save_presentation(ctx, &finished, args.output.as_deref()).await
}
