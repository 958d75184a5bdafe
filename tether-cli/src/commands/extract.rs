//! Extract command handler
//!
//! Recovers the markdown report from a raw research response saved earlier.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::*;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tether_core::dto::research::output_text;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Saved raw response JSON
    pub input: PathBuf,

    /// Markdown file to write
    pub output: PathBuf,
}

/// Handle the extract command
pub async fn handle_extract(args: ExtractArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let raw: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    let markdown = extract_report(&raw)
        .with_context(|| format!("No message content found in {}", args.input.display()))?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&args.output, &markdown)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    eprintln!(
        "{} {} ({} chars)",
        "✓ Extracted to".green(),
        args.output.display(),
        markdown.chars().count()
    );
    Ok(())
}

/// The report text of a finished response, if it has one
pub fn extract_report(raw: &JsonValue) -> Option<String> {
    output_text(raw)
}
