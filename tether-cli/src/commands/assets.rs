//! Assets command handler
//!
//! Looks a presentation up once and lists, or downloads, its exports.

use anyhow::Result;
use clap::Args;
use colored::*;
use serde_json::{Map, Value as JsonValue, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tether_client::GammaClient;
use tether_core::domain::job::JobId;
use tether_core::dto::presentation::{GenerationAssets, generation_error};
use tether_runner::{JobError, RunnerConfig};

use super::Context;

#[derive(Args, Debug)]
pub struct AssetsArgs {
    /// Generation identifier
    pub id: String,

    /// Download the PDF and PPTX exports
    #[arg(long)]
    pub download: bool,

    /// Download directory (default: TETHER_OUTPUT_DIR)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Handle the assets command
pub async fn handle_assets(args: AssetsArgs, ctx: &Context) -> Result<()> {
    let id = JobId::new(args.id.trim());
    let client = Arc::new(ctx.settings.gamma()?);

    let snapshot = ctx
        .poller(client.clone(), &RunnerConfig::presentation())
        .check(&id)
        .await?;
    let raw = snapshot.payload.clone().unwrap_or(JsonValue::Null);
    let assets = GenerationAssets::from_response(&raw);

    let mut result = json!({
        "generation_id": id,
        "status": snapshot.status.raw(),
        "url": assets.primary_url(),
        "pdf": assets.pdf,
        "pptx": assets.pptx,
        "error": snapshot.error.clone().or_else(|| generation_error(&raw)),
    });

    if args.download {
        let dir = args
            .output_dir
            .unwrap_or_else(|| ctx.settings.tether_output_dir.clone());
        let (downloads, errors) = download_all(ctx, &client, &id, &assets, &dir).await?;
        result["downloads"] = JsonValue::Object(downloads);
        if !errors.is_empty() {
            result["download_errors"] = JsonValue::Object(errors);
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Downloads each export to `<dir>/<id>.<ext>`
///
/// A failed download is recorded and the others still run. Ctrl+C stops the
/// remaining downloads.
async fn download_all(
    ctx: &Context,
    client: &GammaClient,
    id: &JobId,
    assets: &GenerationAssets,
    dir: &Path,
) -> Result<(Map<String, JsonValue>, Map<String, JsonValue>), JobError> {
    let mut downloads = Map::new();
    let mut errors = Map::new();

    let exports = [("pdf", &assets.pdf), ("pptx", &assets.pptx)];
    for (ext, url) in exports {
        let Some(url) = url else {
            continue;
        };

        let target = dir.join(format!("{}.{}", id, ext));
        let during = format!("{} download", ext);
        match ctx
            .until_cancelled(&during, client.download_asset(url, &target))
            .await?
        {
            Ok(bytes) => {
                eprintln!(
                    "{} {} ({} bytes)",
                    "✓ Downloaded".green(),
                    target.display(),
                    bytes
                );
                downloads.insert(ext.to_string(), json!(target.display().to_string()));
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗ Download failed".red(), ext, e);
                errors.insert(ext.to_string(), json!(e.to_string()));
            }
        }
    }

    if downloads.is_empty() && errors.is_empty() {
        eprintln!("{}", "No exports available to download.".yellow());
    }

    Ok((downloads, errors))
}
