//! Result output
//!
//! Turns finished snapshots into files and stdout payloads.

use anyhow::{Context as _, Result};
use serde_json::{Value as JsonValue, json};
use std::path::Path;
use tether_core::domain::job::JobSnapshot;
use tether_core::dto::presentation::{GenerationAssets, generation_error};
use tether_core::dto::research::{render_chat_report, render_report, response_model};
use tether_runner::Provenance;

use crate::commands::{Context, report_written};

/// Writes a research report with its raw response and prints it
///
/// The report reaches stdout even when nothing could be written. Nothing is
/// written or printed once Ctrl+C has arrived.
pub async fn save_research(
    ctx: &Context,
    provider: &str,
    model: &str,
    snapshot: &JobSnapshot,
    output: Option<&Path>,
) -> Result<()> {
    let raw = snapshot
        .payload
        .as_ref()
        .with_context(|| format!("Job {} finished without a response body", snapshot.id))?;

    let markdown = match provider {
        "deepseek" => render_chat_report(raw),
        _ => render_report(raw),
    };
    let model = response_model(raw).unwrap_or_else(|| model.to_string());
    let provenance = Provenance::new(provider, model, snapshot.id.clone());

    ctx.ensure_active("saving the research report")?;
    let result = ctx
        .materializer()
        .write_report(output, &provenance, &markdown, raw)
        .await;
    report_written(&result.written, &result.failures);

    println!("{}", markdown);
    Ok(())
}

/// Summary printed for a presentation job
pub fn presentation_result(snapshot: &JobSnapshot) -> JsonValue {
    let raw = snapshot.payload.clone().unwrap_or(JsonValue::Null);
    let assets = GenerationAssets::from_response(&raw);
    let error = snapshot.error.clone().or_else(|| generation_error(&raw));

    json!({
        "generation_id": snapshot.id,
        "url": assets.primary_url(),
        "pdf": assets.pdf,
        "pptx": assets.pptx,
        "error": error,
    })
}

/// Prints a presentation result, writing it to `output` when given
pub async fn save_presentation(
    ctx: &Context,
    snapshot: &JobSnapshot,
    output: Option<&Path>,
) -> Result<()> {
    ctx.ensure_active("saving the presentation result")?;
    let result = presentation_result(snapshot);
    let document =
        serde_json::to_string_pretty(&result).context("Failed to serialize presentation result")?;

    if let Some(path) = output {
        let provenance = Provenance::new("gamma", "gamma", snapshot.id.clone());
        let written = ctx
            .materializer()
            .write_document(path, &provenance, &document)
            .await;
        report_written(&written.written, &written.failures);
    }

    println!("{}", document);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tether_core::domain::status::ProviderStatus;
    use tether_runner::JobError;
    use tokio_util::sync::CancellationToken;

    fn context(output_dir: &Path) -> Context {
        let settings = Settings::from_vars(vec![(
            "TETHER_OUTPUT_DIR".to_string(),
            output_dir.display().to_string(),
        )])
        .unwrap();
        Context {
            settings,
            verbose: false,
            cancel: CancellationToken::new(),
        }
    }

    fn finished_chat() -> JobSnapshot {
        JobSnapshot::new("chatcmpl-1", ProviderStatus::Immediate).with_payload(json!({
            "id": "chatcmpl-1",
            "model": "deepseek-reasoner",
            "choices": [ { "message": { "content": "Answer" } } ]
        }))
    }

    #[tokio::test]
    async fn test_save_research_writes_report_and_raw() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        save_research(&ctx, "deepseek", "deepseek-reasoner", &finished_chat(), None)
            .await
            .unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_nothing_saved_after_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        ctx.cancel.cancel();

        let err = save_research(&ctx, "deepseek", "deepseek-reasoner", &finished_chat(), None)
            .await
            .unwrap_err();
        let job = err.downcast_ref::<JobError>().unwrap();
        assert_eq!(job.exit_code(), JobError::EXIT_INTERRUPTED);

        let output = dir.path().join("deck.json");
        assert!(save_presentation(&ctx, &finished_chat(), Some(&output)).await.is_err());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_presentation_result_shape() {
        let snapshot = JobSnapshot::new("gen_7", ProviderStatus::Gamma("completed".into()))
            .with_payload(json!({
                "generationId": "gen_7",
                "status": "completed",
                "gammaUrl": "https://gamma.app/docs/gen_7",
                "pdfUrl": "https://cdn.gamma.app/gen_7.pdf"
            }));

        let result = presentation_result(&snapshot);

        assert_eq!(result["generation_id"], json!("gen_7"));
        assert_eq!(result["url"], json!("https://gamma.app/docs/gen_7"));
        assert_eq!(result["pdf"], json!("https://cdn.gamma.app/gen_7.pdf"));
        assert_eq!(result["pptx"], JsonValue::Null);
        assert_eq!(result["error"], JsonValue::Null);
    }

    #[test]
    fn test_presentation_result_without_payload() {
        let snapshot = JobSnapshot::new("gen_8", ProviderStatus::Gamma("pending".into()));
        let result = presentation_result(&snapshot);

        assert_eq!(result["generation_id"], json!("gen_8"));
        assert_eq!(result["url"], JsonValue::Null);
    }
}
