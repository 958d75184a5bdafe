//! Result materialization service
//!
//! Writes a finished payload to disk under a derived, timestamped name with
//! provenance attached. Write failures are collected instead of returned: the
//! payload was already fetched and the caller still prints it.

use chrono::{DateTime, Local};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tether_core::domain::job::JobId;
use tracing::{info, warn};

/// Who produced a result, and when
#[derive(Debug, Clone)]
pub struct Provenance {
    pub provider: String,
    pub model: String,
    pub job_id: JobId,
    pub timestamp: DateTime<Local>,
}

impl Provenance {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, job_id: JobId) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            job_id,
            timestamp: Local::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// File name discriminator, `yymmdd_HHMM`
    pub fn stamp(&self) -> String {
        self.timestamp.format("%y%m%d_%H%M").to_string()
    }

    /// YAML frontmatter block placed at the top of a report
    pub fn frontmatter(&self) -> String {
        format!(
            "---\nprovider: {}\nmodel: {}\nrequest_id: {}\ntimestamp: {}\n---\n\n",
            self.provider,
            self.model,
            self.job_id,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Outcome of a materialization
#[derive(Debug)]
pub struct Materialized {
    /// The content as it was (or would have been) written
    pub document: String,
    pub written: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, std::io::Error)>,
}

impl Materialized {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The main file, when it made it to disk
    pub fn primary(&self) -> Option<&Path> {
        self.written.first().map(PathBuf::as_path)
    }
}

/// Writes finished results below an output directory
#[derive(Debug, Clone)]
pub struct Materializer {
    output_dir: PathBuf,
}

impl Materializer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Derives the report path and its raw JSON companion
    ///
    /// With an explicit `output`, the stamp goes between its stem and
    /// extension. Without one, the name is built from provider and model
    /// inside the output directory. Existing files are never overwritten: a
    /// numeric suffix is added until both paths are free.
    pub fn report_paths(&self, output: Option<&Path>, provenance: &Provenance) -> (PathBuf, PathBuf) {
        let stamp = provenance.stamp();

        let (dir, base, ext) = match output {
            Some(path) => {
                let dir = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "report".to_string());
                let ext = path
                    .extension()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "md".to_string());
                (dir, format!("{}_{}", stem, stamp), ext)
            }
            None => (
                self.output_dir.clone(),
                format!(
                    "{}_{}_{}",
                    sanitize(&provenance.provider),
                    sanitize(&provenance.model),
                    stamp
                ),
                "md".to_string(),
            ),
        };

        let mut n = 1;
        loop {
            let base = if n == 1 {
                base.clone()
            } else {
                format!("{}_{}", base, n)
            };
            let document = dir.join(format!("{}.{}", base, ext));
            let raw = dir.join(format!("{}-raw.json", base));
            if !document.exists() && !raw.exists() {
                return (document, raw);
            }
            n += 1;
        }
    }

    /// Writes a markdown report with frontmatter plus the raw provider JSON
    pub async fn write_report(
        &self,
        output: Option<&Path>,
        provenance: &Provenance,
        markdown: &str,
        raw: &JsonValue,
    ) -> Materialized {
        let (document_path, raw_path) = self.report_paths(output, provenance);
        let document = format!("{}{}", provenance.frontmatter(), markdown);

        let mut result = Materialized {
            document,
            written: Vec::new(),
            failures: Vec::new(),
        };

        let contents = result.document.clone();
        write_file(&document_path, contents.as_bytes(), &mut result).await;

        match serde_json::to_vec_pretty(raw) {
            Ok(bytes) => write_file(&raw_path, &bytes, &mut result).await,
            Err(e) => {
                warn!("Could not serialize raw response: {}", e);
                result.failures.push((raw_path, std::io::Error::other(e)));
            }
        }

        result
    }

    /// Writes a single document to `path` with the stamp appended to its stem
    pub async fn write_document(
        &self,
        path: &Path,
        provenance: &Provenance,
        contents: &str,
    ) -> Materialized {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "result".to_string());
        let name = match path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, provenance.stamp(), ext.to_string_lossy()),
            None => format!("{}_{}", stem, provenance.stamp()),
        };
        let target = path.with_file_name(name);

        let mut result = Materialized {
            document: contents.to_string(),
            written: Vec::new(),
            failures: Vec::new(),
        };
        write_file(&target, contents.as_bytes(), &mut result).await;
        result
    }
}

async fn write_file(path: &Path, bytes: &[u8], result: &mut Materialized) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!("Could not create {}: {}", parent.display(), e);
            result.failures.push((path.to_path_buf(), e));
            return;
        }
    }

    match tokio::fs::write(path, bytes).await {
        Ok(()) => {
            info!("Saved {}", path.display());
            result.written.push(path.to_path_buf());
        }
        Err(e) => {
            warn!("Could not write {}: {}", path.display(), e);
            result.failures.push((path.to_path_buf(), e));
        }
    }
}

/// Keeps a value safe for use inside a file name
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn provenance() -> Provenance {
        let ts = Local.with_ymd_and_hms(2025, 3, 7, 14, 5, 0).unwrap();
        Provenance::new("openai", "o1", JobId::new("resp_abc")).at(ts)
    }

    #[test]
    fn test_stamp_and_frontmatter() {
        let p = provenance();
        assert_eq!(p.stamp(), "250307_1405");

        let fm = p.frontmatter();
        assert!(fm.starts_with("---\nprovider: openai\nmodel: o1\nrequest_id: resp_abc\n"));
        assert!(fm.ends_with("---\n\n"));
    }

    #[test]
    fn test_default_report_paths() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        let (doc, raw) = m.report_paths(None, &provenance());

        assert_eq!(doc, dir.path().join("openai_o1_250307_1405.md"));
        assert_eq!(raw, dir.path().join("openai_o1_250307_1405-raw.json"));
    }

    #[test]
    fn test_explicit_output_gets_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new("unused");
        let output = dir.path().join("notes.markdown");
        let (doc, raw) = m.report_paths(Some(&output), &provenance());

        assert_eq!(doc, dir.path().join("notes_250307_1405.markdown"));
        assert_eq!(raw, dir.path().join("notes_250307_1405-raw.json"));
    }

    #[test]
    fn test_model_is_sanitized() {
        let m = Materializer::new("out");
        let p = Provenance::new("openai", "o3/deep research", JobId::new("x"))
            .at(provenance().timestamp);
        let (doc, _) = m.report_paths(None, &p);
        assert_eq!(doc, Path::new("out").join("openai_o3-deep-research_250307_1405.md"));
    }

    #[tokio::test]
    async fn test_write_report_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path().join("nested"));
        let raw = json!({ "id": "resp_abc" });

        let first = m.write_report(None, &provenance(), "# One", &raw).await;
        let second = m.write_report(None, &provenance(), "# Two", &raw).await;

        assert!(first.is_complete());
        assert!(second.is_complete());
        assert_eq!(first.written.len(), 2);
        assert_ne!(first.primary(), second.primary());

        let text = std::fs::read_to_string(first.primary().unwrap()).unwrap();
        assert!(text.starts_with("---\nprovider: openai"));
        assert!(text.ends_with("# One"));

        let saved: JsonValue =
            serde_json::from_slice(&std::fs::read(&first.written[1]).unwrap()).unwrap();
        assert_eq!(saved, raw);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let m = Materializer::new(blocker.join("out"));
        let result = m
            .write_report(None, &provenance(), "# Report", &json!({}))
            .await;

        assert!(!result.is_complete());
        assert!(result.written.is_empty());
        assert!(result.document.ends_with("# Report"));
    }

    #[tokio::test]
    async fn test_write_document_stamps_name() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        let result = m
            .write_document(&dir.path().join("deck.json"), &provenance(), "{}")
            .await;

        assert_eq!(
            result.primary(),
            Some(dir.path().join("deck_250307_1405.json").as_path())
        );
    }
}
