//! Presentation DTOs
//!
//! The Gamma generation request and the lenient readers for its responses.
//! The API has shipped several spellings for the same fields, so the readers
//! try each known spelling in order.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strum::{Display, EnumString};

/// How the input text is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TextMode {
    #[default]
    Generate,
    Condense,
    Preserve,
}

/// Kind of artifact to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Format {
    #[default]
    Presentation,
    Document,
    Social,
    Webpage,
}

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ExportFormat {
    Pdf,
    Pptx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CardSplit {
    Auto,
    InputTextBreaks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum TextAmount {
    Brief,
    Medium,
    Detailed,
    Extensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ImageSource {
    AiGenerated,
    Pictographic,
    Unsplash,
    Giphy,
    WebAllImages,
    WebFreeToUse,
    WebFreeToUseCommercially,
    Placeholder,
    NoImages,
}

/// Sharing access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AccessLevel {
    NoAccess,
    View,
    Comment,
    Edit,
    FullAccess,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<TextAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_footer: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_access: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_access: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_options: Option<JsonValue>,
}

/// Body of `POST /generations`
///
/// Only fields that are set are serialized; nested option groups are dropped
/// entirely when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub input_text: String,
    pub text_mode: TextMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_cards: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_as: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_split: Option<CardSplit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folder_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_options: Option<TextOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_options: Option<CardOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_options: Option<SharingOptions>,
}

impl GenerationRequest {
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            ..Default::default()
        }
    }

    /// Drops option groups that ended up with no field set
    pub fn prune_empty_options(mut self) -> Self {
        if self.text_options.as_ref() == Some(&TextOptions::default()) {
            self.text_options = None;
        }
        if self.image_options.as_ref() == Some(&ImageOptions::default()) {
            self.image_options = None;
        }
        if self.card_options.as_ref() == Some(&CardOptions::default()) {
            self.card_options = None;
        }
        if self.sharing_options.as_ref() == Some(&SharingOptions::default()) {
            self.sharing_options = None;
        }
        self
    }
}

// =============================================================================
// Response readers
// =============================================================================

/// Generation identifier from a creation response
pub fn generation_id(raw: &JsonValue) -> Option<String> {
    first_str(raw, &["generationId", "generation_id", "id"])
}

/// Status word from a generation response, lowercased
pub fn generation_status(raw: &JsonValue) -> String {
    first_str(raw, &["status", "state"])
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Error detail from a failed generation response
pub fn generation_error(raw: &JsonValue) -> Option<String> {
    match raw.get("error") {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Object(obj)) => obj
            .get("message")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .or_else(|| Some(JsonValue::Object(obj.clone()).to_string())),
        _ => first_str(raw, &["message", "errorMessage"]),
    }
}

/// URLs published for a finished generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pptx: Option<String>,
}

impl GenerationAssets {
    pub fn from_response(raw: &JsonValue) -> Self {
        let gamma_url = first_str(raw, &["gammaUrl", "gamma_url", "url"]);
        let export_url = first_str(
            raw,
            &["exportUrl", "export_url", "outputUrl", "output_url"],
        )
        .or_else(|| first_url_in(raw, "outputs"))
        .or_else(|| first_url_in(raw, "exports"))
        .or_else(|| first_url_in(raw, "artifacts"));

        let mut pdf = first_str(raw, &["pdfUrl", "pdf_url"]);
        let mut pptx = first_str(raw, &["pptxUrl", "pptx_url"]);

        // Positional exports: typically PDF first, PPTX second
        for url in array_urls(raw, "exports") {
            if pdf.is_none() {
                pdf = Some(url);
            } else if pptx.is_none() {
                pptx = Some(url);
            }
        }

        Self {
            gamma_url,
            export_url,
            pdf,
            pptx,
        }
    }

    /// The URL to show first: the hosted generation, else the export
    pub fn primary_url(&self) -> Option<&str> {
        self.gamma_url.as_deref().or(self.export_url.as_deref())
    }
}

fn first_str(raw: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .filter_map(JsonValue::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn url_of(entry: &JsonValue) -> Option<String> {
    match entry {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Object(_) => entry
            .get("url")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn first_url_in(raw: &JsonValue, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(JsonValue::as_array)
        .and_then(|entries| entries.first())
        .and_then(url_of)
}

fn array_urls(raw: &JsonValue, key: &str) -> Vec<String> {
    raw.get(key)
        .and_then(JsonValue::as_array)
        .map(|entries| entries.iter().filter_map(url_of).collect())
        .unwrap_or_default()
}
