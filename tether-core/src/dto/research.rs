//! Research DTOs
//!
//! Request bodies for the research providers and the extraction of a
//! markdown report from their finished responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A research question bound to a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    pub model: String,
}

/// A chat message in provider request bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Tool enabled on a background response
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

// =============================================================================
// OpenAI Responses API
// =============================================================================

/// Body of `POST /responses`
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub model: String,
    pub input: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
    pub background: bool,
}

impl CreateResponse {
    /// Background deep research request with web search enabled
    pub fn background(req: &ResearchRequest) -> Self {
        Self {
            model: req.model.clone(),
            input: vec![ChatMessage::user(req.query.clone())],
            tools: vec![ToolSpec {
                kind: "web_search_preview".to_string(),
            }],
            background: true,
        }
    }
}

/// Lenient view of an OpenAI response object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Option<Vec<OutputItem>>,
    #[serde(default)]
    pub error: Option<ResponseError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ResponseObject {
    /// Parses the subset of fields we rely on, ignoring anything else
    pub fn from_json(raw: &JsonValue) -> Option<Self> {
        Self::deserialize(raw).ok()
    }

    /// Text of the first `output_text` part of the first message item
    pub fn output_text(&self) -> Option<&str> {
        self.output
            .iter()
            .flatten()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter().flatten())
            .find(|part| part.kind == "output_text")
            .and_then(|part| part.text.as_deref())
    }

    /// Provider error detail for a failed or incomplete response
    pub fn failure_detail(&self) -> Option<String> {
        if let Some(err) = &self.error {
            match (&err.code, &err.message) {
                (Some(code), Some(message)) => return Some(format!("{}: {}", code, message)),
                (None, Some(message)) => return Some(message.clone()),
                (Some(code), None) => return Some(code.clone()),
                (None, None) => {}
            }
        }
        self.incomplete_details
            .as_ref()
            .and_then(|d| d.reason.as_ref())
            .map(|reason| format!("incomplete: {}", reason))
    }
}

/// Extracts the report from a finished research response
///
/// Returns `None` when the response carries no message output. Used where a
/// missing report is an error.
pub fn output_text(raw: &JsonValue) -> Option<String> {
    ResponseObject::from_json(raw)
        .and_then(|r| r.output_text().map(str::to_string))
        .filter(|text| !text.is_empty())
}

/// Renders the report of a finished research response as markdown
///
/// Tries the message output first, then the legacy `content[0].research` /
/// `content[0].text` and `report` shapes. When nothing matches the whole
/// response is embedded as a JSON block so the result is never lost.
pub fn render_report(raw: &JsonValue) -> String {
    if let Some(text) = output_text(raw) {
        return text;
    }

    if let Some(text) = legacy_report(raw) {
        return text;
    }

    let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
    format!(
        "Could not extract markdown from response\n\nFull response:\n```json\n{}\n```",
        pretty
    )
}

fn legacy_report(raw: &JsonValue) -> Option<String> {
    let first = raw.get("content").and_then(|c| c.get(0));
    let text = first
        .and_then(|item| item.get("research").or_else(|| item.get("text")))
        .or_else(|| raw.get("report"))?;
    text.as_str().map(str::to_string)
}

// =============================================================================
// Chat completions (DeepSeek)
// =============================================================================

/// Body of `POST /v1/chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Non-streaming reasoning request
    pub fn reasoning(req: &ResearchRequest) -> Self {
        Self {
            model: req.model.clone(),
            messages: vec![ChatMessage::user(req.query.clone())],
            temperature: 1.0,
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

/// Renders a chat completion as markdown, reasoning first when present
pub fn render_chat_report(raw: &JsonValue) -> String {
    let Ok(completion) = ChatCompletion::deserialize(raw) else {
        return "Error: Unable to extract response content".to_string();
    };
    let Some(choice) = completion.choices.first() else {
        return "Error: Unable to extract response content".to_string();
    };

    let content = choice.message.content.clone().unwrap_or_default();
    match choice.message.reasoning_content.as_deref() {
        Some(reasoning) if !reasoning.is_empty() => {
            format!("## Reasoning\n\n{}\n\n## Response\n\n{}", reasoning, content)
        }
        _ => content,
    }
}

/// Model name reported in a provider response body
pub fn response_model(raw: &JsonValue) -> Option<String> {
    raw.get("model").and_then(JsonValue::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finished_response() -> JsonValue {
        json!({
            "id": "resp_abc",
            "status": "completed",
            "model": "o3-deep-research",
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "web_search_call", "action": { "query": "rust" } },
                {
                    "type": "message",
                    "content": [
                        { "type": "output_text", "text": "# Report\n\nFindings.", "annotations": [] }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_output_text_from_message() {
        assert_eq!(
            output_text(&finished_response()).as_deref(),
            Some("# Report\n\nFindings.")
        );
    }

    #[test]
    fn test_output_text_missing() {
        assert_eq!(output_text(&json!({ "output": [] })), None);
        assert_eq!(output_text(&json!({ "status": "completed" })), None);
    }

    #[test]
    fn test_render_report_legacy_shapes() {
        let legacy = json!({ "content": [ { "research": "legacy body" } ] });
        assert_eq!(render_report(&legacy), "legacy body");

        let text = json!({ "content": [ { "text": "text body" } ] });
        assert_eq!(render_report(&text), "text body");

        let report = json!({ "report": "direct report" });
        assert_eq!(render_report(&report), "direct report");
    }

    #[test]
    fn test_render_report_falls_back_to_json_dump() {
        let raw = json!({ "unexpected": true });
        let rendered = render_report(&raw);
        assert!(rendered.starts_with("Could not extract markdown"));
        assert!(rendered.contains("\"unexpected\": true"));
    }

    #[test]
    fn test_failure_detail() {
        let failed = ResponseObject::from_json(&json!({
            "status": "failed",
            "error": { "code": "server_error", "message": "boom" }
        }))
        .unwrap();
        assert_eq!(failed.failure_detail().as_deref(), Some("server_error: boom"));

        let incomplete = ResponseObject::from_json(&json!({
            "status": "incomplete",
            "error": null,
            "incomplete_details": { "reason": "max_output_tokens" }
        }))
        .unwrap();
        assert_eq!(
            incomplete.failure_detail().as_deref(),
            Some("incomplete: max_output_tokens")
        );
    }

    #[test]
    fn test_create_response_body() {
        let body = CreateResponse::background(&ResearchRequest {
            query: "What is Rust?".to_string(),
            model: "o1".to_string(),
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["background"], json!(true));
        assert_eq!(value["tools"][0]["type"], json!("web_search_preview"));
        assert_eq!(value["input"][0]["role"], json!("user"));
    }

    #[test]
    fn test_render_chat_report_with_reasoning() {
        let raw = json!({
            "id": "chatcmpl-1",
            "choices": [
                { "message": { "content": "Answer", "reasoning_content": "Because" } }
            ]
        });
        assert_eq!(
            render_chat_report(&raw),
            "## Reasoning\n\nBecause\n\n## Response\n\nAnswer"
        );
    }

    #[test]
    fn test_render_chat_report_without_choices() {
        assert!(render_chat_report(&json!({ "choices": [] })).starts_with("Error"));
    }
}
