/// Gemini field extractor: sends the page image with the schema-constrained
/// prompt to `generateContent` and parses the JSON answer.
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use broadsheet_core::{
    retry_external, with_timeout, BroadsheetError, ExtractedDocument, FieldExtractor, Result,
    RetryPolicy,
};
use broadsheet_logging::redact_sensitive_data;

use crate::mime_detect::detect_image_mime;
use crate::schema::{extraction_prompt, SYSTEM_INSTRUCTION};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const SERVICE: &str = "gemini";

pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GeminiExtractor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, body: &GenerateContentRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                BroadsheetError::external(SERVICE, redact_sensitive_data(&e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(BroadsheetError::external(
                SERVICE,
                format!("HTTP {}: {}", status, redact_sensitive_data(&error_body)),
            ));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            BroadsheetError::malformed(SERVICE, format!("undecodable response envelope: {e}"))
        })?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                total_tokens = usage.total_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }
        response_text(parsed)
    }
}

#[async_trait]
impl FieldExtractor for GeminiExtractor {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn extract(&self, image_bytes: &[u8]) -> Result<ExtractedDocument> {
        let mime_type = detect_image_mime(image_bytes, None);
        let body = build_request(image_bytes, mime_type);

        info!(
            model = %self.model,
            mime = mime_type,
            bytes = image_bytes.len(),
            "Requesting field extraction"
        );
        let start = Instant::now();

        let text = retry_external(&self.retry, SERVICE, || {
            with_timeout(self.timeout, SERVICE, self.generate(&body))
        })
        .await?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Gemini responded"
        );
        ExtractedDocument::from_json(SERVICE, &text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

fn build_request(image_bytes: &[u8], mime_type: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: Some(SYSTEM_INSTRUCTION.to_string()),
                inline_data: None,
            }],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part {
                    text: Some(extraction_prompt()),
                    inline_data: None,
                },
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: STANDARD.encode(image_bytes),
                    }),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
        },
    }
}

/// Concatenated text of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(BroadsheetError::malformed(
            SERVICE,
            format!("prompt blocked: {reason}"),
        ));
    }
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(BroadsheetError::malformed(SERVICE, "response has no candidates"));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(BroadsheetError::malformed(
            SERVICE,
            format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_prompt_image_and_json_mode() {
        let body = serde_json::to_value(build_request(b"\x89PNG", "image/png")).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[0]["text"].as_str().unwrap().contains("JSON schema"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], STANDARD.encode(b"\x89PNG"));
        assert!(parts[1].get("text").is_none());
    }

    #[test]
    fn joins_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "{\"headline\": " },
                    { "text": "[\"Storm Hits\"]}" }
                ]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        let text = response_text(response).unwrap();
        let doc = ExtractedDocument::from_json(SERVICE, &text).unwrap();
        assert_eq!(doc.headline, vec!["Storm Hits".to_string()]);
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = response_text(response).unwrap_err();
        assert!(matches!(err, BroadsheetError::MalformedResponse { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = response_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn endpoint_uses_model_and_trims_base_url() {
        let extractor = GeminiExtractor::new("k")
            .with_base_url("http://localhost:9000/v1beta/")
            .with_model("gemini-test");
        assert_eq!(
            extractor.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_external_error() {
        let extractor = GeminiExtractor::new("k")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::none());
        let err = extractor.extract(b"\x89PNG").await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }
}
