//! LLM client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the model service directly.
//! All model interactions MUST go through a `LanguageModel` implementation.
//!
//! Model: gemini-2.5-flash-lite (hardcoded, do not make configurable)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod stub;

/// The model used for every analysis call.
pub const MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API quota exceeded. Wait or upgrade your plan. ({message})")]
    QuotaExceeded { message: String },

    #[error("API key rejected. Check that the key belongs to the correct Cloud project. ({message})")]
    AuthRejected { message: String },

    #[error("Model '{model}' not found. Check the configured model name.")]
    ModelNotFound { model: String },

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gemini returned empty content")]
    EmptyContent,
}

/// The seam between analysis and the remote model. One prompt in, reply text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    reason: Option<String>,
}

/// Maps a non-success reply from the model service onto `LlmError`.
///
/// Uses the HTTP status first, then the service's own `status` string and
/// detail reasons. Google reports an invalid key as 400 `API_KEY_INVALID`.
pub fn classify_failure(status: StatusCode, body: &str, model: &str) -> LlmError {
    let parsed = serde_json::from_str::<GoogleError>(body).ok().map(|e| e.error);
    let (message, service_status, reasons) = match parsed {
        Some(err) => {
            let reasons: Vec<String> = err.details.into_iter().filter_map(|d| d.reason).collect();
            (err.message, err.status, reasons)
        }
        None => (body.trim().to_string(), String::new(), Vec::new()),
    };

    let key_invalid = reasons.iter().any(|r| r == "API_KEY_INVALID");

    if status == StatusCode::TOO_MANY_REQUESTS || service_status == "RESOURCE_EXHAUSTED" {
        LlmError::QuotaExceeded { message }
    } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || matches!(service_status.as_str(), "UNAUTHENTICATED" | "PERMISSION_DENIED")
        || key_invalid
    {
        LlmError::AuthRejected { message }
    } else if status == StatusCode::NOT_FOUND || service_status == "NOT_FOUND" {
        LlmError::ModelNotFound {
            model: model.to_string(),
        }
    } else {
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Gemini `generateContent` client. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, MODEL)
    }

    /// Makes a single call to the Gemini API and returns the full response object.
    /// No retries: a failed call is classified and returned to the caller.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            return Err(classify_failure(status, &body, MODEL));
        }

        let gemini_response: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(gemini_response)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }

    fn model(&self) -> &str {
        MODEL
    }
}

/// Strips a ```json ... ``` or ``` ... ``` fence from model output.
///
/// The first "```json" marker wins over a bare "```" anywhere in the reply.
/// A missing closing fence keeps the rest of the reply.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let body = if let Some(start) = text.find("```json") {
        &text[start + "```json".len()..]
    } else if let Some(start) = text.find("```") {
        &text[start + "```".len()..]
    } else {
        return text;
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_fenced_and_bare_replies_strip_to_same_json() {
        let verdict = r#"{"match_score": 70, "missing_keywords": ["Go"]}"#;
        let replies = [
            format!("```json\n{verdict}\n```"),
            format!("```\n{verdict}\n```"),
            format!("  \n{verdict}\n\n"),
        ];
        for reply in &replies {
            assert_eq!(strip_json_fences(reply), verdict, "{reply:?}");
        }
    }

    #[test]
    fn test_strip_json_fences_with_surrounding_prose() {
        let input = "Here is the analysis:\n```json\n{\"a\": 1}\n```\nHope this helps.";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_first_fence_wins() {
        let input = "```json\n{\"a\": 1}\n```\n```json\n{\"a\": 2}\n```";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_prefers_json_tag_over_earlier_bare_fence() {
        let input = "```\nnot this\n```\n```json\n{\"a\": 1}\n```";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(strip_json_fences(input), "{\"a\": 1}");
    }

    #[test]
    fn test_classify_429_is_quota() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down", MODEL);
        assert!(matches!(err, LlmError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_classify_resource_exhausted_status_is_quota() {
        let body = r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, MODEL);
        assert!(matches!(err, LlmError::QuotaExceeded { .. }));
    }

    #[test]
    fn test_classify_403_is_auth() {
        let body = r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED"}}"#;
        match classify_failure(StatusCode::FORBIDDEN, body, MODEL) {
            LlmError::AuthRejected { message } => assert_eq!(message, "denied"),
            other => panic!("expected AuthRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_invalid_key_reason_is_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT",
            "details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, MODEL);
        assert!(matches!(err, LlmError::AuthRejected { .. }));
    }

    #[test]
    fn test_classify_404_is_model_not_found() {
        match classify_failure(StatusCode::NOT_FOUND, "", "gemini-nope") {
            LlmError::ModelNotFound { model } => assert_eq!(model, "gemini-nope"),
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_status_is_api_error() {
        let body = r#"{"error":{"code":500,"message":"backend exploded","status":"INTERNAL"}}"#;
        match classify_failure(StatusCode::INTERNAL_SERVER_ERROR, body, MODEL) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.text().is_none());
    }

    /// Serves a fixed status/body on the generateContent path and returns the base URL.
    async fn fake_gemini(status: AxumStatus, body: Value) -> String {
        let app = Router::new().route(
            "/models/*call",
            post(move |Path(call): Path<String>, Json(request): Json<Value>| {
                let body = body.clone();
                async move {
                    assert_eq!(call, format!("{MODEL}:generateContent"));
                    assert_eq!(request["contents"][0]["role"], "user");
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_generate_returns_reply_text() {
        let base = fake_gemini(
            AxumStatus::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "```json\n{}\n```"}]}}]}),
        )
        .await;
        let client = GeminiClient::new("test-key".to_string(), &base).unwrap();
        let text = client.generate("ping").await.unwrap();
        assert_eq!(text, "```json\n{}\n```");
    }

    #[tokio::test]
    async fn test_generate_maps_429_to_quota() {
        let base = fake_gemini(
            AxumStatus::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "Resource exhausted", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;
        let client = GeminiClient::new("test-key".to_string(), &base).unwrap();
        let err = client.generate("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_empty_content() {
        let base = fake_gemini(AxumStatus::OK, json!({"candidates": []})).await;
        let client = GeminiClient::new("test-key".to_string(), &base).unwrap();
        let err = client.generate("ping").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
