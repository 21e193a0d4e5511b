//! Turns a resume and a job description into an `AnalysisResult`
//! with a single model call.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::build_analysis_prompt;
use crate::llm_client::{strip_json_fences, LanguageModel, LlmError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini client not initialized. Please set GEMINI_API_KEY in .env file.")]
    ClientNotConfigured,

    #[error("Gemini returned invalid JSON: {source}\nRaw response:\n{raw}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A parsed analysis plus the JSON value it came from, unknown keys included.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub raw: Value,
}

/// Holds the process-wide model handle. `None` means the service started
/// without a usable API key.
#[derive(Clone, Default)]
pub struct AnalysisClient {
    model: Option<Arc<dyn LanguageModel>>,
}

impl AnalysisClient {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Sends one prompt built from both texts and parses the reply.
    /// Fails fast with `ClientNotConfigured` before any network call.
    pub async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<Analysis, AnalysisError> {
        let model = self.model.as_ref().ok_or(AnalysisError::ClientNotConfigured)?;

        let prompt = build_analysis_prompt(resume_text, job_text);
        info!("Calling model {} ({} prompt chars)", model.model(), prompt.len());

        let reply = model.generate(&prompt).await?;
        debug!("Model reply received ({} chars)", reply.len());

        parse_analysis(&reply)
    }
}

/// Parses a model reply, fenced or not, into an `Analysis`.
pub fn parse_analysis(reply: &str) -> Result<Analysis, AnalysisError> {
    let json_text = strip_json_fences(reply);
    let malformed = |source| AnalysisError::MalformedResponse {
        source,
        raw: reply.to_string(),
    };

    let raw: Value = serde_json::from_str(json_text).map_err(malformed)?;
    if !raw.is_object() {
        return Err(malformed(<serde_json::Error as serde::de::Error>::custom(
            "expected a JSON object at the top level",
        )));
    }
    let result = AnalysisResult::deserialize(&raw).map_err(malformed)?;
    Ok(Analysis { result, raw })
}
