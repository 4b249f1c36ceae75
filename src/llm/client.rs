use reqwest::blocking::Client;

use crate::error::{ReportingError, Result};
use crate::llm::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::llm::TextCompletion;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Blocking client for the Gemini `generateContent` endpoint.
///
/// The pipeline is synchronous end to end, so the request blocks; any
/// transport or quota failure surfaces as `ModelInvocation` and is
/// absorbed by the caller's fallback path.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f64,
    response_schema: Option<serde_json::Value>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            temperature: 0.2,
            response_schema: None,
        }
    }

    /// Reads the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ReportingError::ModelInvocation("GEMINI_API_KEY is not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Constrains responses to a JSON schema (see
    /// [`crate::intent::intent_response_schema`]); also switches the
    /// response MIME type to `application/json`.
    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

impl TextCompletion for GeminiClient {
    fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
                response_mime_type: self
                    .response_schema
                    .is_some()
                    .then(|| "application/json".to_string()),
                response_schema: self.response_schema.clone(),
            }),
        };

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .map_err(|e| ReportingError::ModelInvocation(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ReportingError::ModelInvocation(format!(
                "Gemini API error (status {}): {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = res
            .json()
            .map_err(|e| ReportingError::ModelInvocation(e.to_string()))?;

        body.candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                ReportingError::ModelInvocation("empty completion response".to_string())
            })
    }
}
