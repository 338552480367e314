//! Google Generative Language backend.
//!
//! Calls `models/{model}:generateContent` with the persona as the
//! system instruction and a single user turn.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::traits::*;

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a backend against a custom base URL.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Create a backend for the public Gemini API.
    pub fn google(model: &str, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_BASE_URL, model, api_key)
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

fn text_content(role: Option<&str>, text: String) -> Content {
    Content {
        role: role.map(String::from),
        parts: vec![Part { text: Some(text) }],
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let generation_config = GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            response_mime_type: request.json_output.then_some("application/json"),
        };

        let body = GenerateRequest {
            system_instruction: request
                .system_prompt
                .clone()
                .map(|s| text_content(None, s)),
            contents: vec![text_content(Some("user"), request.user_text())],
            generation_config: Some(generation_config),
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited { retry_after_ms: None });
            }

            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        if let Some(reason) = generated
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(LlmError::ContentFiltered { reason });
        }

        let content = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| LlmError::ParseError("No candidates in response".to_string()))?;

        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();

        let usage = generated
            .usage_metadata
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: text,
            usage,
        })
    }
}
