//! GroqApiClient - Direct REST client for OpenAI-compatible chat completions.
//!
//! Groq exposes the OpenAI Chat Completions wire format, so the same client
//! works against any compatible endpoint by overriding the base URL.

use std::time::Duration;

use async_trait::async_trait;
use quarry_core::config::{Credentials, PipelineConfig};
use quarry_core::{CompletionClient, CompletionRequest, QuarryError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Completion client that talks to an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct GroqApiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqApiClient {
    /// Creates a new client with the provided API key and model, using the
    /// default Groq base URL.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: quarry_core::config::DEFAULT_COMPLETION_BASE_URL.to_string(),
        }
    }

    /// Builds a client from resolved credentials and pipeline settings.
    ///
    /// A model named in the credentials wins over the configured one.
    pub fn from_config(credentials: &Credentials, config: &PipelineConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.completion_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|err| {
            QuarryError::configuration(format!("Failed to build completion HTTP client: {err}"))
        })?;

        let model = credentials
            .model_override
            .clone()
            .unwrap_or_else(|| config.model.clone());

        Ok(Self {
            client,
            api_key: credentials.completion_api_key.clone(),
            model,
            base_url: config.completion_base_url.clone(),
        })
    }

    /// Overrides the API base URL (e.g. `https://api.openai.com/v1`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                QuarryError::completion_unavailable(
                    format!("Completion request failed: {err}"),
                    None,
                    err.is_connect() || err.is_timeout(),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read completion error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            QuarryError::completion_unavailable(
                format!("Failed to parse completion response: {err}"),
                None,
                false,
            )
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionClient for GroqApiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let messages = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_ref(),
                content: &m.content,
            })
            .collect();

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "[GroqApiClient] Sending completion request"
        );

        self.send_request(&body).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| {
            QuarryError::completion_unavailable(
                "Completion API returned no content in the response",
                None,
                false,
            )
        })
}

fn map_http_error(status: StatusCode, body: String) -> QuarryError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    QuarryError::completion_unavailable(
        format!("Completion API returned HTTP {}: {}", status.as_u16(), message),
        Some(status.as_u16()),
        is_retryable_status(status),
    )
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}
