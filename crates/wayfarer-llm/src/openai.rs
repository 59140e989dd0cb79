//! OpenAI-compatible Provider Implementation
//!
//! Talks to any server exposing `/v1/chat/completions` (OpenAI itself, or a
//! compatible gateway). The prompt is sent as a single user message.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use wayfarer_domain::traits::Oracle;

/// Default OpenAI API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default timeout for a completion request
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts per completion
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
    json_mode: bool,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for `model` authenticated with `api_key`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: DEFAULT_MAX_RETRIES,
            json_mode: false,
            temperature: None,
        }
    }

    /// Create a provider against the public OpenAI endpoint
    pub fn default_endpoint(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model, api_key)
    }

    /// Set the maximum number of attempts per completion
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = client_with_timeout(timeout);
        self
    }

    /// Request a JSON object response format
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: self.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    /// Generate a chat completion
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::Authentication("API key is empty".to_string()));
        }

        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = self.request(prompt);

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.message.content)
                            .ok_or_else(|| LlmError::InvalidResponse("No choices returned".to_string()));
                    } else if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(LlmError::Authentication(format!("HTTP {}", status)));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("OpenAI attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

fn client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

impl Oracle for OpenAiProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!(model = %self.model, "OpenAI completion");
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Runtime(e.to_string()))?
            .block_on(self.generate(prompt))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
