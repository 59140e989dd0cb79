//! Ollama Provider Implementation
//!
//! Integration with Ollama's local `/api/generate` endpoint.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Configurable endpoint, model, timeout and sampling temperature
//! - Optional JSON output mode
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use wayfarer_llm::OllamaProvider;
//! use wayfarer_domain::traits::Oracle;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3")
//!     .with_json_mode(true);
//! let completion = provider.complete("Reply with {}").unwrap();
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use wayfarer_domain::traits::Oracle;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3";

/// Default timeout for a completion request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per completion
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API provider for local inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
    json_mode: bool,
    temperature: Option<f32>,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(timeout),
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
            json_mode: false,
            temperature: None,
        }
    }

    /// Create a provider against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts per completion
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.client = build_client(timeout);
        self
    }

    /// Ask Ollama to constrain output to valid JSON
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Generate text using the Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running or the request times out
    /// - Model is not available
    /// - Response envelope is invalid
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: self.json_mode.then_some("json"),
            options: self.temperature.map(|temperature| OllamaOptions { temperature }),
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        return response
                            .json::<OllamaGenerateResponse>()
                            .await
                            .map(|body| body.response)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                            });
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
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
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama attempt {} failed, retrying in {:?}", attempts, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl Oracle for OllamaProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        debug!(model = %self.model, timeout = ?self.timeout, "Ollama completion");
        // Blocking wrapper for the async client
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama3");
        assert_eq!(provider.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(provider.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!provider.json_mode);
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_ollama_provider_builders() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama3")
            .with_max_retries(0)
            .with_timeout(Duration::from_secs(5))
            .with_json_mode(true)
            .with_temperature(0.1);
        assert_eq!(provider.max_retries, 1);
        assert_eq!(provider.timeout, Duration::from_secs(5));
        assert!(provider.json_mode);
        assert_eq!(provider.temperature, Some(0.1));
    }

    #[test]
    fn test_request_serialization_omits_unset_options() {
        let request = OllamaGenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
            format: None,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("format").is_none());
        assert!(json.get("options").is_none());
        assert_eq!(json["stream"], false);
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint(DEFAULT_MODEL);
        let result = provider.generate("Say 'hello' and nothing else").await;
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Use invalid endpoint to trigger error
        let provider = OllamaProvider::new("http://localhost:99999", "llama3").with_max_retries(1);

        let result = provider.generate("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
