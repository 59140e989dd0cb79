//! Runtime selection of oracle providers and document sources.

use crate::config::{GmailSettings, OracleSettings, ProviderKind};
use crate::error::{CliError, Result};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use wayfarer_domain::traits::{DocumentSource, Oracle};
use wayfarer_domain::{Batch, Cursor};
use wayfarer_llm::{LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use wayfarer_mail::{AuthorizedUser, GmailSource, JsonlSource, SourceError};

/// Reply used by the mock provider: not an itinerary, program untouched
pub const MOCK_REPLY: &str = r#"{"was_itinerary": false, "modified_code": false, "code": ""}"#;

/// An oracle chosen from configuration
pub enum OracleClient {
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// OpenAI-compatible API
    OpenAi(OpenAiProvider),
    /// Canned replies
    Mock(MockProvider),
}

impl OracleClient {
    /// Build the configured provider
    ///
    /// The OpenAI key is read from the environment variable named in the settings.
    pub fn from_settings(settings: &OracleSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = match settings.provider {
            ProviderKind::Ollama => {
                let endpoint = settings
                    .endpoint
                    .as_deref()
                    .unwrap_or(wayfarer_llm::ollama::DEFAULT_ENDPOINT);
                let mut provider = OllamaProvider::new(endpoint, settings.model.as_str())
                    .with_timeout(timeout)
                    .with_max_retries(settings.max_retries)
                    .with_json_mode(settings.json_mode);
                if let Some(temperature) = settings.temperature {
                    provider = provider.with_temperature(temperature);
                }
                OracleClient::Ollama(provider)
            }
            ProviderKind::OpenAi => {
                let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
                    CliError::Config(format!("Environment variable {} is not set", settings.api_key_env))
                })?;
                let endpoint = settings
                    .endpoint
                    .as_deref()
                    .unwrap_or(wayfarer_llm::openai::DEFAULT_ENDPOINT);
                let mut provider = OpenAiProvider::new(endpoint, settings.model.as_str(), api_key)
                    .with_timeout(timeout)
                    .with_max_retries(settings.max_retries)
                    .with_json_mode(settings.json_mode);
                if let Some(temperature) = settings.temperature {
                    provider = provider.with_temperature(temperature);
                }
                OracleClient::OpenAi(provider)
            }
            ProviderKind::Mock => OracleClient::Mock(MockProvider::new(MOCK_REPLY)),
        };

        info!(provider = ?settings.provider, model = %client.model_name(), "Oracle configured");
        Ok(client)
    }
}

impl Oracle for OracleClient {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> std::result::Result<String, Self::Error> {
        match self {
            OracleClient::Ollama(provider) => provider.complete(prompt),
            OracleClient::OpenAi(provider) => provider.complete(prompt),
            OracleClient::Mock(provider) => provider.complete(prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            OracleClient::Ollama(provider) => provider.model_name(),
            OracleClient::OpenAi(provider) => provider.model_name(),
            OracleClient::Mock(provider) => provider.model_name(),
        }
    }
}

/// A document source chosen on the command line
pub enum MailSource {
    /// Live mailbox
    Gmail(GmailSource),
    /// Offline corpus
    Jsonl(JsonlSource),
}

impl MailSource {
    /// Open the Gmail source using the configured token file
    pub fn gmail(settings: &GmailSettings) -> Result<Self> {
        let credentials = AuthorizedUser::load(&settings.token_path)?;
        Ok(MailSource::Gmail(GmailSource::new(credentials)))
    }

    /// Open a JSON-lines corpus
    pub fn jsonl(path: &Path) -> Result<Self> {
        let source = JsonlSource::open(path)?;
        info!(path = %path.display(), documents = source.len(), "Corpus loaded");
        Ok(MailSource::Jsonl(source))
    }
}

impl DocumentSource for MailSource {
    type Error = SourceError;

    fn search(
        &mut self,
        query: &str,
        batch_size: usize,
        cursor: Option<&Cursor>,
    ) -> std::result::Result<Batch, Self::Error> {
        match self {
            MailSource::Gmail(source) => source.search(query, batch_size, cursor),
            MailSource::Jsonl(source) => source.search(query, batch_size, cursor),
        }
    }
}
