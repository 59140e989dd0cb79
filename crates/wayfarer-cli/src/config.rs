//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wayfarer_synthesizer::SynthesizerConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Oracle provider settings
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Gmail credentials
    #[serde(default)]
    pub gmail: GmailSettings,

    /// Synthesis loop settings
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Which oracle backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions
    #[serde(rename = "openai")]
    OpenAi,
    /// Canned replies that never change the program
    Mock,
}

/// Oracle provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Provider backend
    #[serde(default)]
    pub provider: ProviderKind,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint override; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per completion
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Environment variable holding the OpenAI API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Ask the provider for JSON-only output
    #[serde(default = "default_true")]
    pub json_mode: bool,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Gmail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailSettings {
    /// Authorized-user token file
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".wayfarer").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.synthesizer.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            api_key_env: default_api_key_env(),
            json_mode: true,
            temperature: None,
        }
    }
}

impl Default for GmailSettings {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_model() -> String {
    wayfarer_llm::ollama::DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_synthesizer::ProgramFormat;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.oracle.provider, ProviderKind::Ollama);
        assert_eq!(config.oracle.model, "llama3");
        assert_eq!(config.oracle.timeout_secs, 30);
        assert_eq!(config.gmail.token_path, PathBuf::from("token.json"));
        assert_eq!(config.synthesizer.batch_size, 4);
        assert!(config.settings.color);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[oracle]
provider = "openai"
model = "gpt-4o"

[synthesizer]
program_format = "rules"
batch_size = 10
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.oracle.provider, ProviderKind::OpenAi);
        assert_eq!(config.oracle.model, "gpt-4o");
        assert_eq!(config.oracle.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.synthesizer.program_format, ProgramFormat::Rules);
        assert_eq!(config.synthesizer.batch_size, 10);
        assert_eq!(config.synthesizer.token_limit, 128_000);
    }

    #[test]
    fn test_invalid_synthesizer_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[synthesizer]\nbatch_size = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.oracle.provider = ProviderKind::Mock;
        config.settings.color = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.oracle.provider, ProviderKind::Mock);
        assert!(!loaded.settings.color);
    }
}
