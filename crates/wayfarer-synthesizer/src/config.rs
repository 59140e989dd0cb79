//! Configuration for the synthesis loop

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Smallest accepted `hard_char_ceiling`
///
/// The clamp keeps only the tail of a prompt, dropping the task text and the
/// program, so it must sit well above the size of any ordinary email.
pub const MIN_HARD_CHAR_CEILING: usize = 100_000;

/// `hard_char_ceiling` must be at least this many times `token_limit`
pub const MIN_CEILING_PER_TOKEN: usize = 2;

/// How the oracle is asked to express the extraction program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramFormat {
    /// Free-form code text, never executed by the host
    #[default]
    Opaque,
    /// JSON rule set interpreted by `wayfarer-rules`
    Rules,
}

impl fmt::Display for ProgramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramFormat::Opaque => f.write_str("opaque"),
            ProgramFormat::Rules => f.write_str("rules"),
        }
    }
}

/// Configuration for a synthesis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Search query forwarded to the document source
    pub query: String,

    /// Documents requested per batch
    pub batch_size: usize,

    /// Token ceiling for a composed prompt
    pub token_limit: usize,

    /// Absolute size (characters) above which a prompt keeps only its tail
    pub hard_char_ceiling: usize,

    /// Characters dropped from the end per shrink iteration
    pub shrink_step_chars: usize,

    /// Attempts per batch fetch before the run stops
    pub max_fetch_attempts: u32,

    /// Pause between fetch attempts (milliseconds)
    pub fetch_retry_delay_ms: u64,

    /// Representation of the extraction program
    pub program_format: ProgramFormat,

    /// Language named in the prompt when the format is opaque
    pub program_language: String,

    /// Stop after this many batches, keeping the cursor for a later resume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_batches: Option<u64>,
}

impl SynthesizerConfig {
    /// Pause between fetch attempts as a Duration
    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.token_limit == 0 {
            return Err("token_limit must be greater than 0".to_string());
        }
        if self.hard_char_ceiling == 0 {
            return Err("hard_char_ceiling must be greater than 0".to_string());
        }
        if self.hard_char_ceiling < MIN_HARD_CHAR_CEILING {
            return Err(format!(
                "hard_char_ceiling must be at least {} characters",
                MIN_HARD_CHAR_CEILING
            ));
        }
        if self.hard_char_ceiling < self.token_limit.saturating_mul(MIN_CEILING_PER_TOKEN) {
            return Err(format!(
                "hard_char_ceiling must be at least {} times token_limit",
                MIN_CEILING_PER_TOKEN
            ));
        }
        if self.shrink_step_chars == 0 {
            return Err("shrink_step_chars must be greater than 0".to_string());
        }
        if self.max_fetch_attempts == 0 {
            return Err("max_fetch_attempts must be greater than 0".to_string());
        }
        if self.max_batches == Some(0) {
            return Err("max_batches must be greater than 0 when set".to_string());
        }
        if self.program_format == ProgramFormat::Opaque && self.program_language.trim().is_empty() {
            return Err("program_language must not be empty for opaque programs".to_string());
        }
        Ok(())
    }
}

impl Default for SynthesizerConfig {
    /// Settings for large hosted models
    fn default() -> Self {
        Self {
            query: "your flight itinerary".to_string(),
            batch_size: 4,
            token_limit: 128_000,
            hard_char_ceiling: 300_000,
            shrink_step_chars: 10_000,
            max_fetch_attempts: 3,
            fetch_retry_delay_ms: 500,
            program_format: ProgramFormat::Opaque,
            program_language: "Python".to_string(),
            max_batches: None,
        }
    }
}

impl SynthesizerConfig {
    /// Preset for local models with an 8k-token context window
    ///
    /// The hard ceiling stays at the default; only the soft budget shrinks.
    pub fn small_context() -> Self {
        Self {
            token_limit: 8_000,
            shrink_step_chars: 2_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SynthesizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.query, "your flight itinerary");
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.token_limit, 128_000);
        assert_eq!(config.hard_char_ceiling, 300_000);
        assert_eq!(config.shrink_step_chars, 10_000);
    }

    #[test]
    fn test_small_context_config_is_valid() {
        let config = SynthesizerConfig::small_context();
        assert!(config.validate().is_ok());
        assert!(config.token_limit < SynthesizerConfig::default().token_limit);
    }

    #[test]
    fn test_small_context_keeps_large_ceiling() {
        let config = SynthesizerConfig::small_context();
        assert_eq!(config.hard_char_ceiling, SynthesizerConfig::default().hard_char_ceiling);
    }

    #[test]
    fn test_ceiling_near_budget_rejected() {
        let mut config = SynthesizerConfig::small_context();
        config.hard_char_ceiling = 64_000;
        assert!(config.validate().is_err());

        let mut config = SynthesizerConfig::default();
        config.token_limit = 200_000;
        config.hard_char_ceiling = 300_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = SynthesizerConfig::default();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = SynthesizerConfig::default();
        config.shrink_step_chars = 0;
        assert!(config.validate().is_err());

        let mut config = SynthesizerConfig::default();
        config.max_fetch_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = SynthesizerConfig::default();
        config.max_batches = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SynthesizerConfig::small_context();
        config.program_format = ProgramFormat::Rules;
        config.max_batches = Some(10);

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("program_format = \"rules\""));
        let parsed = SynthesizerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = SynthesizerConfig::from_toml("batch_size = 10\n").unwrap();
        assert_eq!(parsed.batch_size, 10);
        assert_eq!(parsed.token_limit, 128_000);
        assert_eq!(parsed.program_format, ProgramFormat::Opaque);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(SynthesizerConfig::from_toml("batch_size = \"many\"").is_err());
    }
}
