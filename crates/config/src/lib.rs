//! Configuration loading and validation for dealflow.
//!
//! Loads configuration from a `config.toml` with environment variable
//! overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default model sent to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Hard bound on model↔tool round trips per turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Provider endpoint configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Which external integrations are connected for this deployment
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_max_iterations() -> u32 {
    10
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .field("provider", &self.provider)
            .field("integrations", &self.integrations)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_iterations: default_max_iterations(),
            provider: ProviderConfig::default(),
            integrations: IntegrationsConfig::default(),
        }
    }
}

/// Provider endpoint configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (also settable via `DEALFLOW_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

/// Which external integrations are connected.
///
/// These booleans drive per-session tool registry construction: a tool is
/// only offered to the model when its backing integration is connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub crm_connected: bool,

    #[serde(default)]
    pub google_connected: bool,

    #[serde(default)]
    pub outlook_connected: bool,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus env overrides, for deployments with no config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("DEALFLOW_API_KEY")
            && !key.is_empty()
        {
            self.provider.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DEALFLOW_API_URL")
            && !url.is_empty()
        {
            self.provider.api_url = url;
        }
        if let Ok(model) = std::env::var("DEALFLOW_MODEL")
            && !model.is_empty()
        {
            self.model = model;
        }
    }

    /// Validate all settings. Called automatically by `load`/`from_env`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be in 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.max_iterations > 50 {
            tracing::warn!(
                max_iterations = self.max_iterations,
                "Unusually high iteration budget; each iteration is a model call"
            );
        }
        if self.provider.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.api_url must not be empty".into()));
        }
        Ok(())
    }
}
