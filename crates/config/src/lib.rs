//! Configuration loading, validation, and management for answerline.
//!
//! Loads configuration from `~/.answerline/config.toml` (or an explicit path)
//! with environment variable overrides for API keys. Validates all settings
//! at startup.

use answerline_core::{ModelRole, ToolDispatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The literal output returned when every attempt leaks function-call text.
pub const RETRIES_EXHAUSTED_MESSAGE: &str = "Got error on trying to answer";

/// The root configuration structure.
///
/// Maps directly to `~/.answerline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallback API key for every provider without its own key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// System message opening every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Sampling temperature for every model without its own setting
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Retry, timeout, and dispatch settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Candidate models, partitioned into primary/secondary buckets
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// External tools exposed to the model, in dispatch order
    #[serde(default)]
    pub tools: Vec<ToolConfig>,

    /// Provider-specific credentials and endpoints
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant.".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            role: Some(ModelRole::Primary),
            temperature: None,
        },
        ModelConfig {
            provider: "groq".into(),
            model: "llama-3.3-70b-versatile".into(),
            role: Some(ModelRole::Secondary),
            temperature: None,
        },
    ]
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("system_prompt", &self.system_prompt)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("orchestrator", &self.orchestrator)
            .field("models", &self.models)
            .field("tools", &self.tools)
            .field("providers", &self.providers)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Re-invocations allowed after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Which bucket receives the tool binding
    #[serde(default = "default_bind_tools_to")]
    pub bind_tools_to: ModelRole,

    #[serde(default)]
    pub tool_dispatch: ToolDispatch,

    /// Output when every attempt is malformed
    #[serde(default = "default_error_message")]
    pub error_message: String,
}

fn default_max_retries() -> u32 {
    3
}
fn default_model_timeout() -> u64 {
    60
}
fn default_tool_timeout() -> u64 {
    30
}
fn default_bind_tools_to() -> ModelRole {
    ModelRole::Secondary
}
fn default_error_message() -> String {
    RETRIES_EXHAUSTED_MESSAGE.into()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            model_timeout_secs: default_model_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            bind_tools_to: default_bind_tools_to(),
            tool_dispatch: ToolDispatch::default(),
            error_message: default_error_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name, a key of `[providers]` or a well-known name
    pub provider: String,

    /// Model id sent to the provider
    pub model: String,

    /// Explicit bucket; inferred from the model id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ModelRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelConfig {
    pub fn effective_role(&self) -> ModelRole {
        self.role.unwrap_or_else(|| ModelRole::infer(&self.model))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Endpoint receiving `POST {"query": ...}`
    pub url: String,

    /// Extra request headers (e.g. an API token header)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    19191
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.answerline/config.toml).
    ///
    /// API keys are then filled from the environment:
    /// - `ANSWERLINE_API_KEY` as the global fallback
    /// - `<PROVIDER>_API_KEY` (e.g. `OPENAI_API_KEY`, `GROQ_API_KEY`) per provider
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&Self::config_dir().join("config.toml"))
    }

    /// Like [`AppConfig::load`] but from an explicit file.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill missing API keys from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("ANSWERLINE_API_KEY");
        }

        let mut names: Vec<String> = self.models.iter().map(|m| m.provider.clone()).collect();
        names.sort();
        names.dedup();

        for name in names {
            let entry = self.providers.entry(name.clone()).or_default();
            if entry.api_key.is_none() {
                entry.api_key = lookup(&provider_env_key(&name));
            }
        }
    }

    /// The API key for `provider`: its own key, else the global fallback.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".answerline")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if let Some(model) = self
            .models
            .iter()
            .find(|m| m.temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)))
        {
            return Err(ConfigError::ValidationError(format!(
                "temperature for model '{}' must be between 0.0 and 2.0",
                model.model
            )));
        }

        if self.orchestrator.model_timeout_secs == 0 || self.orchestrator.tool_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "model_timeout_secs and tool_timeout_secs must be > 0".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate tool name '{}'",
                    tool.name
                )));
            }
        }

        Ok(())
    }

    /// A copy safe to print: API keys and tool header values are masked.
    pub fn redacted(&self) -> Self {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]".to_string());
        let mut copy = self.clone();
        copy.api_key = mask(&self.api_key);
        for provider in copy.providers.values_mut() {
            provider.api_key = mask(&provider.api_key);
        }
        for tool in &mut copy.tools {
            for value in tool.headers.values_mut() {
                *value = "[REDACTED]".into();
            }
        }
        copy
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: None,
            orchestrator: OrchestratorConfig::default(),
            models: default_models(),
            tools: vec![],
            providers: HashMap::new(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// `groq` -> `GROQ_API_KEY`, `open-router` -> `OPEN_ROUTER_API_KEY`.
fn provider_env_key(provider: &str) -> String {
    let upper: String = provider
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{upper}_API_KEY")
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
