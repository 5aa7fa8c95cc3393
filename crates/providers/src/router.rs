//! Provider router: builds providers from config and turns configured models
//! into `ModelHandle`s.

use std::collections::HashMap;
use std::sync::Arc;

use answerline_config::AppConfig;
use answerline_core::model::ModelHandle;
use answerline_core::provider::Provider;
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;

/// Holds one provider per configured provider name.
#[derive(Default)]
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Model '{model}' references unknown provider '{provider}'")]
    UnknownProvider { provider: String, model: String },

    #[error("No models configured")]
    NoModels,
}

/// Build one OpenAI-compatible provider for every provider name the
/// configured models reference.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new();

    for model in &config.models {
        if router.get(&model.provider).is_some() {
            continue;
        }

        let name = model.provider.as_str();
        let base_url = config
            .providers
            .get(name)
            .and_then(|p| p.api_url.clone())
            .unwrap_or_else(|| default_base_url(name));
        let api_key = config.api_key_for(name).unwrap_or_default();

        debug!(provider = %name, base_url = %base_url, "Registering provider");
        router.register(
            name,
            Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)),
        );
    }

    router
}

/// Create a handle per configured model, in configuration order.
pub fn build_model_handles(
    config: &AppConfig,
    router: &ProviderRouter,
) -> Result<Vec<ModelHandle>, RouterError> {
    if config.models.is_empty() {
        return Err(RouterError::NoModels);
    }

    config
        .models
        .iter()
        .map(|m| {
            let provider = router
                .get(&m.provider)
                .ok_or_else(|| RouterError::UnknownProvider {
                    provider: m.provider.clone(),
                    model: m.model.clone(),
                })?;

            let mut handle = ModelHandle::new(provider, &m.model)
                .with_temperature(m.temperature.unwrap_or(config.temperature))
                .with_max_tokens(config.max_tokens);
            if let Some(role) = m.role {
                handle = handle.with_role(role);
            }
            Ok(handle)
        })
        .collect()
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerline_config::{ModelConfig, ProviderConfig};
    use answerline_core::ModelRole;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("groq").contains("api.groq.com"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["groq", "openai"]);

        let handles = build_model_handles(&config, &router).unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(handles[0].model_id(), "gpt-4o-mini");
        assert_eq!(handles[0].role(), ModelRole::Primary);
        assert_eq!(handles[1].provider_name(), "groq");
        assert_eq!(handles[1].role(), ModelRole::Secondary);
    }

    #[test]
    fn untagged_models_keep_inferred_roles() {
        let mut config = AppConfig {
            models: vec![
                ModelConfig {
                    provider: "local".into(),
                    model: "mixtral".into(),
                    role: None,
                    temperature: None,
                },
                ModelConfig {
                    provider: "local".into(),
                    model: "gpt-4o".into(),
                    role: None,
                    temperature: Some(0.0),
                },
            ],
            ..AppConfig::default()
        };
        config.providers.insert(
            "local".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("http://localhost:9000/v1".into()),
            },
        );

        let router = build_from_config(&config);
        assert_eq!(router.list(), vec!["local"]);

        let handles = build_model_handles(&config, &router).unwrap();
        assert_eq!(handles[0].explicit_role(), None);
        assert_eq!(handles[0].role(), ModelRole::Secondary);
        assert_eq!(handles[1].role(), ModelRole::Primary);
    }

    #[test]
    fn unknown_provider_is_reported() {
        let config = AppConfig::default();
        let router = ProviderRouter::new();
        let err = build_model_handles(&config, &router).unwrap_err();
        assert!(matches!(err, RouterError::UnknownProvider { .. }));
    }

    #[test]
    fn empty_model_list_is_reported() {
        let config = AppConfig {
            models: vec![],
            ..AppConfig::default()
        };
        let router = build_from_config(&config);
        assert!(matches!(
            build_model_handles(&config, &router),
            Err(RouterError::NoModels)
        ));
    }
}
