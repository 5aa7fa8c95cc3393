//! Model handles: a provider, a model id, and the tools bound to it.
//!
//! A `ModelHandle` is the capability the orchestrator works with:
//! `invoke(conversation) -> Message` and `bind_tools(tools) -> ModelHandle`.
//! Binding never mutates the original handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::message::Message;
use crate::provider::{Provider, ProviderRequest, ToolDefinition, default_temperature};

/// Which bucket a model belongs to when the orchestrator picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Primary,
    Secondary,
}

impl ModelRole {
    /// Legacy classification for untagged handles: any model id containing
    /// `gpt` is primary, everything else is secondary.
    pub fn infer(model_id: &str) -> Self {
        if model_id.contains("gpt") {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// A callable model: provider + model id + sampling settings + bound tools.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn Provider>,
    model: String,
    role: Option<ModelRole>,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Vec<ToolDefinition>,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            role: None,
            temperature: default_temperature(),
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    /// Tag this handle explicitly instead of relying on name inference.
    pub fn with_role(mut self, role: ModelRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The explicit tag if one was assigned, otherwise the inferred bucket.
    pub fn role(&self) -> ModelRole {
        self.role.unwrap_or_else(|| ModelRole::infer(&self.model))
    }

    pub fn explicit_role(&self) -> Option<ModelRole> {
        self.role
    }

    pub fn bound_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Return a copy of this handle with `tools` bound to every invocation.
    pub fn bind_tools(&self, tools: Vec<ToolDefinition>) -> Self {
        Self {
            tools,
            ..self.clone()
        }
    }

    /// Send the conversation to the model and return its reply.
    pub async fn invoke(&self, messages: &[Message]) -> Result<Message, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.clone(),
        };

        debug!(
            provider = %self.provider.name(),
            model = %self.model,
            messages = messages.len(),
            tools = self.tools.len(),
            "Invoking model"
        );

        let response = self.provider.complete(request).await?;
        Ok(response.message)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("role", &self.role())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}
