use std::time::Duration;

use answerline_config::{AppConfig, RETRIES_EXHAUSTED_MESSAGE};
use answerline_core::model::ModelRole;
use answerline_core::tool::ToolDispatch;

/// Tunables for one [`crate::AnswerOrchestrator`].
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// System message opening every conversation
    pub system_prompt: String,

    /// Re-invocations after the first attempt (so `max_retries + 1` calls at most)
    pub max_retries: u32,

    /// Deadline for each model call
    pub model_timeout: Duration,

    /// Deadline for the tool call
    pub tool_timeout: Duration,

    /// Bucket whose model gets the tools bound and answers the question
    pub bind_tools_to: ModelRole,

    pub tool_dispatch: ToolDispatch,

    /// Output when every attempt leaks function-call text
    pub error_message: String,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let o = &config.orchestrator;
        Self {
            system_prompt: config.system_prompt.clone(),
            max_retries: o.max_retries,
            model_timeout: Duration::from_secs(o.model_timeout_secs),
            tool_timeout: Duration::from_secs(o.tool_timeout_secs),
            bind_tools_to: o.bind_tools_to,
            tool_dispatch: o.tool_dispatch,
            error_message: o.error_message.clone(),
        }
    }

    /// Total model calls allowed for one step.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful AI assistant.".into(),
            max_retries: 3,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
            bind_tools_to: ModelRole::Secondary,
            tool_dispatch: ToolDispatch::ByName,
            error_message: RETRIES_EXHAUSTED_MESSAGE.into(),
        }
    }
}
