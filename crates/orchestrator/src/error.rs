use answerline_core::error::{ProviderError, ToolError};
use answerline_core::model::ModelRole;
use thiserror::Error;

/// Everything that can stop a question from being answered.
///
/// None of these escape [`crate::AnswerOrchestrator::run`]; they become the
/// `output` string instead.
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    #[error("No {0} model available for tool binding")]
    NoModel(ModelRole),

    #[error("Model invocation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("Invalid arguments for tool call '{call_id}': {reason}")]
    InvalidToolArguments { call_id: String, reason: String },
}
