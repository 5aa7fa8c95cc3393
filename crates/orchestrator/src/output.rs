//! Host-facing input and output shapes.

use answerline_core::event::AnswerKind;
use serde::{Deserialize, Serialize};

/// What the host pipeline hands in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInput {
    pub question: String,
}

/// One element of the host output: `{ "output": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub output: String,
}

/// How a question was answered, before flattening to [`AnswerOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The model replied without requesting a tool.
    Direct(String),
    /// One tool ran and the model answered from its result.
    ToolAugmented { text: String, tool_name: String },
    /// Every attempt leaked function-call text.
    RetriesExhausted,
}

impl Answer {
    pub fn kind(&self) -> AnswerKind {
        match self {
            Self::Direct(_) => AnswerKind::Direct,
            Self::ToolAugmented { .. } => AnswerKind::ToolAugmented,
            Self::RetriesExhausted => AnswerKind::RetriesExhausted,
        }
    }
}
