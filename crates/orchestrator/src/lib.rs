//! The answer orchestrator.
//!
//! One question in, one `[{ "output": ... }]` out:
//!
//! 1. **Select** the model bucket that receives the tool binding
//! 2. **Invoke** it with `[system, user]`
//! 3. **No tool call**: return the text as-is
//! 4. **Leaked function-call text**: re-issue the same invocation, bounded
//! 5. **Tool call**: run the first one, append `[assistant, tool]`, invoke once
//!    more and return that text
//!
//! Every failure ends up as an output string; nothing escapes [`AnswerOrchestrator::run`].

pub mod arguments;
pub mod error;
pub mod malformed;
pub mod orchestrator;
pub mod output;
pub mod selection;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::OrchestratorError;
pub use malformed::looks_malformed;
pub use orchestrator::AnswerOrchestrator;
pub use output::{Answer, AnswerOutput, HostInput};
pub use selection::ModelSet;
pub use settings::OrchestratorSettings;
