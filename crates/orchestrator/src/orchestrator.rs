//! The single answer step: select, invoke, retry, run one tool, answer.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use answerline_core::error::{ProviderError, ToolError};
use answerline_core::event::{AnswerKind, DomainEvent, EventBus};
use answerline_core::message::{Conversation, Message, MessageToolCall};
use answerline_core::model::ModelHandle;
use answerline_core::tool::{Tool, ToolDispatch, ToolRegistry};
use futures::FutureExt;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::arguments::extract_query;
use crate::error::OrchestratorError;
use crate::malformed::looks_malformed;
use crate::output::{Answer, AnswerOutput, HostInput};
use crate::selection::ModelSet;
use crate::settings::OrchestratorSettings;

/// What the first invocation round settled on.
enum FirstReply {
    Text(String),
    ToolRequest(Message),
    Malformed,
}

/// Answers one question per call. Holds no per-question state, so a single
/// instance can serve concurrent questions.
pub struct AnswerOrchestrator {
    models: ModelSet,
    tools: Arc<ToolRegistry>,
    settings: OrchestratorSettings,
    event_bus: Arc<EventBus>,
}

impl AnswerOrchestrator {
    pub fn new(
        models: impl IntoIterator<Item = ModelHandle>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            models: ModelSet::partition(models),
            tools,
            settings: OrchestratorSettings::default(),
            event_bus,
        }
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Host entry point. Always yields exactly one output item; failures,
    /// including a panicking provider or tool, are reported as the output text.
    pub async fn run(&self, input: &HostInput) -> Vec<AnswerOutput> {
        let outcome = AssertUnwindSafe(self.answer(&input.question))
            .catch_unwind()
            .await;

        let output = match outcome {
            Ok(Ok(answer)) => self.render(answer),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                error!(reason = %reason, "Answer step panicked");
                let output = format!("Internal error: {reason}");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "answer".into(),
                    error_message: output.clone(),
                    timestamp: chrono::Utc::now(),
                });
                output
            }
        };
        vec![AnswerOutput { output }]
    }

    /// Answer `question`, keeping the typed outcome.
    pub async fn answer(&self, question: &str) -> Result<Answer, OrchestratorError> {
        let mut conversation = Conversation::seeded(&self.settings.system_prompt, question);
        let conversation_id = conversation.id.to_string();
        let span = info_span!("answer", conversation_id = %conversation_id);
        let start = Instant::now();

        let result = self.answer_in(&mut conversation).instrument(span).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let kind = match &result {
            Ok(answer) => answer.kind(),
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "Answer step failed");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "answer".into(),
                    error_message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                AnswerKind::Failed
            }
        };

        info!(
            conversation_id = %conversation_id,
            kind = ?kind,
            duration_ms,
            messages = conversation.len(),
            "Answer produced"
        );
        self.event_bus.publish(DomainEvent::AnswerProduced {
            conversation_id,
            kind,
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        result
    }

    fn render(&self, answer: Answer) -> String {
        match answer {
            Answer::Direct(text) | Answer::ToolAugmented { text, .. } => text,
            Answer::RetriesExhausted => self.settings.error_message.clone(),
        }
    }

    async fn answer_in(
        &self,
        conversation: &mut Conversation,
    ) -> Result<Answer, OrchestratorError> {
        let role = self.settings.bind_tools_to;
        let model = self
            .models
            .get(role)
            .ok_or(OrchestratorError::NoModel(role))?
            .bind_tools(self.tools.definitions());

        debug!(
            model = %model.model_id(),
            provider = %model.provider_name(),
            role = %role,
            tools = model.bound_tools().len(),
            "Selected model"
        );

        let request = match self.first_reply(&model, conversation).await? {
            FirstReply::Text(text) => return Ok(Answer::Direct(text)),
            FirstReply::Malformed => return Ok(Answer::RetriesExhausted),
            FirstReply::ToolRequest(message) => message,
        };

        let Some(call) = request.tool_calls.first().cloned() else {
            return Ok(Answer::Direct(request.content));
        };
        if request.tool_calls.len() > 1 {
            warn!(
                requested = request.tool_calls.len(),
                executed = %call.name,
                "Model requested several tools; only the first is executed"
            );
        }

        let tool = self.resolve_tool(&call)?;
        let query = extract_query(&call)?;

        conversation.push(request);
        let result = self.execute_tool(tool.as_ref(), &query).await?;
        conversation.push(Message::tool_result(&call.id, result));

        let text = self.final_reply(&model, conversation).await?;
        Ok(Answer::ToolAugmented {
            text,
            tool_name: tool.name().to_string(),
        })
    }

    /// Invoke until the reply is plain text or a clean tool request. Leaked
    /// function-call text and provider failures both consume an attempt.
    async fn first_reply(
        &self,
        model: &ModelHandle,
        conversation: &Conversation,
    ) -> Result<FirstReply, OrchestratorError> {
        let attempts = self.settings.attempts();
        let mut last_error: Option<ProviderError> = None;

        for attempt in 1..=attempts {
            let message = match self.invoke(model, conversation, attempt).await {
                Ok(message) => message,
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Model invocation failed");
                    last_error = Some(e);
                    continue;
                }
            };
            last_error = None;

            if !message.has_tool_calls() {
                return Ok(FirstReply::Text(message.content));
            }
            if !looks_malformed(&message.content) {
                return Ok(FirstReply::ToolRequest(message));
            }
            warn!(attempt, attempts, "Reply contains leaked function-call text, retrying");
        }

        match last_error {
            Some(e) => Err(e.into()),
            None => Ok(FirstReply::Malformed),
        }
    }

    /// The follow-up invocation after the tool result. Only provider failures
    /// are retried; any further tool requests are not followed.
    async fn final_reply(
        &self,
        model: &ModelHandle,
        conversation: &Conversation,
    ) -> Result<String, OrchestratorError> {
        let attempts = self.settings.attempts();
        let mut attempt = 1;

        loop {
            match self.invoke(model, conversation, attempt).await {
                Ok(message) => {
                    if message.has_tool_calls() {
                        warn!(
                            requested = message.tool_calls.len(),
                            "Final reply requested more tools; returning its text"
                        );
                    }
                    return Ok(message.content);
                }
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "Final model invocation failed");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn invoke(
        &self,
        model: &ModelHandle,
        conversation: &Conversation,
        attempt: u32,
    ) -> Result<Message, ProviderError> {
        let timeout = self.settings.model_timeout;
        let message = tokio::time::timeout(timeout, model.invoke(&conversation.messages))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "{} did not respond within {timeout:?}",
                    model.model_id()
                ))
            })??;

        self.event_bus.publish(DomainEvent::ModelInvoked {
            conversation_id: conversation.id.to_string(),
            model: model.model_id().to_string(),
            attempt,
            tool_calls: message.tool_calls.len(),
            malformed: message.has_tool_calls() && looks_malformed(&message.content),
            timestamp: chrono::Utc::now(),
        });

        Ok(message)
    }

    fn resolve_tool(&self, call: &MessageToolCall) -> Result<Arc<dyn Tool>, OrchestratorError> {
        let tool = match self.settings.tool_dispatch {
            ToolDispatch::ByName => self.tools.get(&call.name),
            ToolDispatch::First => self.tools.first(),
        };
        tool.ok_or_else(|| ToolError::NotFound(call.name.clone()).into())
    }

    async fn execute_tool(
        &self,
        tool: &dyn Tool,
        query: &str,
    ) -> Result<String, OrchestratorError> {
        let timeout = self.settings.tool_timeout;
        let start = Instant::now();

        let result = match tokio::time::timeout(timeout, tool.invoke(query)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                tool_name: tool.name().to_string(),
                timeout,
            }),
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: tool.name().to_string(),
            success: result.is_ok(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        match result {
            Ok(output) => {
                debug!(tool = %tool.name(), duration_ms, "Tool executed");
                Ok(output.into_text())
            }
            Err(e) => {
                warn!(tool = %tool.name(), error = %e, "Tool execution failed");
                Err(e.into())
            }
        }
    }
}

/// Best-effort text of a panic payload.
fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for AnswerOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerOrchestrator")
            .field("models", &self.models)
            .field("tools", &self.tools.names())
            .field("settings", &self.settings)
            .finish()
    }
}
