//! Shared test helpers: scripted providers and tools.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use answerline_core::error::{ProviderError, ToolError};
use answerline_core::message::{Message, MessageToolCall};
use answerline_core::model::ModelHandle;
use answerline_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use answerline_core::tool::{Tool, ToolOutput};

/// One scripted provider reaction.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(Message),
    Fail(ProviderError),
    /// Never completes; only useful under a timeout.
    Hang,
    /// Panics inside `complete` with the given message.
    Panic(&'static str),
}

/// A mock provider that plays back a script of steps.
///
/// Each call to `complete` consumes the next step and records the request.
/// Panics if more calls are made than steps provided.
pub struct SequentialMockProvider {
    name: String,
    steps: Mutex<Vec<Step>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self::named("sequential_mock", steps)
    }

    pub fn named(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps: Mutex::new(steps),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        let step = {
            let mut requests = self.requests.lock().unwrap();
            let steps = self.steps.lock().unwrap();
            let index = requests.len();
            requests.push(request);
            match steps.get(index) {
                Some(step) => step.clone(),
                None => panic!(
                    "SequentialMockProvider: no more steps (call #{}, have {})",
                    index,
                    steps.len()
                ),
            }
        };

        match step {
            Step::Reply(message) => Ok(ProviderResponse {
                message,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
                model,
            }),
            Step::Fail(error) => Err(error),
            Step::Hang => std::future::pending().await,
            Step::Panic(message) => panic!("{message}"),
        }
    }
}

/// Build a handle over a scripted provider, returning both.
pub fn scripted_model(model: &str, steps: Vec<Step>) -> (ModelHandle, Arc<SequentialMockProvider>) {
    let provider = Arc::new(SequentialMockProvider::new(steps));
    (ModelHandle::new(provider.clone(), model), provider)
}

/// A plain text reply with no tool calls.
pub fn text(content: &str) -> Step {
    Step::Reply(Message::assistant(content))
}

/// A reply requesting the given tool calls, with optional leaked content.
pub fn tool_calls(content: &str, calls: Vec<MessageToolCall>) -> Step {
    let mut message = Message::assistant(content);
    message.tool_calls = calls;
    Step::Reply(message)
}

/// A tool call whose arguments are `{"query": query}`.
pub fn make_tool_call(id: &str, name: &str, query: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::json!({ "query": query }).to_string(),
    }
}

/// A tool that returns a fixed output and remembers every query.
pub struct CountingTool {
    name: String,
    output: ToolOutput,
    queries: Mutex<Vec<String>>,
}

impl CountingTool {
    pub fn new(name: &str, output: impl Into<ToolOutput>) -> Self {
        Self {
            name: name.to_string(),
            output: output.into(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a canned answer"
    }

    async fn invoke(&self, query: &str) -> Result<ToolOutput, ToolError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.output.clone())
    }
}

/// A tool that always fails.
pub struct FailingTool {
    pub name: String,
    pub calls: AtomicUsize,
}

impl FailingTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn invoke(&self, _query: &str) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason: "upstream returned 503".into(),
        })
    }
}

/// A tool that never returns.
pub struct HangingTool {
    pub name: String,
}

#[async_trait::async_trait]
impl Tool for HangingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Never answers"
    }

    async fn invoke(&self, _query: &str) -> Result<ToolOutput, ToolError> {
        std::future::pending().await
    }
}

/// A tool that panics when invoked.
pub struct PanickingTool {
    pub name: String,
}

#[async_trait::async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Panics"
    }

    async fn invoke(&self, query: &str) -> Result<ToolOutput, ToolError> {
        panic!("index out of range for query {query:?}")
    }
}
