//! # answerline core
//!
//! Domain types, capability traits, and error definitions for the answerline
//! orchestrator. This crate has no HTTP or framework dependencies; it defines
//! the model every other crate implements against.
//!
//! ## Layout
//!
//! - [`provider`]: the `Provider` trait (a chat-completion backend)
//! - [`model`]: `ModelHandle`, a provider + model id + role, with tool binding
//! - [`tool`]: the `Tool` trait and an ordered `ToolRegistry`
//! - [`message`]: `Message`, `Role`, `Conversation`
//! - [`event`]: the injected `EventBus` for domain events

pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use event::{AnswerKind, DomainEvent, EventBus};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use model::{ModelHandle, ModelRole};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolDispatch, ToolOutput, ToolRegistry};
