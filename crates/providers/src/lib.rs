//! Chat-completion provider implementations for answerline.
//!
//! All providers implement the `answerline_core::Provider` trait.
//! The router turns configured models into `ModelHandle`s.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, RouterError, build_from_config, build_model_handles};
