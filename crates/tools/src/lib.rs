//! Tool adapters for answerline.
//!
//! answerline does not implement tools itself. Each configured tool is an
//! external HTTP endpoint wrapped in an [`HttpTool`].

pub mod http_tool;

use std::sync::Arc;

use answerline_config::ToolConfig;
use answerline_core::tool::ToolRegistry;

pub use http_tool::HttpTool;

/// Build a registry from configured tools, keeping configuration order.
pub fn registry_from_config(tools: &[ToolConfig]) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for cfg in tools {
        registry.register(Arc::new(HttpTool::from_config(cfg)));
    }
    registry
}
