//! Detection of function-call syntax leaked into plain text.
//!
//! Some models (notably tool-use fine-tunes served through Groq) sometimes
//! write their tool invocation as text such as `<function=brave_search>{...}`
//! instead of, or next to, the structured `tool_calls` field.

const LEADING_MARKER: &str = "<function";
const EMBEDDED_MARKERS: [&str; 2] = ["function>", "<brave_search"];

/// True when `content` carries leaked function-call markup.
pub fn looks_malformed(content: &str) -> bool {
    content.starts_with(LEADING_MARKER) || EMBEDDED_MARKERS.iter().any(|m| content.contains(m))
}
