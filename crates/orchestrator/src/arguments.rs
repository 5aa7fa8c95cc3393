//! Validation of the model's tool-call arguments.

use answerline_core::message::MessageToolCall;

use crate::error::OrchestratorError;

/// Pull the `query` string out of a tool call's JSON arguments.
///
/// The arguments must be a JSON object with a string `query` field.
pub fn extract_query(call: &MessageToolCall) -> Result<String, OrchestratorError> {
    let invalid = |reason: String| OrchestratorError::InvalidToolArguments {
        call_id: call.id.clone(),
        reason,
    };

    let raw = call.arguments.trim();
    if raw.is_empty() {
        return Err(invalid("arguments are empty, expected an object with 'query'".into()));
    }

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| invalid(format!("arguments are not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| invalid("arguments must be a JSON object".into()))?;

    match object.get("query") {
        Some(serde_json::Value::String(query)) => Ok(query.clone()),
        Some(other) => Err(invalid(format!("'query' must be a string, got {other}"))),
        None => Err(invalid("missing 'query' argument".into())),
    }
}
