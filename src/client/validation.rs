//! Presence checks on an assembled chat request.

use crate::client::chat::ChatRequest;
use crate::types::message::MessageRole;
use crate::{Error, ErrorContext, Result};

fn invalid(msg: impl Into<String>, field: &str) -> Error {
    Error::validation_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("chat_request"),
    )
}

pub(crate) fn validate_chat_request(req: &ChatRequest) -> Result<()> {
    if req.model.trim().is_empty() {
        return Err(invalid("model must not be empty", "request.model"));
    }
    if req.messages.is_empty() {
        return Err(invalid(
            "at least one message is required",
            "request.messages",
        ));
    }
    if let Some(i) = req
        .messages
        .iter()
        .position(|m| m.role == MessageRole::Tool && m.tool_call_id.is_none())
    {
        return Err(invalid(
            "tool messages must reference a tool_call_id",
            &format!("request.messages[{i}].tool_call_id"),
        ));
    }
    if req.tool_stream.unwrap_or(false) && !req.stream {
        return Err(invalid(
            "tool_stream is only valid on streaming requests",
            "request.tool_stream",
        ));
    }
    if req.max_tokens == Some(0) {
        return Err(invalid("max_tokens must be positive", "request.max_tokens"));
    }
    Ok(())
}
