//! Final (non-incremental) results

use crate::types::message::{Message, MessageContent, MessageRole};
use crate::types::tool::ToolCall;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Chat result, either parsed from one JSON body or folded from a stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub reasoning_content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Parse a non-streaming `chat/completions` body.
    pub fn from_completion(body: &serde_json::Value) -> Result<Self> {
        let message = body.pointer("/choices/0/message").ok_or_else(|| {
            Error::runtime(format!(
                "completion response has no choices[0].message: {}",
                body
            ))
        })?;

        let tool_calls = match message.get("tool_calls") {
            Some(v) if !v.is_null() => serde_json::from_value(v.clone())?,
            _ => Vec::new(),
        };
        let usage = match body.get("usage") {
            Some(u) if !u.is_null() => Some(serde_json::from_value(u.clone())?),
            _ => None,
        };

        Ok(Self {
            content: message
                .get("content")
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string(),
            reasoning_content: message
                .get("reasoning_content")
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string(),
            tool_calls,
            finish_reason: body
                .pointer("/choices/0/finish_reason")
                .and_then(|v| v.as_str())
                .map(String::from),
            usage,
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Assistant message to append to the conversation history.
    pub fn to_assistant_message(&self) -> Message {
        let content = if self.content.is_empty() && self.has_tool_calls() {
            None
        } else {
            Some(MessageContent::Text(self.content.clone()))
        };
        Message {
            role: MessageRole::Assistant,
            content,
            reasoning_content: (!self.reasoning_content.is_empty())
                .then(|| self.reasoning_content.clone()),
            tool_calls: self.has_tool_calls().then(|| self.tool_calls.clone()),
            tool_call_id: None,
        }
    }
}
