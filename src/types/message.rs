//! Chat message wire format

use crate::types::tool::ToolCall;
use serde::{Deserialize, Serialize};

/// One entry of the `messages` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    /// Serialized as `null` for assistant turns that only carry tool calls.
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn bare(role: MessageRole, content: Option<MessageContent>) -> Self {
        Self {
            role,
            content,
            reasoning_content: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::bare(MessageRole::System, Some(MessageContent::Text(text.into())))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::bare(MessageRole::User, Some(MessageContent::Text(text.into())))
    }

    /// User turn with mixed text / image / video parts.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::bare(MessageRole::User, Some(MessageContent::Parts(parts)))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::bare(
            MessageRole::Assistant,
            Some(MessageContent::Text(text.into())),
        )
    }

    /// Result of a tool invocation, linked to the call by id.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut m = Self::bare(MessageRole::Tool, Some(MessageContent::Text(content.into())));
        m.tool_call_id = Some(tool_call_id.into());
        m
    }

    /// Plain text of this message, if it has any.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Parts(parts)) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            None => None,
        }
    }

    pub fn contains_image(&self) -> bool {
        matches!(&self.content, Some(MessageContent::Parts(ps)) if ps.iter().any(|p| matches!(p, ContentPart::ImageUrl { .. })))
    }

    pub fn contains_video(&self) -> bool {
        matches!(&self.content, Some(MessageContent::Parts(ps)) if ps.iter().any(|p| matches!(p, ContentPart::VideoUrl { .. })))
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content (plain string or array of typed parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal user turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: MediaUrl },
    VideoUrl { video_url: MediaUrl },
}

/// `{"url": "..."}` wrapper; the url is either public http(s) or a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUrl {
    pub url: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: MediaUrl { url: url.into() },
        }
    }

    pub fn video_url(url: impl Into<String>) -> Self {
        ContentPart::VideoUrl {
            video_url: MediaUrl { url: url.into() },
        }
    }
}
