//! Streaming events decoded from server-sent chunks

use crate::types::response::Usage;
use serde::{Deserialize, Serialize};

/// One incremental unit of a streamed response, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum StreamingEvent {
    /// Partial answer text
    ContentDelta { content: String },

    /// Partial reasoning text (thinking mode)
    ThinkingDelta { thinking: String },

    /// Fragment of a tool call. The first fragment for an index usually carries
    /// `id` and `name`; later ones only carry more `arguments` text.
    ToolCallDelta {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        arguments: String,
    },

    /// Partial transcription text
    TranscriptDelta { text: String },

    /// Token usage, usually on the last chunk
    Usage { usage: Usage },

    /// The choice finished (`stop`, `tool_calls`, `length`, ...)
    Finished { finish_reason: String },
}
