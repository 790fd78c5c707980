//! Folding streamed events back into one [`ChatResponse`].

use crate::types::events::StreamingEvent;
use crate::types::response::{ChatResponse, Usage};
use crate::utils::ToolCallAssembler;
use crate::{BoxStream, Result};
use futures::StreamExt;

/// Accumulates streamed events; the final text equals the concatenation of the
/// deltas in arrival order.
#[derive(Debug, Default)]
pub struct ChatAccumulator {
    content: String,
    reasoning: String,
    tools: ToolCallAssembler,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

impl ChatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &StreamingEvent) {
        match event {
            StreamingEvent::ContentDelta { content } => self.content.push_str(content),
            StreamingEvent::TranscriptDelta { text } => self.content.push_str(text),
            StreamingEvent::ThinkingDelta { thinking } => self.reasoning.push_str(thinking),
            StreamingEvent::ToolCallDelta {
                index,
                id,
                name,
                arguments,
            } => self
                .tools
                .on_delta(*index, id.as_deref(), name.as_deref(), arguments),
            StreamingEvent::Usage { usage } => self.usage = Some(*usage),
            StreamingEvent::Finished { finish_reason } => {
                self.finish_reason = Some(finish_reason.clone())
            }
        }
    }

    /// Text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn finish(self) -> ChatResponse {
        ChatResponse {
            content: self.content,
            reasoning_content: self.reasoning,
            tool_calls: self.tools.finalize(),
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}

/// Drain an event stream, handing each event to `on_event` as it arrives.
///
/// The first stream error aborts collection; text already passed to
/// `on_event` stays printed but no response is returned.
pub async fn collect_stream<F>(
    mut events: BoxStream<'static, StreamingEvent>,
    mut on_event: F,
) -> Result<ChatResponse>
where
    F: FnMut(&StreamingEvent),
{
    let mut acc = ChatAccumulator::new();
    while let Some(event) = events.next().await {
        let event = event?;
        on_event(&event);
        acc.push(&event);
    }
    Ok(acc.finish())
}
