//! Streaming response pipeline.
//!
//! ```text
//! Raw Bytes → Decoder → Event Mapper → StreamingEvent → Accumulator
//!     │          │            │                              │
//!   HTTP     SSE frames   content / thinking /          ChatResponse
//!            → JSON       tool-call / usage events
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE framing, `[DONE]` handling, JSON decoding |
//! | [`event_map`] | Chat and transcription chunks to [`StreamingEvent`]s |
//! | [`accumulate`] | Folding events back into a [`ChatResponse`](crate::types::ChatResponse) |
//!
//! Every endpoint of the API streams the same SSE dialect, so a single
//! [`Pipeline::sse`] serves chat completions and transcription alike.

pub mod accumulate;
pub mod decode;
pub mod event_map;


use crate::types::events::StreamingEvent;
use crate::{BoxStream, PipeResult};

pub use accumulate::{collect_stream, ChatAccumulator};
pub use decode::SseDecoder;
pub use event_map::{map_chunk, ChunkEventMapper};

/// Specialized mapper for the final stage of the pipeline
#[async_trait::async_trait]
pub trait Mapper: Send + Sync {
    /// A mapper takes a stream of JSON values and returns a stream of unified events
    async fn map(
        &self,
        input: BoxStream<'static, serde_json::Value>,
    ) -> PipeResult<BoxStream<'static, StreamingEvent>>;
}

/// Decoder trait for stream decoding
#[async_trait::async_trait]
pub trait Decoder: Send + Sync {
    /// Decode a byte stream into JSON values
    async fn decode_stream(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
    ) -> PipeResult<BoxStream<'static, serde_json::Value>>;
}

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Missing required field: {name}{}", .hint.as_ref().map(|h| format!("\n💡 Hint: {}", h)).unwrap_or_default())]
    MissingField { name: String, hint: Option<String> },
}

impl PipelineError {
    pub fn missing_field(name: impl Into<String>) -> Self {
        PipelineError::MissingField {
            name: name.into(),
            hint: None,
        }
    }

    /// Attach an actionable hint to the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        if let PipelineError::MissingField { hint: ref mut slot, .. } = self {
            *slot = Some(hint.into());
        }
        self
    }
}

/// Pipeline that processes streaming responses
pub struct Pipeline {
    decoder: Box<dyn Decoder>,
    mapper: Box<dyn Mapper>,
}

impl Pipeline {
    /// SSE decoding plus chunk mapping, shared by all streaming endpoints.
    pub fn sse() -> Self {
        Self {
            decoder: Box::new(SseDecoder::new()),
            mapper: Box::new(ChunkEventMapper),
        }
    }

    /// Process a byte stream through the pipeline
    pub async fn process_stream(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
    ) -> PipeResult<BoxStream<'static, StreamingEvent>> {
        let values = self.decoder.decode_stream(input).await?;
        self.mapper.map(values).await
    }
}
