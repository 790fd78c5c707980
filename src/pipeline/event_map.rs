//! Event mapping (JSON Value -> StreamingEvent)
//!
//! Handles the two chunk shapes the API streams:
//! - chat completion chunks: `choices[0].delta.{reasoning_content, content, tool_calls}`
//! - transcription chunks: `{"type": "transcript.text.delta", "delta": "..."}`

use crate::pipeline::{Mapper, PipelineError};
use crate::types::events::StreamingEvent;
use crate::types::response::Usage;
use crate::{BoxStream, Error, PipeResult};
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::debug;

/// Map one decoded chunk to its events, in the order they should be applied.
pub fn map_chunk(frame: &Value) -> PipeResult<Vec<StreamingEvent>> {
    if let Some(err) = frame.get("error").filter(|e| e.is_object()) {
        return Err(Error::from_error_object(200, err));
    }

    let mut events = Vec::new();

    if let Some(kind) = frame.get("type").and_then(|t| t.as_str()) {
        match kind {
            "transcript.text.delta" => {
                if let Some(text) = frame.get("delta").and_then(|d| d.as_str()) {
                    if !text.is_empty() {
                        events.push(StreamingEvent::TranscriptDelta {
                            text: text.to_string(),
                        });
                    }
                }
            }
            "transcript.text.done" => {
                push_usage(frame, &mut events);
                events.push(StreamingEvent::Finished {
                    finish_reason: "stop".to_string(),
                });
            }
            other => debug!(event_type = other, "ignoring chunk type"),
        }
        return Ok(events);
    }

    if let Some(choice) = frame.pointer("/choices/0") {
        if let Some(delta) = choice.get("delta") {
            if let Some(thinking) = non_empty_str(delta, "reasoning_content") {
                events.push(StreamingEvent::ThinkingDelta { thinking });
            }
            if let Some(content) = non_empty_str(delta, "content") {
                events.push(StreamingEvent::ContentDelta { content });
            }
            if let Some(calls) = delta.get("tool_calls").and_then(|t| t.as_array()) {
                for (pos, tc) in calls.iter().enumerate() {
                    let raw = tc.get("index").and_then(|i| i.as_u64()).unwrap_or(pos as u64);
                    let index = u32::try_from(raw).map_err(|_| {
                        Error::Pipeline(PipelineError::Decoder(format!(
                            "tool call index {raw} out of range"
                        )))
                    })?;
                    let function = tc.get("function");
                    events.push(StreamingEvent::ToolCallDelta {
                        index,
                        id: non_empty_str(tc, "id"),
                        name: function.and_then(|f| non_empty_str(f, "name")),
                        arguments: function
                            .and_then(|f| f.get("arguments"))
                            .and_then(|a| a.as_str())
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
            }
        }
        push_usage(frame, &mut events);
        if let Some(reason) = choice.get("finish_reason").and_then(|r| r.as_str()) {
            events.push(StreamingEvent::Finished {
                finish_reason: reason.to_string(),
            });
        }
        return Ok(events);
    }

    // Usage-only trailer chunk (empty `choices`).
    push_usage(frame, &mut events);
    Ok(events)
}

fn non_empty_str(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn push_usage(frame: &Value, events: &mut Vec<StreamingEvent>) {
    if let Some(u) = frame.get("usage").filter(|u| u.is_object()) {
        match serde_json::from_value::<Usage>(u.clone()) {
            Ok(usage) => events.push(StreamingEvent::Usage { usage }),
            Err(e) => debug!(error = %e, "ignoring malformed usage block"),
        }
    }
}

/// Mapper for every streaming endpoint of the API.
pub struct ChunkEventMapper;

#[async_trait::async_trait]
impl Mapper for ChunkEventMapper {
    async fn map(
        &self,
        input: BoxStream<'static, Value>,
    ) -> PipeResult<BoxStream<'static, StreamingEvent>> {
        let mapped = input.flat_map(|item| {
            let events: Vec<PipeResult<StreamingEvent>> = match item.and_then(|v| map_chunk(&v)) {
                Ok(events) => events.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(events)
        });
        Ok(Box::pin(mapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_and_reasoning_delta() {
        let events = map_chunk(&json!({
            "choices": [{"index": 0, "delta": {"role": "assistant", "reasoning_content": "hmm", "content": "Hi"}}]
        }))
        .unwrap();
        assert_eq!(
            events,
            vec![
                StreamingEvent::ThinkingDelta { thinking: "hmm".into() },
                StreamingEvent::ContentDelta { content: "Hi".into() },
            ]
        );
    }

    #[test]
    fn empty_and_null_content_is_skipped() {
        let events = map_chunk(&json!({
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]
        }))
        .unwrap();
        assert!(events.is_empty());
        let events = map_chunk(&json!({
            "choices": [{"index": 0, "delta": {"content": null}}]
        }))
        .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn oversized_tool_call_index_is_rejected() {
        let frame = json!({
            "choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 4_294_967_296u64, "function": {"arguments": "{}"}}
            ]}}]
        });
        assert!(matches!(
            map_chunk(&frame),
            Err(Error::Pipeline(PipelineError::Decoder(_)))
        ));
    }

    #[test]
    fn tool_call_fragments_keep_index() {
        let events = map_chunk(&json!({
            "choices": [{"index": 0, "delta": {"tool_calls": [
                {"index": 1, "id": "call_b", "type": "function", "function": {"name": "get_datetime", "arguments": ""}},
                {"index": 0, "function": {"arguments": "{\"x\""}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(
            events,
            vec![
                StreamingEvent::ToolCallDelta {
                    index: 1,
                    id: Some("call_b".into()),
                    name: Some("get_datetime".into()),
                    arguments: String::new(),
                },
                StreamingEvent::ToolCallDelta {
                    index: 0,
                    id: None,
                    name: None,
                    arguments: "{\"x\"".into(),
                },
            ]
        );
    }

    #[test]
    fn finish_reason_comes_after_usage() {
        let events = map_chunk(&json!({
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        }))
        .unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StreamingEvent::Usage { usage } if usage.total_tokens == 7));
        assert_eq!(
            events[1],
            StreamingEvent::Finished { finish_reason: "stop".into() }
        );
    }

    #[test]
    fn transcription_chunks() {
        let events = map_chunk(&json!({"type": "transcript.text.delta", "delta": "你好"})).unwrap();
        assert_eq!(events, vec![StreamingEvent::TranscriptDelta { text: "你好".into() }]);
        let events = map_chunk(&json!({"type": "transcript.text.done", "text": "你好"})).unwrap();
        assert_eq!(
            events,
            vec![StreamingEvent::Finished { finish_reason: "stop".into() }]
        );
    }

    #[test]
    fn in_stream_error_frame() {
        let err = map_chunk(&json!({"error": {"code": "1301", "message": "unsafe content"}}))
            .unwrap_err();
        match err {
            Error::Remote { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("1301"));
                assert_eq!(message, "unsafe content");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
