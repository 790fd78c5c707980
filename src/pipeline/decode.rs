//! Streaming decoder (Bytes -> JSON Value)
//!
//! Server-sent events framing:
//! - frames end at a blank line (`\n\n`, CRLF tolerated)
//! - `data:` lines of one frame are joined with `\n`
//! - `:` comments and `event:` / `id:` / `retry:` fields are ignored
//! - the stream ends at the `[DONE]` marker, or at EOF

use crate::pipeline::{Decoder, PipelineError};
use crate::{BoxStream, PipeResult};
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::trace;

pub const DEFAULT_DONE_SIGNAL: &str = "[DONE]";

/// Result of parsing one raw frame.
#[derive(Debug, PartialEq)]
enum Frame {
    Data(String),
    Done,
    Empty,
}

pub struct SseDecoder {
    done_signal: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            done_signal: DEFAULT_DONE_SIGNAL.to_string(),
        }
    }

    pub fn with_done_signal(done_signal: impl Into<String>) -> Self {
        Self {
            done_signal: done_signal.into(),
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_frame(raw: &str, done_signal: &str) -> Frame {
    let mut data_lines: Vec<&str> = Vec::new();
    // Only `data:` carries payload; comments, other fields and unknown lines are dropped.
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    if data_lines.is_empty() {
        return Frame::Empty;
    }
    let payload = data_lines.join("\n");
    if payload.trim() == done_signal {
        Frame::Done
    } else {
        Frame::Data(payload)
    }
}

fn to_json(payload: &str) -> PipeResult<Value> {
    serde_json::from_str(payload.trim()).map_err(|e| {
        crate::Error::Pipeline(PipelineError::Decoder(format!(
            "event data is not valid JSON ({}): {}",
            e,
            truncate(payload, 200)
        )))
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn take_frame(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let idx = buf.windows(2).position(|w| w == b"\n\n")?;
    let frame = buf[..idx].to_vec();
    buf.drain(..idx + 2);
    Some(frame)
}

#[async_trait::async_trait]
impl Decoder for SseDecoder {
    async fn decode_stream(
        &self,
        input: BoxStream<'static, Bytes>,
    ) -> PipeResult<BoxStream<'static, Value>> {
        let done_signal = self.done_signal.clone();

        // Raw bytes are buffered (not strings) so a UTF-8 sequence split across
        // network chunks is only decoded once the whole frame has arrived.
        let stream = stream::unfold(
            (Some(input), Vec::<u8>::new()),
            move |(mut input, mut buf)| {
                let done_signal = done_signal.clone();
                async move {
                    loop {
                        if let Some(raw) = take_frame(&mut buf) {
                            let text = String::from_utf8_lossy(&raw);
                            match parse_frame(&text, &done_signal) {
                                Frame::Done => {
                                    trace!("end-of-stream marker received");
                                    return None;
                                }
                                Frame::Empty => continue,
                                Frame::Data(payload) => {
                                    return Some((to_json(&payload), (input, buf)));
                                }
                            }
                        }

                        let Some(src) = input.as_mut() else {
                            return None;
                        };
                        match src.next().await {
                            Some(Ok(bytes)) => {
                                // SSE payloads are JSON, where a raw CR can never appear.
                                buf.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
                            }
                            Some(Err(e)) => return Some((Err(e), (input, buf))),
                            None => {
                                // EOF: parse the trailing partial frame once.
                                input = None;
                                let rest = std::mem::take(&mut buf);
                                let text = String::from_utf8_lossy(&rest);
                                return match parse_frame(&text, &done_signal) {
                                    Frame::Data(payload) => {
                                        Some((to_json(&payload), (input, buf)))
                                    }
                                    Frame::Done | Frame::Empty => None,
                                };
                            }
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}
