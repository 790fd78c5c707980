//! Streaming chat over SSE

use crate::mock_server::MockServerFixture;
use glm_cookbook::{Error, Message, StreamingEvent};

#[tokio::test]
async fn streamed_deltas_concatenate_to_the_final_content() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture
        .mock_sse_stream(
            "/chat/completions",
            &[
                r#"{"choices":[{"index":0,"delta":{"role":"assistant","reasoning_content":"User greets. "}}]}"#,
                r#"{"choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
                r#"{"choices":[{"index":0,"delta":{"content":"lo"}}]}"#,
                r#"{"choices":[{"index":0,"delta":{"content":", 世界"}}]}"#,
                r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":4,"total_tokens":9}}"#,
                "[DONE]",
            ],
        )
        .await;

    let mut seen = String::new();
    let mut thinking = String::new();
    let resp = fixture
        .client(dir.path())
        .chat()
        .message(Message::user("Hi"))
        .thinking(true)
        .stream_collect(|event| match event {
            StreamingEvent::ContentDelta { content } => seen.push_str(content),
            StreamingEvent::ThinkingDelta { thinking: t } => thinking.push_str(t),
            _ => {}
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(seen, "Hello, 世界");
    assert_eq!(resp.content, seen);
    assert_eq!(resp.reasoning_content, thinking);
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    assert_eq!(resp.usage.unwrap().completion_tokens, 4);
}

#[tokio::test]
async fn streamed_tool_call_fragments_are_assembled() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_sse_stream(
            "/chat/completions",
            &[
                r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_a","type":"function","function":{"name":"get_weather","arguments":""}}]}}]}"#,
                r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"city\":"}}]}}]}"#,
                r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"Paris\"}"}}]}}]}"#,
                r#"{"choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
                "[DONE]",
            ],
        )
        .await;

    let resp = fixture
        .client(dir.path())
        .chat()
        .message(Message::user("Weather in Paris?"))
        .tool_stream(true)
        .stream_collect(|_| {})
        .await
        .unwrap();

    assert_eq!(resp.tool_calls.len(), 1);
    let call = &resp.tool_calls[0];
    assert_eq!(call.id, "call_a");
    assert_eq!(call.name(), "get_weather");
    assert_eq!(
        call.parsed_arguments().unwrap(),
        serde_json::json!({"city": "Paris"})
    );
    assert_eq!(resp.finish_reason.as_deref(), Some("tool_calls"));
}

#[tokio::test]
async fn error_frame_aborts_the_stream() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_sse_stream(
            "/chat/completions",
            &[
                r#"{"choices":[{"index":0,"delta":{"content":"partial"}}]}"#,
                r#"{"error":{"code":"1301","message":"content filtered"}}"#,
                r#"{"choices":[{"index":0,"delta":{"content":" never seen"}}]}"#,
                "[DONE]",
            ],
        )
        .await;

    let mut seen = String::new();
    let err = fixture
        .client(dir.path())
        .chat()
        .message(Message::user("Hi"))
        .stream_collect(|event| {
            if let StreamingEvent::ContentDelta { content } = event {
                seen.push_str(content);
            }
        })
        .await
        .unwrap_err();

    assert_eq!(seen, "partial");
    assert!(
        matches!(err, Error::Remote { ref code, .. } if code.as_deref() == Some("1301")),
        "{err:?}"
    );
}
