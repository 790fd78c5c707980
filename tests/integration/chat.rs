//! Non-streaming chat against the mock server

use crate::mock_server::MockServerFixture;
use glm_cookbook::config::SettingsFile;
use glm_cookbook::{Error, Message, Settings};
use mockito::Matcher;
use serde_json::json;

const COMPLETION: &str = r#"{
    "id": "chatcmpl-1",
    "model": "glm-5",
    "choices": [{
        "index": 0,
        "finish_reason": "stop",
        "message": {"role": "assistant", "content": "Hello there!"}
    }],
    "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
}"#;

#[test]
fn missing_credential_fails_before_any_client_exists() {
    let err = Settings::from_lookup(|_| None, SettingsFile::default()).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("GLM_API_KEY"));
    assert!(err.to_string().contains(".env"));
}

#[tokio::test]
async fn send_posts_defaults_and_parses_the_completion() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture
        .server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "glm-5",
            "stream": false,
            "messages": [{"role": "user", "content": "Hi"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COMPLETION)
        .create_async()
        .await;

    let client = fixture.client(dir.path());
    let resp = client
        .chat()
        .message(Message::user("Hi"))
        .send()
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.content, "Hello there!");
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    assert_eq!(resp.usage.unwrap().total_tokens, 12);
    assert!(!resp.has_tool_calls());
}

#[tokio::test]
async fn provider_error_envelope_becomes_remote_error() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _mock = fixture
        .mock_error_response(
            "/chat/completions",
            401,
            r#"{"error":{"code":"1000","message":"Authentication failed"}}"#,
        )
        .await;

    let err = fixture
        .client(dir.path())
        .chat()
        .message(Message::user("Hi"))
        .send()
        .await
        .unwrap_err();

    match err {
        Error::Remote {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 401);
            assert_eq!(code.as_deref(), Some("1000"));
            assert_eq!(message, "Authentication failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_request_is_rejected_without_network() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let guard = fixture.mock_never_called("/chat/completions").await;

    let err = fixture
        .client(dir.path())
        .chat()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    guard.assert_async().await;
}
