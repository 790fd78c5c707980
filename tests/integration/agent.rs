//! Agent tool loop against streamed completions

use crate::mock_server::MockServerFixture;
use glm_cookbook::agent::{new_conversation, Agent, AgentObserver};
use glm_cookbook::{MessageRole, ToolCall};
use serde_json::Value;

#[derive(Default)]
struct Recorder {
    calls: Vec<(String, Option<Value>)>,
    results: Vec<Value>,
    content: String,
    limit_hit: Option<usize>,
}

impl AgentObserver for Recorder {
    fn on_content(&mut self, delta: &str) {
        self.content.push_str(delta);
    }

    fn on_tool_call(&mut self, call: &ToolCall, args: Option<&Value>) {
        self.calls.push((call.name().to_string(), args.cloned()));
    }

    fn on_tool_result(&mut self, _call: &ToolCall, result: &Value) {
        self.results.push(result.clone());
    }

    fn on_max_iterations(&mut self, limit: usize) {
        self.limit_hit = Some(limit);
    }
}

const CALCULATE_CALL: &[&str] = &[
    r#"{"choices":[{"index":0,"delta":{"reasoning_content":"Need maths."}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_calc","type":"function","function":{"name":"calculate","arguments":"{\"expression\":"}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"6*7\"}"}}]}}]}"#,
    r#"{"choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
    "[DONE]",
];

#[tokio::test]
async fn tool_results_are_fed_back_until_the_model_answers() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let first = fixture
        .mock_sse_stream("/chat/completions", CALCULATE_CALL)
        .await;
    let body = [
        r#"{"choices":[{"index":0,"delta":{"content":"The answer is 42."}}]}"#,
        r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        "[DONE]",
    ]
    .iter()
    .map(|c| format!("data: {c}\n\n"))
    .collect::<String>();
    let second = fixture
        .server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::Regex(r#""role":"tool""#.to_string()))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let agent = Agent::new(fixture.client(dir.path()));
    let mut messages = new_conversation(Some("What is 6 times 7?"));
    let mut recorder = Recorder::default();
    let answer = agent.run_turn(&mut messages, &mut recorder).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(answer, "The answer is 42.");
    assert_eq!(recorder.content, answer);
    assert_eq!(recorder.calls.len(), 1);
    assert_eq!(recorder.calls[0].0, "calculate");
    assert_eq!(recorder.results[0]["result"], 42);

    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant,
        ]
    );
    assert_eq!(messages[3].tool_call_id.as_deref(), Some("call_calc"));
    assert_eq!(messages[2].reasoning_content.as_deref(), Some("Need maths."));
}

#[tokio::test]
async fn loop_stops_at_the_iteration_limit() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let looping = fixture
        .server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(
            CALCULATE_CALL
                .iter()
                .map(|c| format!("data: {c}\n\n"))
                .collect::<String>(),
        )
        .expect(2)
        .create_async()
        .await;

    let agent = Agent::new(fixture.client(dir.path())).max_iterations(2);
    let mut messages = new_conversation(Some("loop forever"));
    let mut recorder = Recorder::default();
    agent.run_turn(&mut messages, &mut recorder).await.unwrap();

    looping.assert_async().await;
    assert_eq!(recorder.limit_hit, Some(2));
    assert_eq!(recorder.calls.len(), 2);
}
