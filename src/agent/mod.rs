//! Streaming tool-calling agent over the local tools.
//!
//! One user turn is a loop of streamed completions: while the model answers
//! with tool calls, they are executed locally (in index order), their results
//! appended as `tool` messages, and the conversation is sent again.

mod console;

pub use console::ConsoleObserver;

use crate::client::GlmClient;
use crate::tools::ToolRegistry;
use crate::types::events::StreamingEvent;
use crate::types::message::Message;
use crate::types::response::ChatResponse;
use crate::types::tool::ToolCall;
use crate::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are a local AI assistant with access to the user's file system and shell.\n\
You can read/write files, list directories, run commands, do calculations, and check the time.\n\
Think step by step for complex tasks. Use tools when needed; don't guess file contents or command output.\n\
Be concise. When showing file contents, summarize unless the user asks for the full output.";

pub const DEMO_QUERIES: [&str; 3] = [
    "What files are in the current directory? Summarize the project structure.",
    "Read the Cargo.toml file and tell me which crates the project depends on.",
    "What's the current date and time? Calculate how many days until the end of the year.",
];

/// Hooks for echoing agent progress. All methods default to no-ops.
pub trait AgentObserver {
    fn on_thinking(&mut self, _delta: &str) {}

    fn on_content(&mut self, _delta: &str) {}

    /// One streamed completion finished.
    fn on_stream_end(&mut self, _response: &ChatResponse) {}

    /// About to run `call`; `args` is `None` when the argument text is not valid JSON.
    fn on_tool_call(&mut self, _call: &ToolCall, _args: Option<&Value>) {}

    fn on_tool_result(&mut self, _call: &ToolCall, _result: &Value) {}

    fn on_max_iterations(&mut self, _limit: usize) {}
}

pub struct NoopObserver;

impl AgentObserver for NoopObserver {}

/// Fresh conversation: the system prompt plus optional first user message.
pub fn new_conversation(query: Option<&str>) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];
    if let Some(q) = query {
        messages.push(Message::user(q));
    }
    messages
}

pub struct Agent {
    client: GlmClient,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl Agent {
    pub fn new(client: GlmClient) -> Self {
        Self {
            client,
            tools: ToolRegistry::with_defaults(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one user turn to a final answer.
    ///
    /// `messages` must already end with the user message; assistant and tool
    /// messages are appended in place.
    pub async fn run_turn(
        &self,
        messages: &mut Vec<Message>,
        observer: &mut dyn AgentObserver,
    ) -> Result<String> {
        for iteration in 1..=self.max_iterations {
            debug!(iteration, history = messages.len(), "agent iteration");
            if let Some(answer) = self.stream_turn(messages, observer).await? {
                return Ok(answer);
            }
        }
        warn!(limit = self.max_iterations, "agent reached max iterations");
        observer.on_max_iterations(self.max_iterations);
        Ok(messages
            .last()
            .and_then(|m| m.text())
            .unwrap_or_default()
            .to_string())
    }

    /// One streamed completion. Returns the answer, or `None` when tools ran
    /// and another round is needed.
    pub async fn stream_turn(
        &self,
        messages: &mut Vec<Message>,
        observer: &mut dyn AgentObserver,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .chat()
            .messages(messages.clone())
            .tools(self.tools.definitions())
            .tool_stream(true)
            .thinking(true)
            .stream_collect(|event| match event {
                StreamingEvent::ThinkingDelta { thinking } => observer.on_thinking(thinking),
                StreamingEvent::ContentDelta { content } => observer.on_content(content),
                _ => {}
            })
            .await?;
        observer.on_stream_end(&response);

        messages.push(response.to_assistant_message());

        if !response.has_tool_calls() {
            return Ok(Some(response.content));
        }

        info!(count = response.tool_calls.len(), "executing tool calls");
        for call in &response.tool_calls {
            let args = call.parsed_arguments().ok();
            observer.on_tool_call(call, args.as_ref());
            let result = self.tools.execute(call).await;
            observer.on_tool_result(call, &result);
            messages.push(Message::tool(call.id.clone(), result.to_string()));
        }
        Ok(None)
    }
}
