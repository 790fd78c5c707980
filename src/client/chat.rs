use crate::pipeline::collect_stream;
use crate::types::events::StreamingEvent;
use crate::types::message::Message;
use crate::types::response::ChatResponse;
use crate::types::tool::Tool;
use crate::{BoxStream, Result};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::core::GlmClient;

/// Stream of events from one streaming call.
pub type ChatStream = BoxStream<'static, StreamingEvent>;

/// `thinking` request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thinking {
    #[serde(rename = "type")]
    pub kind: ThinkingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingKind {
    Enabled,
    Disabled,
}

/// `response_format` request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            kind: "json_object".to_string(),
        }
    }
}

/// Body of `POST chat/completions`. Absent options are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Thinking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub request_id: String,
}

/// Builder for chat requests.
pub struct ChatRequestBuilder<'a> {
    pub(crate) client: &'a GlmClient,
    pub(crate) model: Option<String>,
    pub(crate) messages: Vec<Message>,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_tokens: Option<u32>,
    pub(crate) streaming: bool,
    pub(crate) tools: Option<Vec<Tool>>,
    pub(crate) tool_choice: Option<serde_json::Value>,
    pub(crate) tool_stream: bool,
    pub(crate) thinking: Option<bool>,
    pub(crate) json_output: bool,
    pub(crate) request_id: Option<String>,
}

impl<'a> ChatRequestBuilder<'a> {
    pub(crate) fn new(client: &'a GlmClient) -> Self {
        Self {
            client,
            model: None,
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            streaming: false,
            tools: None,
            tool_choice: None,
            tool_stream: false,
            thinking: None,
            json_output: false,
            request_id: None,
        }
    }

    /// Override the configured chat model (e.g. the vision model).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Replace the conversation.
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Append one message.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Mark the request as streaming. `stream()` and `stream_collect()` set this.
    pub fn streaming(mut self, on: bool) -> Self {
        self.streaming = on;
        self
    }

    /// Set tools for function calling.
    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn tool_choice(mut self, tool_choice: serde_json::Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    /// Stream tool-call arguments incrementally. Only valid on streaming requests.
    pub fn tool_stream(mut self, on: bool) -> Self {
        self.tool_stream = on;
        self
    }

    /// Enable or disable thinking mode. Left unset, the server default applies.
    pub fn thinking(mut self, on: bool) -> Self {
        self.thinking = Some(on);
        self
    }

    /// Ask for a JSON object answer.
    pub fn json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Assemble the request body. Pure: no network access.
    pub fn build(&self) -> Result<ChatRequest> {
        let settings = self.client.settings();
        let request = ChatRequest {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| settings.models.llm.clone()),
            messages: self.messages.clone(),
            stream: self.streaming,
            temperature: Some(self.temperature.unwrap_or(settings.defaults.temperature)),
            max_tokens: Some(self.max_tokens.unwrap_or(settings.defaults.max_tokens)),
            tools: self.tools.clone().filter(|t| !t.is_empty()),
            tool_choice: self.tool_choice.clone(),
            tool_stream: self.tool_stream.then_some(true),
            thinking: self.thinking.map(|on| Thinking {
                kind: if on {
                    ThinkingKind::Enabled
                } else {
                    ThinkingKind::Disabled
                },
            }),
            response_format: self.json_output.then(ResponseFormat::json_object),
            request_id: self
                .request_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        };
        super::validation::validate_chat_request(&request)?;
        Ok(request)
    }

    /// Execute the request and wait for the complete answer.
    pub async fn send(self) -> Result<ChatResponse> {
        let this = self.streaming(false);
        let request = this.build()?;
        let client = this.client;
        info!(
            model = %request.model,
            request_id = %request.request_id,
            messages = request.messages.len(),
            "chat completion"
        );
        let body = serde_json::to_value(&request)?;
        let value = client
            .transport
            .post_json("chat/completions", &body)
            .await?;
        let resp = ChatResponse::from_completion(&value)?;
        debug!(finish_reason = ?resp.finish_reason, usage = ?resp.usage, "chat completion done");
        Ok(resp)
    }

    /// Execute the request and return a stream of events.
    pub async fn stream(self) -> Result<ChatStream> {
        let this = self.streaming(true);
        let request = this.build()?;
        let client = this.client;
        info!(
            model = %request.model,
            request_id = %request.request_id,
            messages = request.messages.len(),
            "streaming chat completion"
        );
        let body = serde_json::to_value(&request)?;
        let bytes = client
            .transport
            .post_stream("chat/completions", &body)
            .await?;
        client.pipeline.process_stream(bytes).await
    }

    /// Stream, hand every event to `on_event`, and return the folded result.
    pub async fn stream_collect<F>(self, on_event: F) -> Result<ChatResponse>
    where
        F: FnMut(&StreamingEvent),
    {
        let events = self.stream().await?;
        collect_stream(events, on_event).await
    }
}
