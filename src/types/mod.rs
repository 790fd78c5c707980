//! Core wire types shared by every capability.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role, content and optional tool-call fields |
//! | [`ContentPart`] | Text / image / video part of a multimodal message |
//! | [`Tool`] | Function or web-search tool offered to the model |
//! | [`ToolCall`] | Tool invocation produced by the model |
//! | [`StreamingEvent`] | One decoded streaming chunk |
//! | [`ChatResponse`] | Final chat result |
//!
//! ```rust
//! use glm_cookbook::types::{ContentPart, Message};
//!
//! let system = Message::system("You are a helpful assistant");
//! let look = Message::user_parts(vec![
//!     ContentPart::image_url("https://example.com/cat.jpg"),
//!     ContentPart::text("What animal is this?"),
//! ]);
//! assert!(look.contains_image());
//! # let _ = system;
//! ```

pub mod events;
pub mod message;
pub mod response;
pub mod tool;

pub use events::StreamingEvent;
pub use message::{ContentPart, MediaUrl, Message, MessageContent, MessageRole};
pub use response::{ChatResponse, Usage};
pub use tool::{FunctionCall, FunctionDefinition, Tool, ToolCall, WebSearchOptions};
