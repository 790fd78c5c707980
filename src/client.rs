//! Client for the GLM open platform.
//!
//! Keep the public surface small: one [`GlmClient`] owning settings and
//! transport, a chat request builder, and one method per capability
//! (see `images`, `video` and `stt` for the non-chat endpoints).

pub mod builder;
pub mod chat;
pub mod core;
mod validation;

pub use builder::GlmClientBuilder;
pub use chat::{ChatRequest, ChatRequestBuilder, ChatStream, ResponseFormat, Thinking};
pub use core::GlmClient;
