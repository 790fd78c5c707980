//! # glm-cookbook
//!
//! Example drivers ("recipes") for a hosted GLM-style LLM API: chat, streaming,
//! thinking mode, JSON output, vision, image and video generation, speech to
//! text, function calling and a local tool-using agent.
//!
//! ## Overview
//!
//! Every recipe follows the same shape: build a request, call the endpoint,
//! print the result. The library underneath keeps those steps small:
//!
//! - **Configuration**: [`Settings::load`] reads the API key and endpoint from
//!   the environment (and `.env`), with model names from `glm-cookbook.yaml`.
//! - **Request construction**: [`GlmClient::chat`] returns a builder that fills
//!   in configured defaults and validates the request before any I/O.
//! - **Streaming**: SSE chunks are decoded into [`StreamingEvent`]s; folding
//!   the events gives the same [`ChatResponse`] a non-streaming call returns.
//! - **Tools**: local file, shell, calculator and clock tools plus an
//!   [`agent::Agent`] loop that executes tool calls until the model answers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glm_cookbook::{GlmClient, Message};
//!
//! #[tokio::main]
//! async fn main() -> glm_cookbook::Result<()> {
//!     let client = GlmClient::builder().build()?;
//!
//!     let resp = client
//!         .chat()
//!         .message(Message::user("Hello, how are you?"))
//!         .stream_collect(|event| {
//!             if let glm_cookbook::StreamingEvent::ContentDelta { content } = event {
//!                 print!("{content}");
//!             }
//!         })
//!         .await?;
//!     println!("\n{:?}", resp.usage);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Settings from environment, `.env` and YAML |
//! | [`client`] | Client, chat request builder and validation |
//! | [`pipeline`] | SSE decoding, chunk mapping and accumulation |
//! | [`types`] | Messages, tools, streaming events and responses |
//! | [`multimodal`] | Image / video / audio references |
//! | [`images`], [`video`], [`stt`] | Generation and transcription endpoints |
//! | [`tools`], [`agent`] | Local tools and the tool-calling loop |
//! | [`recipes`] | The 22 example drivers |

pub mod agent;
pub mod client;
pub mod config;
pub mod images;
pub mod multimodal;
pub mod pipeline;
pub mod recipes;
pub mod samples;
pub mod structured;
pub mod stt;
pub mod tools;
pub mod transport;
pub mod types;
pub mod utils;
pub mod video;

pub use client::{GlmClient, GlmClientBuilder};
pub use config::Settings;
pub use types::{
    events::StreamingEvent,
    message::{Message, MessageRole},
    response::ChatResponse,
    tool::ToolCall,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
