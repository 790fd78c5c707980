use crate::pipeline::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "GLM_API_KEY", "request.messages")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, offending value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings", "chat_request", "multimodal")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the cookbook.
///
/// Every variant renders as a message a user can act on: recipes print it and exit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Sample asset not found: {}\n💡 Hint: {hint}", .path.display())]
    MissingAsset { path: PathBuf, hint: String },

    #[error("Unsupported input: {message}{}", format_context(.context))]
    UnsupportedInput {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Stream processing error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Remote error: HTTP {status}{}: {message}", .code.as_ref().map(|c| format!(" (code {})", c)).unwrap_or_default())]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn unsupported_input_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::UnsupportedInput {
            message: msg.into(),
            context,
        }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::runtime_with_context(msg, ErrorContext::new())
    }

    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Missing sample asset, pointing the user at the generation step.
    pub fn missing_asset(path: impl Into<PathBuf>) -> Self {
        Error::MissingAsset {
            path: path.into(),
            hint: "run `glm-cookbook samples` first to generate the sample images".to_string(),
        }
    }

    /// Build a remote error from a non-2xx body.
    ///
    /// The API answers with `{"error": {"code": "...", "message": "..."}}`; anything else is
    /// reported verbatim.
    pub fn from_remote_body(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let err_obj = parsed.as_ref().and_then(|v| v.get("error"));
        match err_obj {
            Some(obj) => Self::from_error_object(status, obj),
            None => Error::Remote {
                status,
                code: None,
                message: body.trim().to_string(),
            },
        }
    }

    /// Build a remote error from an `error` JSON object (HTTP body or in-stream frame).
    pub fn from_error_object(status: u16, obj: &serde_json::Value) -> Self {
        let code = obj.get("code").and_then(|c| match c {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let message = obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| obj.to_string());
        Error::Remote {
            status,
            code,
            message,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::UnsupportedInput { context, .. }
            | Error::Validation { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_body_with_error_object() {
        let body = r#"{"error":{"code":"1113","message":"Insufficient balance"}}"#;
        match Error::from_remote_body(429, body) {
            Error::Remote {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 429);
                assert_eq!(code.as_deref(), Some("1113"));
                assert_eq!(message, "Insufficient balance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn remote_body_plain_text() {
        let err = Error::from_remote_body(502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "Remote error: HTTP 502: Bad Gateway");
    }

    #[test]
    fn context_is_rendered() {
        let err = Error::configuration_with_context(
            "API key is missing",
            ErrorContext::new()
                .with_field_path("GLM_API_KEY")
                .with_source("settings"),
        );
        let msg = err.to_string();
        assert!(msg.contains("field: GLM_API_KEY"));
        assert!(msg.contains("source: settings"));
        assert_eq!(err.context().unwrap().source.as_deref(), Some("settings"));
    }

    #[test]
    fn missing_asset_mentions_samples_command() {
        let err = Error::missing_asset("images/object_detection.jpg");
        let msg = err.to_string();
        assert!(msg.contains("images/object_detection.jpg"));
        assert!(msg.contains("glm-cookbook samples"));
    }
}
