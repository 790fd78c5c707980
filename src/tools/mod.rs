//! Local tools the agent can call.
//!
//! | Tool | Description |
//! |------|-------------|
//! | `read_file` | UTF-8 text files up to 100 KiB |
//! | `write_file` | Create or overwrite a file, creating parent directories |
//! | `list_directory` | Sorted entries with type and size |
//! | `run_command` | Shell command, 30 s timeout, output capped at 10 KiB |
//! | `calculate` | Arithmetic with common math functions |
//! | `get_datetime` | Local date, time, weekday and ISO week |
//!
//! Tool failures never abort the agent: they come back to the model as
//! `{"error": "..."}` tool results.

mod builtin;
pub mod calculator;

pub use builtin::{Calculate, GetDatetime, ListDirectory, ReadFile, RunCommand, WriteFile};

use crate::structured::SchemaValidator;
use crate::types::tool::{Tool, ToolCall};
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const MAX_FILE_SIZE: u64 = 100 * 1024;
pub const MAX_OUTPUT_SIZE: usize = 10 * 1024;
pub const COMMAND_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown function: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        ToolError::Failed(e.to_string())
    }
}

/// A function the model may call, executed on this machine.
#[async_trait::async_trait]
pub trait LocalTool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn call(&self, args: Value) -> Result<Value, ToolError>;
}

pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

struct Registered {
    tool: Box<dyn LocalTool>,
    validator: Option<SchemaValidator>,
}

/// Tools offered to the model, with their compiled argument schemas.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Registered>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six built-in local tools.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(ReadFile)
            .register(WriteFile)
            .register(ListDirectory)
            .register(RunCommand)
            .register(Calculate)
            .register(GetDatetime)
    }

    pub fn register(mut self, tool: impl LocalTool + 'static) -> Self {
        let validator = match SchemaValidator::compile(&tool.parameters()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(tool = tool.name(), error = %e, "argument schema rejected; skipping validation");
                None
            }
        };
        self.tools.push(Registered {
            tool: Box::new(tool),
            validator,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|r| r.tool.name()).collect()
    }

    /// `tools` array for the request.
    pub fn definitions(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|r| Tool::function(r.tool.name(), r.tool.description(), r.tool.parameters()))
            .collect()
    }

    /// Run one call; problems are folded into an `{"error": ...}` result.
    pub async fn execute(&self, call: &ToolCall) -> Value {
        match self.try_execute(call).await {
            Ok(v) => v,
            Err(e) => {
                debug!(tool = call.name(), error = %e, "tool call failed");
                json!({ "error": e.to_string() })
            }
        }
    }

    async fn try_execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let entry = self
            .tools
            .iter()
            .find(|r| r.tool.name() == call.name())
            .ok_or_else(|| ToolError::UnknownTool(call.name().to_string()))?;
        let args = call
            .parsed_arguments()
            .map_err(|e| ToolError::InvalidJson(e.to_string()))?;
        if let Some(validator) = &entry.validator {
            validator
                .validate(&args)
                .map_err(ToolError::InvalidArguments)?;
        }
        debug!(tool = call.name(), "running tool");
        entry.tool.call(args).await
    }
}

/// Whether a tool result reports a failure.
pub fn is_error(result: &Value) -> bool {
    result.get("error").is_some()
}
