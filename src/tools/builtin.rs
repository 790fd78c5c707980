use super::{
    calculator, parse_args, LocalTool, ToolError, COMMAND_TIMEOUT_SECS, MAX_FILE_SIZE,
    MAX_OUTPUT_SIZE,
};
use crate::structured::json_schema_from_type;
use chrono::{Datelike, Local};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `~` expansion plus an absolute path, without requiring the path to exist.
fn resolve(path: &str) -> Result<PathBuf, ToolError> {
    let expanded = match path.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(path),
        },
        None if path == "~" => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    };
    if expanded.is_absolute() {
        return Ok(expanded);
    }
    Ok(std::env::current_dir()?.join(expanded))
}

fn display(p: &Path) -> String {
    p.display().to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadFileArgs {
    /// Absolute or relative file path
    pub path: String,
}

pub struct ReadFile;

#[async_trait::async_trait]
impl LocalTool for ReadFile {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read a file from the local filesystem. Returns file content as text."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<ReadFileArgs>()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: ReadFileArgs = parse_args(args)?;
        let p = resolve(&args.path)?;
        let meta = match tokio::fs::metadata(&p).await {
            Ok(m) => m,
            Err(_) => return Err(ToolError::Failed(format!("File not found: {}", display(&p)))),
        };
        if !meta.is_file() {
            return Err(ToolError::Failed(format!("Not a file: {}", display(&p))));
        }
        if meta.len() > MAX_FILE_SIZE {
            return Err(ToolError::Failed(format!(
                "File too large ({} bytes, max {})",
                meta.len(),
                MAX_FILE_SIZE
            )));
        }
        let bytes = tokio::fs::read(&p).await?;
        let content = String::from_utf8(bytes).map_err(|_| {
            ToolError::Failed(format!("Binary file, cannot read as text: {}", display(&p)))
        })?;
        Ok(json!({
            "path": display(&p),
            "size": content.chars().count(),
            "content": content,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileArgs {
    /// File path to write to
    pub path: String,
    /// Content to write
    pub content: String,
}

pub struct WriteFile;

#[async_trait::async_trait]
impl LocalTool for WriteFile {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<WriteFileArgs>()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: WriteFileArgs = parse_args(args)?;
        let p = resolve(&args.path)?;
        let existed = tokio::fs::try_exists(&p).await.unwrap_or(false);
        if let Some(parent) = p.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&p, args.content.as_bytes()).await?;
        Ok(json!({
            "path": display(&p),
            "status": if existed { "overwritten" } else { "created" },
            "size": args.content.chars().count(),
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListDirectoryArgs {
    /// Directory path (default: current directory)
    #[serde(default)]
    pub path: Option<String>,
}

pub struct ListDirectory;

#[async_trait::async_trait]
impl LocalTool for ListDirectory {
    fn name(&self) -> &'static str {
        "list_directory"
    }

    fn description(&self) -> &'static str {
        "List files and subdirectories in a directory with sizes."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<ListDirectoryArgs>()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: ListDirectoryArgs = parse_args(args)?;
        let p = resolve(args.path.as_deref().unwrap_or("."))?;
        if !p.exists() {
            return Err(ToolError::Failed(format!(
                "Directory not found: {}",
                display(&p)
            )));
        }
        if !p.is_dir() {
            return Err(ToolError::Failed(format!("Not a directory: {}", display(&p))));
        }

        let mut items = Vec::new();
        let mut dir = tokio::fs::read_dir(&p).await?;
        while let Some(entry) = dir.next_entry().await? {
            items.push(entry);
        }
        items.sort_by_key(|e| e.file_name());

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let meta = item.metadata().await?;
            let name = item.file_name().to_string_lossy().into_owned();
            if meta.is_dir() {
                entries.push(json!({"name": name, "type": "dir"}));
            } else {
                entries.push(json!({"name": name, "type": "file", "size": meta.len()}));
            }
        }
        Ok(json!({
            "path": display(&p),
            "count": entries.len(),
            "entries": entries,
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunCommandArgs {
    /// Shell command to execute
    pub command: String,
}

pub struct RunCommand;

fn truncate_output(raw: &[u8]) -> (String, bool) {
    let text = String::from_utf8_lossy(raw);
    if text.len() <= MAX_OUTPUT_SIZE {
        return (text.into_owned(), false);
    }
    let mut cut = MAX_OUTPUT_SIZE;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    (text[..cut].to_string(), true)
}

#[async_trait::async_trait]
impl LocalTool for RunCommand {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Run a shell command and return stdout/stderr. 30s timeout, 10KB output limit."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<RunCommandArgs>()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: RunCommandArgs = parse_args(args)?;
        let mut cmd = if cfg!(windows) {
            let mut c = tokio::process::Command::new("cmd");
            c.arg("/C").arg(&args.command);
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.arg("-c").arg(&args.command);
            c
        };
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(
            Duration::from_secs(COMMAND_TIMEOUT_SECS),
            cmd.output(),
        )
        .await
        {
            Ok(out) => out?,
            Err(_) => {
                return Ok(json!({
                    "error": format!("Command timed out after {}s", COMMAND_TIMEOUT_SECS),
                    "command": args.command,
                }))
            }
        };

        let (stdout, out_cut) = truncate_output(&output.stdout);
        let (stderr, err_cut) = truncate_output(&output.stderr);
        let mut resp = json!({
            "command": args.command,
            "returncode": output.status.code().unwrap_or(-1),
            "stdout": stdout,
        });
        if !stderr.is_empty() {
            resp["stderr"] = json!(stderr);
        }
        if out_cut || err_cut {
            resp["truncated"] = json!(true);
        }
        Ok(resp)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculateArgs {
    /// Math expression, e.g. 'sqrt(16) + 5 * 2'
    pub expression: String,
}

pub struct Calculate;

#[async_trait::async_trait]
impl LocalTool for Calculate {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn description(&self) -> &'static str {
        "Evaluate a math expression. Supports +, -, *, /, **, % and functions: sin, cos, tan, \
         sqrt, log, exp, abs, floor, ceil, round. Constants: pi, e."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<CalculateArgs>()
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args: CalculateArgs = parse_args(args)?;
        let result = calculator::evaluate(&args.expression).map_err(ToolError::Failed)?;
        Ok(json!({
            "expression": args.expression,
            "result": calculator::to_json_number(result),
        }))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDatetimeArgs {}

pub struct GetDatetime;

#[async_trait::async_trait]
impl LocalTool for GetDatetime {
    fn name(&self) -> &'static str {
        "get_datetime"
    }

    fn description(&self) -> &'static str {
        "Get current date, time, day of week, and week number."
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<GetDatetimeArgs>()
    }

    async fn call(&self, _args: Value) -> Result<Value, ToolError> {
        let now = Local::now();
        Ok(json!({
            "datetime": now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            "date": now.format("%Y-%m-%d").to_string(),
            "time": now.format("%H:%M:%S").to_string(),
            "day_of_week": now.format("%A").to_string(),
            "week_number": now.iso_week().week(),
            "timezone": now.format("%:z").to_string(),
        }))
    }
}
