use super::AgentObserver;
use crate::types::response::ChatResponse;
use crate::types::tool::ToolCall;
use serde_json::Value;
use std::io::Write;

const RESULT_PREVIEW_CHARS: usize = 200;

/// Prints agent progress to a terminal-like writer.
pub struct ConsoleObserver<'w> {
    out: &'w mut dyn Write,
    show_thinking: bool,
    in_thinking: bool,
    wrote_content: bool,
}

impl<'w> ConsoleObserver<'w> {
    pub fn new(out: &'w mut dyn Write, show_thinking: bool) -> Self {
        Self {
            out,
            show_thinking,
            in_thinking: false,
            wrote_content: false,
        }
    }
}

fn preview(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= RESULT_PREVIEW_CHARS {
        return text;
    }
    let cut: String = text.chars().take(RESULT_PREVIEW_CHARS).collect();
    format!("{cut}...")
}

// Write errors on the console are not worth failing a turn over.
impl AgentObserver for ConsoleObserver<'_> {
    fn on_thinking(&mut self, delta: &str) {
        if !self.show_thinking {
            return;
        }
        if !self.in_thinking {
            self.in_thinking = true;
            let _ = write!(self.out, "[thinking] ");
        }
        let _ = write!(self.out, "{delta}");
        let _ = self.out.flush();
    }

    fn on_content(&mut self, delta: &str) {
        if self.in_thinking {
            self.in_thinking = false;
            let _ = writeln!(self.out);
        }
        self.wrote_content = true;
        let _ = write!(self.out, "{delta}");
        let _ = self.out.flush();
    }

    fn on_stream_end(&mut self, _response: &ChatResponse) {
        if self.in_thinking || self.wrote_content {
            let _ = writeln!(self.out);
        }
        self.in_thinking = false;
        self.wrote_content = false;
    }

    fn on_tool_call(&mut self, call: &ToolCall, args: Option<&Value>) {
        let shown = match args {
            Some(v) => v.to_string(),
            None => call.arguments().to_string(),
        };
        let _ = writeln!(self.out, "-> {}({shown})", call.name());
    }

    fn on_tool_result(&mut self, _call: &ToolCall, result: &Value) {
        let marker = if crate::tools::is_error(result) { "!!" } else { "<-" };
        let _ = writeln!(self.out, "   {marker} {}", preview(result));
    }

    fn on_max_iterations(&mut self, limit: usize) {
        let _ = writeln!(self.out, "(stopped after {limit} tool rounds)");
    }
}
