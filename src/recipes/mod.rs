//! The 22 example drivers.
//!
//! Each recipe is a linear build → call → print sequence against one
//! capability. Output goes to the writer in [`RecipeContext`] so the binary
//! can use stdout and tests can capture it.

mod audio;
mod chat;
mod generation;
mod tooling;
mod vision;

use crate::client::GlmClient;
use crate::samples::SampleAssets;
use crate::types::events::StreamingEvent;
use crate::types::response::ChatResponse;
use crate::{Error, ErrorContext, Result};
use std::fmt;
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipe {
    BasicChat,
    StreamingChat,
    MultiTurn,
    ThinkingMode,
    TemperatureComparison,
    JsonOutput,
    ImageUnderstanding,
    MultiImage,
    ObjectDetection,
    VideoUnderstanding,
    ImageGeneration,
    VideoGeneration,
    AudioTranscription,
    StreamingTranscription,
    FunctionCalling,
    StreamingToolCalls,
    MultiFunctionAgent,
    WebSearch,
    LocalAgent,
    CodeGeneration,
    Translation,
    GenerateSamples,
}

impl Recipe {
    /// Menu order; position + 1 is the selection number.
    pub const ALL: [Recipe; 22] = [
        Recipe::BasicChat,
        Recipe::StreamingChat,
        Recipe::MultiTurn,
        Recipe::ThinkingMode,
        Recipe::TemperatureComparison,
        Recipe::JsonOutput,
        Recipe::ImageUnderstanding,
        Recipe::MultiImage,
        Recipe::ObjectDetection,
        Recipe::VideoUnderstanding,
        Recipe::ImageGeneration,
        Recipe::VideoGeneration,
        Recipe::AudioTranscription,
        Recipe::StreamingTranscription,
        Recipe::FunctionCalling,
        Recipe::StreamingToolCalls,
        Recipe::MultiFunctionAgent,
        Recipe::WebSearch,
        Recipe::LocalAgent,
        Recipe::CodeGeneration,
        Recipe::Translation,
        Recipe::GenerateSamples,
    ];

    pub fn number(self) -> u8 {
        Self::ALL
            .iter()
            .position(|r| *r == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1..=22 => Some(Self::ALL[(n - 1) as usize]),
            _ => None,
        }
    }

    /// Menu input → recipe. Only whole numbers 1–22 are accepted.
    pub fn parse_selection(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = || {
            Error::validation_with_context(
                format!("invalid selection '{trimmed}': enter a number from 1 to 22"),
                ErrorContext::new().with_source("menu"),
            )
        };
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(invalid)
    }

    pub fn title(self) -> &'static str {
        match self {
            Recipe::BasicChat => "Basic chat",
            Recipe::StreamingChat => "Streaming chat",
            Recipe::MultiTurn => "Multi-turn conversation",
            Recipe::ThinkingMode => "Thinking mode",
            Recipe::TemperatureComparison => "Temperature comparison",
            Recipe::JsonOutput => "JSON output",
            Recipe::ImageUnderstanding => "Image understanding",
            Recipe::MultiImage => "Multi-image comparison",
            Recipe::ObjectDetection => "Object detection",
            Recipe::VideoUnderstanding => "Video understanding",
            Recipe::ImageGeneration => "Image generation",
            Recipe::VideoGeneration => "Video generation",
            Recipe::AudioTranscription => "Audio transcription",
            Recipe::StreamingTranscription => "Streaming transcription",
            Recipe::FunctionCalling => "Function calling",
            Recipe::StreamingToolCalls => "Streaming tool calls",
            Recipe::MultiFunctionAgent => "Multi-function agent",
            Recipe::WebSearch => "Web search",
            Recipe::LocalAgent => "Local agent",
            Recipe::CodeGeneration => "Code generation",
            Recipe::Translation => "Translation",
            Recipe::GenerateSamples => "Generate sample images",
        }
    }

    pub fn category(self) -> &'static str {
        match self.number() {
            1..=6 => "Chat",
            7..=10 => "Vision",
            11..=12 => "Generation",
            13..=14 => "Audio",
            15..=19 => "Tools & agents",
            20..=21 => "Applications",
            _ => "Setup",
        }
    }

    /// Whether `-u` changes what the recipe does.
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            Recipe::ImageUnderstanding
                | Recipe::MultiImage
                | Recipe::ObjectDetection
                | Recipe::VideoUnderstanding
                | Recipe::VideoGeneration
                | Recipe::AudioTranscription
                | Recipe::StreamingTranscription
                | Recipe::LocalAgent
        )
    }

    pub async fn run(self, ctx: &mut RecipeContext<'_>) -> Result<()> {
        info!(recipe = self.number(), title = self.title(), "running recipe");
        writeln!(ctx.out, "=== {}. {} ===", self.number(), self.title())?;
        match self {
            Recipe::BasicChat => chat::basic_chat(ctx).await,
            Recipe::StreamingChat => chat::streaming_chat(ctx).await,
            Recipe::MultiTurn => chat::multi_turn(ctx).await,
            Recipe::ThinkingMode => chat::thinking_mode(ctx).await,
            Recipe::TemperatureComparison => chat::temperature_comparison(ctx).await,
            Recipe::JsonOutput => chat::json_output(ctx).await,
            Recipe::ImageUnderstanding => vision::image_understanding(ctx).await,
            Recipe::MultiImage => vision::multi_image(ctx).await,
            Recipe::ObjectDetection => vision::object_detection(ctx).await,
            Recipe::VideoUnderstanding => vision::video_understanding(ctx).await,
            Recipe::ImageGeneration => generation::image_generation(ctx).await,
            Recipe::VideoGeneration => generation::video_generation(ctx).await,
            Recipe::AudioTranscription => audio::transcription(ctx).await,
            Recipe::StreamingTranscription => audio::streaming_transcription(ctx).await,
            Recipe::FunctionCalling => tooling::function_calling(ctx).await,
            Recipe::StreamingToolCalls => tooling::streaming_tool_calls(ctx).await,
            Recipe::MultiFunctionAgent => tooling::multi_function_agent(ctx).await,
            Recipe::WebSearch => tooling::web_search(ctx).await,
            Recipe::LocalAgent => tooling::local_agent(ctx).await,
            Recipe::CodeGeneration => chat::code_generation(ctx).await,
            Recipe::Translation => chat::translation(ctx).await,
            Recipe::GenerateSamples => generation::generate_samples(ctx).await,
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}. {}", self.number(), self.title())
    }
}

/// Menu text grouped by category.
pub fn menu_text() -> String {
    let mut text = String::new();
    let mut current = "";
    for recipe in Recipe::ALL {
        if recipe.category() != current {
            current = recipe.category();
            text.push_str(&format!("\n[{current}]\n"));
        }
        text.push_str(&format!("  {recipe}\n"));
    }
    text
}

#[derive(Debug, Clone, Default)]
pub struct RecipeOptions {
    /// `-u`: image / video / audio reference, or the agent query.
    pub input: Option<String>,
    pub show_thinking: bool,
}

pub struct RecipeContext<'a> {
    pub client: &'a GlmClient,
    pub assets: SampleAssets,
    pub options: RecipeOptions,
    pub out: &'a mut dyn Write,
}

impl<'a> RecipeContext<'a> {
    pub fn new(client: &'a GlmClient, options: RecipeOptions, out: &'a mut dyn Write) -> Self {
        Self {
            assets: SampleAssets::new(client.settings().samples_dir.clone()),
            client,
            options,
            out,
        }
    }

    pub fn with_assets(mut self, assets: SampleAssets) -> Self {
        self.assets = assets;
        self
    }

    pub(crate) fn input(&self) -> Option<&str> {
        self.options
            .input
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Echo content (and optionally reasoning) deltas as they arrive.
pub(crate) fn echo<'w>(
    out: &'w mut dyn Write,
    show_thinking: bool,
) -> impl FnMut(&StreamingEvent) + 'w {
    let mut in_thinking = false;
    move |event| {
        let _ = match event {
            StreamingEvent::ThinkingDelta { thinking } if show_thinking => {
                if !in_thinking {
                    in_thinking = true;
                    let _ = write!(out, "[thinking] ");
                }
                write!(out, "{thinking}")
            }
            StreamingEvent::ContentDelta { content } => {
                if in_thinking {
                    in_thinking = false;
                    let _ = write!(out, "\n\n");
                }
                write!(out, "{content}")
            }
            StreamingEvent::TranscriptDelta { text } => write!(out, "{text}"),
            _ => Ok(()),
        };
        let _ = out.flush();
    }
}

pub(crate) fn print_usage(out: &mut dyn Write, resp: &ChatResponse) -> Result<()> {
    if let Some(u) = resp.usage {
        writeln!(
            out,
            "[tokens] prompt={} completion={} total={}",
            u.prompt_tokens, u.completion_tokens, u.total_tokens
        )?;
    }
    Ok(())
}
