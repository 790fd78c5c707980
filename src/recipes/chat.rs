//! Text-only chat recipes.

use super::{echo, print_usage, RecipeContext};
use crate::structured::extract_json;
use crate::types::message::Message;
use crate::Result;

const TEMPERATURES: [f64; 3] = [0.1, 0.7, 1.0];

const TRANSLATION_SOURCE: &str = "Rust's ownership model lets the compiler rule out data races \
    and use-after-free bugs before the program ever runs.";

const TRANSLATION_TARGETS: [&str; 3] = ["Chinese", "French", "Japanese"];

pub(super) async fn basic_chat(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let resp = ctx
        .client
        .chat()
        .message(Message::system("You are a helpful assistant."))
        .message(Message::user(
            "Explain what a large language model is in three sentences.",
        ))
        .send()
        .await?;
    writeln!(ctx.out, "{}", resp.content)?;
    print_usage(ctx.out, &resp)
}

pub(super) async fn streaming_chat(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let client = ctx.client;
    let resp = client
        .chat()
        .message(Message::user(
            "Write a short poem about the sea, four lines at most.",
        ))
        .stream_collect(echo(ctx.out, false))
        .await?;
    writeln!(ctx.out)?;
    print_usage(ctx.out, &resp)
}

pub(super) async fn multi_turn(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let turns = [
        "My name is Lin and I am learning Rust.",
        "Suggest one small project for me to practise with.",
        "What was my name, and what am I learning?",
    ];
    let mut messages = vec![Message::system(
        "You are a friendly tutor. Keep every answer under 60 words.",
    )];
    for turn in turns {
        writeln!(ctx.out, "\nUser: {turn}")?;
        messages.push(Message::user(turn));
        let resp = ctx
            .client
            .chat()
            .messages(messages.clone())
            .send()
            .await?;
        writeln!(ctx.out, "Assistant: {}", resp.content)?;
        messages.push(resp.to_assistant_message());
    }
    Ok(())
}

pub(super) async fn thinking_mode(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let client = ctx.client;
    let resp = client
        .chat()
        .message(Message::user(
            "A bat and a ball cost 1.10 in total. The bat costs 1.00 more than the ball. \
             How much does the ball cost?",
        ))
        .thinking(true)
        .stream_collect(echo(ctx.out, true))
        .await?;
    writeln!(ctx.out)?;
    if resp.reasoning_content.is_empty() {
        writeln!(ctx.out, "(no reasoning returned)")?;
    } else {
        writeln!(
            ctx.out,
            "[reasoning: {} chars]",
            resp.reasoning_content.chars().count()
        )?;
    }
    print_usage(ctx.out, &resp)
}

pub(super) async fn temperature_comparison(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let prompt = "Invent a name for a coffee shop run by robots. Reply with the name only.";
    for temperature in TEMPERATURES {
        let resp = ctx
            .client
            .chat()
            .message(Message::user(prompt))
            .temperature(temperature)
            .max_tokens(64)
            .send()
            .await?;
        writeln!(ctx.out, "temperature={temperature:.1}: {}", resp.content.trim())?;
    }
    Ok(())
}

pub(super) async fn json_output(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let resp = ctx
        .client
        .chat()
        .message(Message::system(
            "Extract entities from the user's text. Answer with a JSON object with the keys \
             \"people\", \"places\" and \"dates\", each an array of strings.",
        ))
        .message(Message::user(
            "Ada Lovelace met Charles Babbage in London on 5 June 1833.",
        ))
        .json_output()
        .send()
        .await?;
    let value = extract_json(&resp.content)?;
    writeln!(ctx.out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(())
}

pub(super) async fn code_generation(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let client = ctx.client;
    client
        .chat()
        .message(Message::system(
            "You are an expert Rust programmer. Answer with one code block followed by a \
             two-sentence explanation.",
        ))
        .message(Message::user(
            "Write a function that returns the n-th Fibonacci number using iteration, with \
             a unit test.",
        ))
        .temperature(0.2)
        .stream_collect(echo(ctx.out, false))
        .await?;
    writeln!(ctx.out)?;
    Ok(())
}

pub(super) async fn translation(ctx: &mut RecipeContext<'_>) -> Result<()> {
    writeln!(ctx.out, "Source: {TRANSLATION_SOURCE}")?;
    for language in TRANSLATION_TARGETS {
        let resp = ctx
            .client
            .chat()
            .message(Message::system(format!(
                "You are a professional translator. Translate the user's text into {language}. \
                 Reply with the translation only."
            )))
            .message(Message::user(TRANSLATION_SOURCE))
            .temperature(0.3)
            .send()
            .await?;
        writeln!(ctx.out, "{language}: {}", resp.content.trim())?;
    }
    Ok(())
}
