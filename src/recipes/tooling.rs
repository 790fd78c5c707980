//! Function calling, web search and agent recipes.

use super::{echo, RecipeContext};
use crate::agent::{new_conversation, Agent, ConsoleObserver, DEMO_QUERIES};
use crate::structured::json_schema_from_type;
use crate::tools::{parse_args, Calculate, GetDatetime, LocalTool, ToolError, ToolRegistry};
use crate::types::events::StreamingEvent;
use crate::types::message::Message;
use crate::types::tool::Tool;
use crate::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

const CONDITIONS: [&str; 5] = ["sunny", "cloudy", "light rain", "windy", "overcast"];

#[derive(Debug, Deserialize, JsonSchema)]
struct WeatherArgs {
    /// City name, e.g. "Beijing"
    city: String,
    /// "celsius" (default) or "fahrenheit"
    #[serde(default)]
    unit: Option<String>,
}

/// Canned weather lookup; the same city always gets the same answer.
pub struct WeatherTool;

impl WeatherTool {
    fn report(city: &str, unit: Option<&str>) -> Value {
        let seed: u32 = city.to_lowercase().bytes().map(u32::from).sum();
        let celsius = 5 + (seed % 25) as i64;
        let condition = CONDITIONS[(seed % CONDITIONS.len() as u32) as usize];
        let (temperature, unit) = match unit {
            Some(u) if u.eq_ignore_ascii_case("fahrenheit") => (celsius * 9 / 5 + 32, "fahrenheit"),
            _ => (celsius, "celsius"),
        };
        json!({
            "city": city,
            "temperature": temperature,
            "unit": unit,
            "condition": condition,
        })
    }
}

#[async_trait::async_trait]
impl LocalTool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Get the current weather for a city"
    }

    fn parameters(&self) -> Value {
        json_schema_from_type::<WeatherArgs>()
    }

    async fn call(&self, args: Value) -> std::result::Result<Value, ToolError> {
        let args: WeatherArgs = parse_args(args)?;
        if args.city.trim().is_empty() {
            return Err(ToolError::InvalidArguments("city must not be empty".into()));
        }
        Ok(Self::report(args.city.trim(), args.unit.as_deref()))
    }
}

fn weather_registry() -> ToolRegistry {
    ToolRegistry::new().register(WeatherTool)
}

pub(super) async fn function_calling(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let tools = weather_registry();
    let mut messages = vec![Message::user("What's the weather like in Beijing today?")];

    let first = ctx
        .client
        .chat()
        .messages(messages.clone())
        .tools(tools.definitions())
        .send()
        .await?;
    if !first.has_tool_calls() {
        writeln!(ctx.out, "Model answered without calling a tool:\n{}", first.content)?;
        return Ok(());
    }

    messages.push(first.to_assistant_message());
    for call in &first.tool_calls {
        writeln!(ctx.out, "Tool call: {}({})", call.name(), call.arguments())?;
        let result = tools.execute(call).await;
        writeln!(ctx.out, "Result:    {result}")?;
        messages.push(Message::tool(call.id.clone(), result.to_string()));
    }

    let answer = ctx
        .client
        .chat()
        .messages(messages)
        .tools(tools.definitions())
        .send()
        .await?;
    writeln!(ctx.out, "\n{}", answer.content)?;
    Ok(())
}

pub(super) async fn streaming_tool_calls(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let tools = weather_registry();
    let mut messages = vec![Message::user(
        "Compare the weather in Shanghai and Shenzhen right now.",
    )];

    let client = ctx.client;
    let out = &mut *ctx.out;
    let first = client
        .chat()
        .messages(messages.clone())
        .tools(tools.definitions())
        .tool_stream(true)
        .stream_collect(|event| {
            let _ = match event {
                StreamingEvent::ContentDelta { content } => write!(out, "{content}"),
                StreamingEvent::ToolCallDelta {
                    index,
                    name: Some(name),
                    arguments,
                    ..
                } => write!(out, "\n[call #{index}] {name} {arguments}"),
                StreamingEvent::ToolCallDelta { arguments, .. } => write!(out, "{arguments}"),
                _ => Ok(()),
            };
            let _ = out.flush();
        })
        .await?;
    writeln!(ctx.out)?;

    if !first.has_tool_calls() {
        return Ok(());
    }
    writeln!(ctx.out, "\nAssembled {} tool call(s):", first.tool_calls.len())?;
    messages.push(first.to_assistant_message());
    for call in &first.tool_calls {
        let result = tools.execute(call).await;
        writeln!(ctx.out, "  {} {} -> {result}", call.id, call.arguments())?;
        messages.push(Message::tool(call.id.clone(), result.to_string()));
    }

    writeln!(ctx.out)?;
    client
        .chat()
        .messages(messages)
        .tools(tools.definitions())
        .stream_collect(echo(ctx.out, false))
        .await?;
    writeln!(ctx.out)?;
    Ok(())
}

pub(super) async fn multi_function_agent(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let tools = ToolRegistry::new()
        .register(WeatherTool)
        .register(Calculate)
        .register(GetDatetime);
    let agent = Agent::new(ctx.client.clone()).with_tools(tools);

    let query = "What day of the week is it? Also get the weather in Paris and Tokyo and \
                 calculate the temperature difference between them.";
    writeln!(ctx.out, "User: {query}\n")?;
    let mut messages = vec![
        Message::system(
            "You are an assistant with weather, calculator and clock tools. Call tools \
             instead of guessing, then answer briefly.",
        ),
        Message::user(query),
    ];
    let mut observer = ConsoleObserver::new(ctx.out, ctx.options.show_thinking);
    agent.run_turn(&mut messages, &mut observer).await?;
    Ok(())
}

pub(super) async fn web_search(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let resp = ctx
        .client
        .chat()
        .message(Message::user(
            "What are the most notable features in the latest stable Rust release?",
        ))
        .tools(vec![Tool::web_search()])
        .send()
        .await?;
    writeln!(ctx.out, "{}", resp.content)?;
    Ok(())
}

pub(super) async fn local_agent(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let query = ctx.input().unwrap_or(DEMO_QUERIES[0]).to_string();
    let agent = Agent::new(ctx.client.clone());
    writeln!(ctx.out, "User: {query}\n")?;
    let mut messages = new_conversation(Some(&query));
    let mut observer = ConsoleObserver::new(ctx.out, ctx.options.show_thinking);
    agent.run_turn(&mut messages, &mut observer).await?;
    Ok(())
}
