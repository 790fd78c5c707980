//! glm-cookbook: run the GLM API recipes from a menu or the command line.
//!
//! Usage:
//!   glm-cookbook                       Interactive menu
//!   glm-cookbook list                  List recipes
//!   glm-cookbook run <N> [-u REF]      Run one recipe
//!   glm-cookbook agent [-q QUERY]      Local tool-using agent (REPL without -q)
//!   glm-cookbook samples               Generate the sample images

use anyhow::Context;
use clap::{Parser, Subcommand};
use glm_cookbook::agent::{new_conversation, Agent, ConsoleObserver, DEMO_QUERIES};
use glm_cookbook::recipes::{menu_text, Recipe, RecipeContext, RecipeOptions};
use glm_cookbook::{GlmClient, Settings};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "glm-cookbook")]
#[command(about = "Runnable recipes for the GLM open platform API")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick recipes from an interactive menu (default)
    Menu,
    /// List all recipes
    List,
    /// Run a single recipe by number
    Run {
        /// Recipe number, 1-22
        number: String,
        /// Image / video / audio reference (URL or path), or the agent query
        #[arg(short = 'u', long = "input")]
        input: Option<String>,
        /// Echo reasoning text from thinking-mode models
        #[arg(long)]
        show_thinking: bool,
    },
    /// Chat with the local tool-using agent
    Agent {
        /// Ask a single question and exit
        #[arg(short, long)]
        query: Option<String>,
        /// Run the built-in demo questions
        #[arg(long, conflicts_with = "query")]
        demo: bool,
        /// Hide the model's reasoning output
        #[arg(long)]
        no_thinking: bool,
    },
    /// Generate the sample images used by the vision recipes
    Samples,
}

type StdinLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command.unwrap_or(Command::Menu) {
        Command::List => {
            print!("{}", menu_text());
            Ok(())
        }
        Command::Menu => run_menu(&connect()?).await,
        Command::Run {
            number,
            input,
            show_thinking,
        } => {
            let recipe = Recipe::parse_selection(&number)?;
            let client = connect()?;
            let options = RecipeOptions {
                input,
                show_thinking,
            };
            run_recipe(&client, recipe, options).await?;
            Ok(())
        }
        Command::Agent {
            query,
            demo,
            no_thinking,
        } => {
            let agent = Agent::new(connect()?);
            if demo {
                for q in DEMO_QUERIES {
                    ask_once(&agent, q, !no_thinking).await?;
                }
                Ok(())
            } else if let Some(q) = query {
                ask_once(&agent, &q, !no_thinking).await
            } else {
                run_agent_repl(&agent, !no_thinking).await
            }
        }
        Command::Samples => {
            let client = connect()?;
            run_recipe(&client, Recipe::GenerateSamples, RecipeOptions::default()).await?;
            Ok(())
        }
    }
}

/// Settings first, so a missing key fails before anything touches the network.
fn connect() -> anyhow::Result<GlmClient> {
    let settings = Settings::load()?;
    info!(base_url = %settings.base_url, "settings loaded");
    GlmClient::new(settings).context("failed to build client")
}

async fn run_recipe(
    client: &GlmClient,
    recipe: Recipe,
    options: RecipeOptions,
) -> glm_cookbook::Result<()> {
    let mut stdout = std::io::stdout();
    let mut ctx = RecipeContext::new(client, options, &mut stdout);
    recipe.run(&mut ctx).await
}

async fn prompt(lines: &mut StdinLines, text: &str) -> anyhow::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

async fn run_menu(client: &GlmClient) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("{}", menu_text());
        let Some(choice) = prompt(&mut lines, "Select a recipe (1-22, q to quit): ").await? else {
            break;
        };
        let choice = choice.trim();
        if matches!(choice, "q" | "quit" | "exit") {
            break;
        }
        let recipe = match Recipe::parse_selection(choice) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let mut options = RecipeOptions::default();
        if recipe.accepts_input() {
            let input = prompt(&mut lines, "Input (-u) or Enter for the default: ")
                .await?
                .unwrap_or_default();
            options.input = Some(input.trim().to_string()).filter(|s| !s.is_empty());
        }

        if let Err(e) = run_recipe(client, recipe, options).await {
            eprintln!("\nError: {e}");
        }
        prompt(&mut lines, "\nPress Enter to return to the menu...").await?;
    }
    Ok(())
}

async fn ask_once(agent: &Agent, query: &str, show_thinking: bool) -> anyhow::Result<()> {
    println!("You: {query}\n");
    let mut messages = new_conversation(Some(query));
    let mut stdout = std::io::stdout();
    let mut observer = ConsoleObserver::new(&mut stdout, show_thinking);
    agent.run_turn(&mut messages, &mut observer).await?;
    println!();
    Ok(())
}

async fn run_agent_repl(agent: &Agent, show_thinking: bool) -> anyhow::Result<()> {
    println!(
        "Local agent with {} tools: {}",
        agent.tools().len(),
        agent.tools().names().join(", ")
    );
    println!("Type 'clear' to start over, 'quit' to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut messages = new_conversation(None);
    while let Some(line) = prompt(&mut lines, "You: ").await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "clear" => {
                messages = new_conversation(None);
                println!("(conversation cleared)\n");
                continue;
            }
            _ => {}
        }

        let checkpoint = messages.len();
        messages.push(glm_cookbook::Message::user(line));
        let mut stdout = std::io::stdout();
        let mut observer = ConsoleObserver::new(&mut stdout, show_thinking);
        if let Err(e) = agent.run_turn(&mut messages, &mut observer).await {
            messages.truncate(checkpoint);
            eprintln!("Error: {e}");
        }
        println!();
    }
    Ok(())
}
