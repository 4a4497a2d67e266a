//! Concierge - multi-agent chat orchestrator
//!
//! Routes each user query through a classifier to a weather agent or a
//! GraphQL agent backed by MCP tools, and always answers with readable text.

mod agents;
mod classifier;
mod config;
mod formatter;
mod llm;
mod mcp;
mod react;
mod runtime;
mod schema;
mod session;
mod state_machine;
mod system_prompt;

use agents::{AgentRegistry, GraphqlAgent, WeatherAgent};
use anyhow::Context;
use clap::Parser;
use classifier::Classifier;
use config::{AppConfig, LogFormat};
use formatter::Formatter;
use llm::ModelRegistry;
use mcp::McpClient;
use runtime::Router;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MCP_SERVER_NAME: &str = "relate-account";

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "concierge=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = AppConfig::parse();
    init_tracing(config.log_format);

    let llm_registry = ModelRegistry::new(&config.llm_config());
    let router_llm = llm_registry
        .router()
        .context("router model is not registered")?;
    let graphql_llm = llm_registry
        .graphql()
        .context("GraphQL model is not registered")?;
    tracing::info!(models = ?llm_registry.available_models(), "LLM registry initialized");

    let tools = Arc::new(McpClient::new(config.mcp_url.clone(), MCP_SERVER_NAME));
    let graphql = Arc::new(GraphqlAgent::new(
        graphql_llm,
        tools,
        config.graphql_settings(),
    ));

    if let (Some(query), true) = (&config.query, config.direct_graphql) {
        let state = graphql.run_query(query).await;
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let agents = AgentRegistry::new()
        .with(Arc::new(WeatherAgent::new(router_llm.clone())))
        .with(graphql);
    let classifier = Classifier::new(router_llm.clone(), &agents.ids());
    let router = Router::new(classifier, agents, Formatter::new(router_llm));

    if let Some(query) = &config.query {
        let reply = router.handle(query).await?;
        println!("{reply}");
        return Ok(());
    }

    run_chat(&router).await
}

/// One line typed at the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Empty,
    Query(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            ChatInput::Empty
        } else if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            ChatInput::Quit
        } else {
            ChatInput::Query(input)
        }
    }
}

/// Read-eval loop on stdin until quit, EOF or Ctrl-C
async fn run_chat(router: &Router) -> anyhow::Result<()> {
    println!("Concierge ready. Ask about the weather or on-chain identities.");
    println!("Type 'quit' or 'exit' to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let input = match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Empty => {
                println!("Please enter a question.");
                continue;
            }
            ChatInput::Query(input) => input,
        };

        println!("Agent is thinking...");
        tokio::select! {
            result = router.handle(input) => match result {
                Ok(reply) => println!("\nAgent: {reply}"),
                Err(e) => {
                    tracing::error!(error = %e, "Turn failed");
                    println!("\nError: {e}");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    println!("bye");
    Ok(())
}
