//! ReAct agent - HTTP server and one-shot CLI entry point.

use clap::{Parser, Subcommand};
use react_agent::{agent::Agent, api, config::Config, state::Message};
use serde_json::Map;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "react-agent", version, about = "Minimal ReAct agent with web search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Answer one question and exit
    Ask {
        /// The question to answer
        #[arg(required = true)]
        question: Vec<String>,
        /// Model override in provider/model-name form
        #[arg(long)]
        model: Option<String>,
        /// Maximum search results per query
        #[arg(long)]
        max_search_results: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "react_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, max_iterations={}",
        config.default_model, config.max_iterations
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting server on {}:{}", config.host, config.port);
            api::serve(config).await?;
        }
        Command::Ask {
            question,
            model,
            max_search_results,
        } => {
            let mut overrides = Map::new();
            if let Some(model) = model {
                overrides.insert("model".to_string(), model.into());
            }
            if let Some(n) = max_search_results {
                overrides.insert("max_search_results".to_string(), n.into());
            }

            let agent = Agent::from_config(&config)?;
            let state = agent
                .invoke(vec![Message::human(question.join(" "))], &overrides)
                .await?;
            println!("{}", state.final_answer().unwrap_or_default());
        }
    }

    Ok(())
}
