//! memscope: terminal frontend for a memory backend.
//!
//! # Subcommands
//! - `list`                                  print every stored memory
//! - `search <query>`                        semantic search
//! - `add <content>`                         store a memory
//! - `delete <id> [--yes]`                   delete a memory
//! - `graph [--threshold <t>] [--json]`      print the similarity graph
//! - `models` / `use-model <name>`           embedding model catalog
//! - `panel`                                 interactive list/graph session

mod canvas;
mod panel;
mod terminal;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use memscope_core::{
    map_payload, AddOutcome, ApiClient, DeleteOutcome, EventReceiver, EventSink, LayoutOptions,
    MemoryApi, ModeController, PanelConfig, SearchDebouncer,
};
use tracing_subscriber::{fmt, EnvFilter};

use crate::canvas::{render_summary, TerminalEngine};
use crate::panel::Panel;
use crate::terminal::{ConfirmPolicy, TerminalView};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "memscope", version, about = "Browse, search and map stored memories")]
struct Cli {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(short, long, default_value = "memscope.toml")]
    config: String,

    /// Memory backend URL (overrides `server.base_url` from the config file)
    #[arg(long, env = "MEMSCOPE_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print every stored memory
    List,

    /// Search memories semantically
    Search {
        /// Query text
        query: String,
    },

    /// Store a new memory
    Add {
        /// Memory content
        content: String,
    },

    /// Delete a memory by id
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the similarity graph at a threshold
    Graph {
        /// Similarity threshold in [0, 1] (defaults to `graph.default_threshold`)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Emit the mapped render records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available embedding models
    Models,

    /// Switch the backend's embedding model
    UseModel {
        name: String,
    },

    /// Interactive session with list and graph modes
    Panel,
}

// ============================================================================
// Commands
// ============================================================================

fn build_controller(
    api: Arc<ApiClient>,
    config: &PanelConfig,
    confirm: ConfirmPolicy,
) -> (ModeController<TerminalView>, EventReceiver) {
    let (sink, events) = EventSink::channel();
    let controller = ModeController::new(
        api,
        Arc::new(TerminalEngine),
        TerminalView::new(confirm),
        sink,
        &config.graph,
    );
    (controller, events)
}

async fn do_graph(
    api: &ApiClient,
    config: &PanelConfig,
    threshold: Option<f64>,
    json_output: bool,
) -> anyhow::Result<()> {
    let threshold = threshold
        .unwrap_or(config.graph.default_threshold)
        .clamp(0.0, 1.0);

    let payload = api
        .memory_network(threshold)
        .await
        .context("Failed to load memory network")?;
    let graph = map_payload(&payload).context("Invalid network data received")?;

    if json_output {
        let payload = serde_json::json!({
            "nodes": graph.nodes,
            "edges": graph.edges,
            "options": LayoutOptions::default(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Threshold: {threshold:.2}");
        print!("{}", render_summary(&graph));
    }
    Ok(())
}

async fn do_models(api: &ApiClient) -> anyhow::Result<()> {
    let catalog = api.list_models().await.context("Failed to load models")?;
    for model in &catalog.available {
        let marker = if *model == catalog.current { "*" } else { " " };
        println!("{marker} {model}");
    }
    Ok(())
}

async fn do_use_model(api: &ApiClient, name: &str) -> anyhow::Result<()> {
    let switch = api.set_model(name).await.context("Failed to switch model")?;
    if !switch.success {
        anyhow::bail!("model switch refused");
    }
    println!("now using {}", switch.current.as_deref().unwrap_or(name));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = PanelConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }

    // Logs go to stderr so command output stays pipeable
    let default_level = config
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    tracing::debug!(server = %config.server.base_url, "memscope starting");
    let api = Arc::new(ApiClient::new(config.server.base_url.clone())?);

    match cli.command {
        Commands::List => {
            let (mut panel, _) = build_controller(api, &config, ConfirmPolicy::Prompt);
            panel.list_memories().await;
        }
        Commands::Search { query } => {
            let (mut panel, _) = build_controller(api, &config, ConfirmPolicy::Prompt);
            panel.search(&query).await;
        }
        Commands::Add { content } => {
            let (mut panel, _) = build_controller(api, &config, ConfirmPolicy::Prompt);
            if let AddOutcome::Failed = panel.add_memory(&content).await {
                std::process::exit(1);
            }
        }
        Commands::Delete { id, yes } => {
            let confirm = if yes {
                ConfirmPolicy::Assume(true)
            } else {
                ConfirmPolicy::Prompt
            };
            let (mut panel, _) = build_controller(api, &config, confirm);
            if let DeleteOutcome::Failed = panel.delete_memory(&id).await {
                std::process::exit(1);
            }
        }
        Commands::Graph { threshold, json } => do_graph(&api, &config, threshold, json).await?,
        Commands::Models => do_models(&api).await?,
        Commands::UseModel { name } => do_use_model(&api, &name).await?,
        Commands::Panel => {
            let (mut controller, events) = build_controller(api, &config, ConfirmPolicy::Prompt);
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let debouncer = SearchDebouncer::from_millis(config.search.debounce_ms);
            println!("{}", panel::HELP);
            Panel::new(&mut controller, input, events, debouncer)
                .run()
                .await?;
            controller.exit_graph();
        }
    }

    Ok(())
}
