//! graph-tasks MCP Server
//!
//! Model Context Protocol server exposing Microsoft Planner and To-Do
//! operations (task conversion, title search, list browsing) to LLM agents
//! over stdio.

use std::path::PathBuf;

use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use graph_tasks_client::ClientConfig;
use graph_tasks_mcp::server::GraphTasksMcpServer;

#[derive(Debug, Parser)]
#[command(name = "graph-tasks-mcp", version, about = "MCP server for Microsoft Planner and To-Do")]
struct Cli {
    /// Config file (default: $GRAPH_TASKS_CONFIG, ./.graph-tasks.toml, ~/.config/graph-tasks.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("graph_tasks_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => {
            let mut config = ClientConfig::load_from_path(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => ClientConfig::load(),
    };

    tracing::info!(base_url = %config.base_url, "graph-tasks-mcp starting (stdio transport)");

    let server = GraphTasksMcpServer::from_config(&config)?;
    let transport = rmcp::transport::io::stdio();

    let service = server.serve(transport).await?;
    service.waiting().await?;

    Ok(())
}
