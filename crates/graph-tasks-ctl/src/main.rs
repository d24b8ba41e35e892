//! graph-tasks-ctl: command-line interface for graph-tasks.
//!
//! `generate client` runs the build-time client generator; `lists`, `convert`
//! and `find` drive the same conversion and search logic the MCP server
//! exposes, for scripting and manual use.

mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use graph_tasks_client::{ClientConfig, GraphClient, TaskApi};

#[derive(Debug, Parser)]
#[command(name = "graph-tasks-ctl", version, about = "Microsoft Planner and To-Do tooling")]
#[command(styles = output::clap_styles())]
struct Cli {
    /// Config file (default: $GRAPH_TASKS_CONFIG, ./.graph-tasks.toml, ~/.config/graph-tasks.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build-time code generation
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
    /// List To-Do lists
    Lists {
        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
    /// Copy a Planner task into To-Do and mark the source complete
    Convert {
        /// Planner task ID
        planner_task_id: String,
        /// Destination To-Do list ID (default: the default list)
        #[arg(long)]
        list: Option<String>,
        /// Leave the Planner task open
        #[arg(long)]
        no_complete: bool,
        /// Do not prefix the To-Do title
        #[arg(long)]
        no_prefix: bool,
        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
    /// Find a To-Do task by title
    Find {
        /// Title (or part of it) to search for
        title: String,
        /// Only search this list
        #[arg(long)]
        list: Option<String>,
        /// Include completed tasks
        #[arg(long)]
        include_completed: bool,
        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum GenerateCommands {
    /// Generate the typed Graph client from an OpenAPI description
    Client {
        /// OpenAPI YAML document
        #[arg(long)]
        spec: PathBuf,
        /// Output directory
        #[arg(long, short)]
        output: PathBuf,
        /// Generated file name inside the output directory
        #[arg(long, default_value = graph_tasks_sdk::codegen::DEFAULT_OUTPUT_FILE)]
        file: String,
        /// Pass the document to the generator untrimmed
        #[arg(long)]
        no_trim: bool,
        /// Path prefix to keep when trimming (repeatable; default: Planner and To-Do paths)
        #[arg(long = "prefix")]
        prefixes: Vec<String>,
        /// Generator command after `--`, one argument per word; {spec} and {output} are substituted
        #[arg(last = true, value_name = "COMMAND")]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        output::error(format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { command } => commands::handle_generate_command(command)?,
        Commands::Lists { json } => {
            let api = connect(cli.config.as_ref()).await?.0;
            commands::handle_lists_command(api.as_ref(), json).await?;
        }
        Commands::Convert {
            planner_task_id,
            list,
            no_complete,
            no_prefix,
            json,
        } => {
            let (api, config) = connect(cli.config.as_ref()).await?;
            let request = graph_tasks_sdk::ConversionRequest {
                planner_task_id,
                todo_list_id: list,
                mark_complete: !no_complete,
                add_prefix: !no_prefix,
            };
            commands::handle_convert_command(api, config.tasks, &request, json).await?;
        }
        Commands::Find {
            title,
            list,
            include_completed,
            json,
        } => {
            let (api, config) = connect(cli.config.as_ref()).await?;
            let request = graph_tasks_sdk::FindRequest {
                title,
                list_id: list,
                include_completed,
            };
            commands::handle_find_command(api, config.tasks, &request, json).await?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "graph_tasks_ctl=debug,graph_tasks_sdk=debug,graph_tasks_client=debug"
    } else {
        "graph_tasks_ctl=info,graph_tasks_sdk=warn,graph_tasks_client=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration and open a Graph session for this command.
async fn connect(
    config_path: Option<&PathBuf>,
) -> anyhow::Result<(Arc<dyn TaskApi>, ClientConfig)> {
    let config = match config_path {
        Some(path) => {
            let mut config = ClientConfig::load_from_path(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => ClientConfig::load(),
    };
    tracing::debug!(?config, "Resolved client config");
    let session = GraphClient::from_config(&config)?.session().await?;
    Ok((session, config))
}
