//! shard-selector command line.
//!
//! Loads a selector configuration, connects every configured MySQL server
//! and either prints the resulting status snapshot or resolves a single
//! `(pool, table, hint)` request.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use shard_selector::config::load_config;
use shard_selector::observability::{logging, metrics};
use shard_selector::{MySqlConnector, ServerSelector};

#[derive(Parser)]
#[command(name = "shard-selector")]
#[command(about = "Shard-aware MySQL server selector", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "selector.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print registered connections and lookup cache state
    Status,
    /// Resolve the server for a request
    Pick {
        #[arg(long)]
        pool: String,
        #[arg(long, default_value = "")]
        table: String,
        #[arg(long)]
        hint: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(path = %cli.config.display(), servers = config.servers.len(), "Configuration loaded");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let selector = ServerSelector::new(&config, &MySqlConnector::new()).await?;

    match cli.command {
        Commands::Status => {
            println!("{}", serde_json::to_string_pretty(&selector.snapshot())?);
        }
        Commands::Pick { pool, table, hint } => {
            let conn = selector.pick_server(&pool, &table, hint).await?;
            println!("{} {}", conn.pool(), conn.address());
        }
    }

    Ok(())
}
