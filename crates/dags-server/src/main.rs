//! DAGS Dispatch Server Entrypoint
//!
//! Usage: dags-server rpc [--config FILE]
//!
//! Reads request lines from stdin and writes one response line per request
//! to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dags_server::{RpcHandler, ServerConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "dags-server")]
#[command(about = "DAGS dispatch server", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer request lines from stdin until EOF
    Rpc {
        /// Path to server config file (TOML)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Rpc { config } => run_rpc(config),
    }
}

fn run_rpc(config_path: Option<PathBuf>) -> ExitCode {
    let config = match config_path {
        Some(path) => match ServerConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    info!(
        version = %config.version,
        max_compression_level = config.max_compression_level,
        "dispatch server ready"
    );

    let mut handler = RpcHandler::new(config);
    match handler.run() {
        Ok(handled) => {
            info!(handled, clients = handler.dispatcher().client_count(), "dispatch server done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("RPC handler error: {}", e);
            ExitCode::FAILURE
        }
    }
}
