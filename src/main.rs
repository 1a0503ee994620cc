//! DAGS client CLI
//!
//! Entry point for the `dags` command-line tool.

use clap::{Args, Parser, Subcommand};
use dags::commands::{self, BuildArgs};
use dags::{wire, EffectiveConfig, RequestType};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dags")]
#[command(about = "Build and inspect DAGS request envelopes", version)]
struct Cli {
    /// Path to project config file (default: .dags/client.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that take precedence over every config file
#[derive(Args)]
struct Overrides {
    /// Application name
    #[arg(long, global = true)]
    app_name: Option<String>,

    /// Client version string
    #[arg(long, global = true)]
    client_version: Option<String>,

    /// Payload compression level (0 = uncompressed)
    #[arg(long, global = true)]
    compression_level: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an encoded request line
    Build {
        /// Request type: universe, group, or job
        #[arg(long = "type", short = 't', value_parser = parse_request_type)]
        kind: RequestType,

        /// Group id (group and job requests)
        #[arg(long, short = 'g')]
        group: Option<i32>,

        /// Size in bytes of the payload sent alongside the request
        #[arg(long)]
        payload_size: Option<u32>,

        /// Client id previously assigned by the server
        #[arg(long)]
        client_id: Option<i32>,
    },

    /// Decode and validate a request line
    Check {
        /// File holding the request (default: stdin)
        file: Option<PathBuf>,

        /// Print the normalized request line instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and where it came from
    Config,
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

    let config = match load_config(cli.config, &cli.overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Build {
            kind,
            group,
            payload_size,
            client_id,
        } => run_build(
            &config,
            BuildArgs {
                kind,
                group,
                payload_size,
                client_id,
            },
        ),
        Commands::Check { file, json } => run_check(file, json),
        Commands::Config => run_config(&config),
    }
}

fn parse_request_type(s: &str) -> Result<RequestType, String> {
    match s.parse::<RequestType>() {
        Ok(RequestType::Unspecified) => Err("request type must not be empty".to_string()),
        Ok(kind) => Ok(kind),
        Err(e) => Err(e.to_string()),
    }
}

fn load_config(
    project_path: Option<PathBuf>,
    overrides: &Overrides,
) -> Result<EffectiveConfig, dags::ConfigError> {
    let host_path = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/dags/client.toml"));
    let project_path = project_path.unwrap_or_else(|| PathBuf::from(".dags/client.toml"));

    let mut cli = serde_json::Map::new();
    if let Some(app_name) = &overrides.app_name {
        cli.insert("app_name".into(), app_name.as_str().into());
    }
    if let Some(version) = &overrides.client_version {
        cli.insert("version".into(), version.as_str().into());
    }
    if let Some(level) = overrides.compression_level {
        cli.insert("compression_level".into(), level.into());
    }
    let cli = (!cli.is_empty()).then_some(serde_json::Value::Object(cli));

    EffectiveConfig::build(host_path.as_deref(), Some(&project_path), cli)
}

fn run_build(config: &EffectiveConfig, args: BuildArgs) -> ExitCode {
    let settings = match config.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::build_request(settings, &args) {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cannot encode request: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_check(file: Option<PathBuf>, json: bool) -> ExitCode {
    let input = match file {
        Some(path) => fs::read_to_string(&path)
            .map_err(|e| format!("{}: {}", path.display(), e)),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("stdin: {}", e))
        }
    };
    let input = match input {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let request = match commands::check_request(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Invalid request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match wire::encode(&request) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("Cannot encode request: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", commands::summary(&request));
    }
    ExitCode::SUCCESS
}

fn run_config(config: &EffectiveConfig) -> ExitCode {
    match commands::config_report(config) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error reporting config: {}", e);
            ExitCode::FAILURE
        }
    }
}
