//! consul-license: Consul license installer.
//!
//! This is the application entry point. It parses the command line, loads the
//! optional TOML configuration, initializes tracing, builds the license
//! installer, and hands it to one of three hosts: a one-shot `invoke`, the
//! `serve` HTTP invocation endpoint, or the `lambda` runtime.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use consul_license::config::{AppConfig, LoggingConfig, DEFAULT_LOG_FILTER};
use consul_license::http::start_server;
use consul_license::routes::create_router;
use consul_license::state::AppState;
use consul_license::{handle_invocation, lambda, InvocationRequest, LicenseInstaller};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// consul-license: install a Consul Enterprise license via the operator API
#[derive(Parser, Debug)]
#[command(name = "consul-license", version, about)]
struct Args {
    /// Path to configuration file (compiled defaults when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "consul_license=debug,reqwest=info")
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the handler once; the event is read from stdin unless given
    Invoke {
        /// Event payload as JSON, e.g. '{"consul_server": "http://10.0.0.5"}'
        #[arg(short, long, conflicts_with = "event_file")]
        event: Option<String>,

        /// File containing the event payload
        #[arg(long)]
        event_file: Option<PathBuf>,
    },
    /// Host the handler behind POST /invoke
    Serve {
        /// Bind host (overrides http.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides http.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run under the AWS Lambda runtime
    Lambda,
}

#[derive(Debug, thiserror::Error)]
enum EventError {
    #[error("Failed to read event: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

fn read_event(
    event: Option<String>,
    event_file: Option<PathBuf>,
) -> Result<InvocationRequest, EventError> {
    let payload = match (event, event_file) {
        (Some(event), _) => event,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            let mut payload = String::new();
            std::io::stdin().read_to_string(&mut payload)?;
            payload
        }
    };

    Ok(InvocationRequest::from_json(&payload)?)
}

/// Logs go to stderr so stdout carries only the Consul response.
fn init_tracing(filter: &str, logging: &LoggingConfig) {
    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));

    if logging.is_json() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = AppConfig::load_or_default(args.config.as_ref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    init_tracing(&log_filter, &config.logging);

    tracing::debug!(
        config = ?args.config,
        consul_port = config.consul.port,
        license_env_var = %config.license.env_var,
        "Loaded configuration"
    );

    let installer = LicenseInstaller::new(config.consul.clone(), config.license.clone())?;

    match args.command {
        Command::Invoke { event, event_file } => {
            let request = read_event(event, event_file)?;
            handle_invocation(&installer, &request).await?;
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.http.host = host;
            }
            if let Some(port) = port {
                config.http.port = port;
            }

            let app = create_router(AppState::new(installer));
            start_server(app, &config.http).await?;
        }
        Command::Lambda => {
            tracing::info!("Starting Lambda runtime");
            lambda::run(installer).await?;
        }
    }

    Ok(())
}
