//! remote-relay
//!
//! ```text
//!   browser ──HTTP──▶ ┌──────────────────────────────────────────┐
//!                     │  cors → /api dispatcher → static files   │
//!                     └────────┬──────────────────────┬──────────┘
//!                              │ /api/*               │ /api/xbox/*
//!                              ▼                      ▼
//!                     ┌────────────────┐     ┌──────────────────┐
//!                     │   tv::proxy    │     │  xbox::bridge    │
//!                     │ hyper client   │     │ UDP per request  │
//!                     └───────┬────────┘     └────────┬─────────┘
//!                             ▼                       ▼
//!                    Philips TV :1925         Xbox :5050 (+ broadcast)
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::net::TcpListener;

use remote_relay::config::{apply_env_overrides, parse_config, validate_config, ConfigError};
use remote_relay::observability::{logging, metrics};
use remote_relay::xbox::{XboxBridge, BUTTONS};
use remote_relay::{HttpServer, RelayConfig, Shutdown};

#[derive(Parser)]
#[command(name = "remote-relay")]
#[command(about = "TV proxy and Xbox packet relay for a browser remote", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP relay (default)
    Serve {
        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run one Xbox operation and print the result
    Xbox {
        #[command(subcommand)]
        action: XboxAction,
    },
    /// List known button names
    Buttons,
}

#[derive(Subcommand)]
enum XboxAction {
    /// Check whether the console answers
    Status,
    /// Look for consoles (unicast + broadcast)
    Discover,
    /// Send the power-on packet
    Wake,
    /// Press and release one button
    Press {
        button: String,
        #[arg(long)]
        hold_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => parse_config(path)?,
        None => RelayConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    if let Some(Commands::Serve { bind: Some(bind) }) = &cli.command {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { .. } => serve(config).await,
        Commands::Xbox { action } => run_xbox(config, action).await,
        Commands::Buttons => {
            for (name, code) in BUTTONS {
                println!("{name:<16} {code:#06x}");
            }
            Ok(())
        }
    }
}

async fn serve(config: RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        tv = %config.tv.base_url(),
        xbox = %config.xbox.address,
        static_root = %config.static_files.root,
        "remote-relay starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown.trigger_on_signal().await;
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_xbox(config: RelayConfig, action: XboxAction) -> Result<(), Box<dyn std::error::Error>> {
    let bridge = XboxBridge::udp(config.xbox);

    match action {
        XboxAction::Status => print_json(&bridge.status().await),
        XboxAction::Discover => {
            println!("Discovering Xbox...");
            print_json(&bridge.discover().await)
        }
        XboxAction::Wake => print_json(&bridge.wake().await),
        XboxAction::Press { button, hold_ms } => {
            let hold = hold_ms.map(Duration::from_millis);
            print_json(&bridge.send_input(&button, hold).await)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
