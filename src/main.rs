//! Artivault command-line entry point.
//!
//! Loads configuration, initialises logging, and dispatches to a
//! subcommand. Every subcommand acts through the same policy checks a
//! request layer would use.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use artivault_core::config::{AppConfig, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        tracing::error!(kind = %e.kind, "Command failed: {}", e.message);
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
