//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use artivault_core::config::AppConfig;
use artivault_core::error::AppError;
use artivault_database::connection::redact_url;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration and summarise it
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = redact_url(&shown.database.url);
            output::print_value(&shown, format);
        }
        ConfigCommand::Validate => {
            // Loading already validated it.
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Database", &config.database.provider.to_string());
            if !config.database.url.is_empty() {
                output::print_kv("Database URL", &redact_url(&config.database.url));
            }
            output::print_kv("Storage", &config.storage.provider.to_string());
            output::print_kv("Share base URL", &config.sharing.base_url);
            output::print_kv(
                "Max change note",
                &format!("{} chars", config.versioning.max_change_note_chars),
            );
        }
    }
    Ok(())
}
