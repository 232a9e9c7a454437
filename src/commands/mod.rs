//! CLI command definitions and dispatch.

pub mod config;
pub mod file;
pub mod migrate;
pub mod perm;
pub mod share;
pub mod version;

use clap::{Parser, Subcommand};

use artivault_core::config::{AppConfig, DatabaseProvider};
use artivault_core::error::AppError;
use artivault_core::types::UserId;
use artivault_service::{ArtifactHub, RequestContext};

use crate::output::{self, OutputFormat};

/// Artivault: artifact permissions, share links, and version history
#[derive(Debug, Parser)]
#[command(name = "artivault", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Act as this user (UUID)
    #[arg(short = 'u', long = "as-user", global = true, env = "ARTIVAULT_USER")]
    pub as_user: Option<UserId>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Upload and manage files
    File(file::FileArgs),
    /// Grant, revoke, and inspect permissions
    Perm(perm::PermArgs),
    /// Share link management
    Share(share::ShareArgs),
    /// Version history
    Version(version::VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Config(args) => config::execute(args, &self.config, &config, self.format),
            Commands::File(args) => file::execute(args, self, &config).await,
            Commands::Perm(args) => perm::execute(args, self, &config).await,
            Commands::Share(args) => share::execute(args, self, &config).await,
            Commands::Version(args) => version::execute(args, self, &config).await,
        }
    }

    /// The acting user's request context.
    pub fn context(&self) -> Result<RequestContext, AppError> {
        self.as_user
            .map(RequestContext::new)
            .ok_or_else(|| AppError::validation("This command needs --as-user <UUID>"))
    }
}

/// Helper: wire the hub from configuration
pub async fn build_hub(config: &AppConfig) -> Result<ArtifactHub, AppError> {
    if config.database.provider == DatabaseProvider::Memory {
        output::print_warning("Using the in-memory database; nothing is kept after exit.");
    }
    ArtifactHub::from_config(config).await
}
