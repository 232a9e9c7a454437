//! Database migration management commands.

use clap::{Args, Subcommand};

use artivault_core::config::{AppConfig, DatabaseProvider};
use artivault_core::error::AppError;
use artivault_database::DatabasePool;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check database connectivity and pool occupancy
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != DatabaseProvider::Postgres {
        return Err(AppError::configuration(
            "Migrations need database.provider = \"postgres\"",
        ));
    }
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            let applied = pool.migrate().await?;
            output::print_success(&format!("Schema is up to date ({applied} migrations)."));
        }
        MigrateCommand::Check => {
            let status = pool.status().await?;
            output::print_success("Database is reachable.");
            output::print_kv("Open connections", &status.open.to_string());
            output::print_kv("Idle connections", &status.idle.to_string());
            output::print_kv("Embedded migrations", &status.embedded_migrations.to_string());
        }
    }

    pool.close().await;
    Ok(())
}
