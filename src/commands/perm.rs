//! Permission management commands.

use clap::{Args, Subcommand};
use chrono::{Duration, Utc};
use serde::Serialize;
use tabled::Tabled;

use artivault_core::config::AppConfig;
use artivault_core::error::AppError;
use artivault_core::types::{FileId, PageRequest, UserId};
use artivault_entity::permission::{Permission, PermissionLevel};

use super::Cli;
use crate::output;

/// Arguments for permission commands
#[derive(Debug, Args)]
pub struct PermArgs {
    /// Permission subcommand
    #[command(subcommand)]
    pub command: PermCommand,
}

/// Permission subcommands
#[derive(Debug, Subcommand)]
pub enum PermCommand {
    /// Grant a level on a file, replacing any existing grant
    Grant {
        /// File ID
        file_id: FileId,
        /// Grantee user ID
        user_id: UserId,
        /// `read`, `write`, or `admin`
        level: PermissionLevel,
        /// Expire the grant after this many days
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// Revoke a user's grant
    Revoke {
        /// File ID
        file_id: FileId,
        /// Grantee user ID
        user_id: UserId,
    },
    /// List a file's grants
    List {
        /// File ID
        file_id: FileId,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Grant counts for a file
    Stats {
        /// File ID
        file_id: FileId,
    },
    /// Check whether a user holds a level on a file
    Check {
        /// File ID
        file_id: FileId,
        /// User ID
        user_id: UserId,
        /// Required level
        level: PermissionLevel,
    },
}

/// Permission display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    /// Grantee
    grantee: String,
    /// Level
    level: String,
    /// Status
    status: String,
    /// Granted by
    granted_by: String,
    /// Expires at
    expires_at: String,
}

impl From<&Permission> for PermissionRow {
    fn from(p: &Permission) -> Self {
        let status = if p.is_expired(Utc::now()) {
            "expired".to_string()
        } else {
            p.status.to_string()
        };
        Self {
            grantee: p.grantee_id.to_string(),
            level: p.level.to_string(),
            status,
            granted_by: p.granted_by.to_string(),
            expires_at: output::or_dash(p.expires_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        }
    }
}

/// Execute permission commands
pub async fn execute(args: &PermArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let hub = super::build_hub(config).await?;

    match &args.command {
        PermCommand::Grant {
            file_id,
            user_id,
            level,
            expires_in_days,
        } => {
            let ctx = cli.context()?;
            let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(days));
            let permission = hub
                .grant_permission(&ctx, *file_id, *user_id, *level, expires_at)
                .await?;
            output::print_success(&format!(
                "Granted {} on {} to {}",
                permission.level, file_id, user_id
            ));
        }
        PermCommand::Revoke { file_id, user_id } => {
            let ctx = cli.context()?;
            hub.revoke_permission(&ctx, *file_id, *user_id).await?;
            output::print_success(&format!("Revoked access to {file_id} for {user_id}"));
        }
        PermCommand::List {
            file_id,
            page,
            page_size,
        } => {
            let ctx = cli.context()?;
            let page = PageRequest::new(*page, *page_size);
            let permissions = hub.list_permissions(&ctx, *file_id, &page).await?;
            let rows: Vec<PermissionRow> =
                permissions.items.iter().map(PermissionRow::from).collect();
            output::print_list(&rows, cli.format);
        }
        PermCommand::Stats { file_id } => {
            let ctx = cli.context()?;
            let stats = hub.permission_stats(&ctx, *file_id).await?;
            output::print_value(&stats, cli.format);
        }
        PermCommand::Check {
            file_id,
            user_id,
            level,
        } => {
            if hub.check_access(*file_id, *user_id, *level).await? {
                output::print_success(&format!("{user_id} holds {level} on {file_id}"));
            } else {
                output::print_warning(&format!("{user_id} does not hold {level} on {file_id}"));
            }
        }
    }

    Ok(())
}
