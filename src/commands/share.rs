//! Share link commands.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use artivault_core::config::AppConfig;
use artivault_core::error::AppError;
use artivault_core::types::{FileId, PageRequest, ShareId};
use artivault_entity::share::{ShareLevel, ShareLink};
use artivault_service::{ArtifactHub, CreateShareRequest};

use super::Cli;
use crate::output;

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Create a share link for a file
    Create {
        /// File ID
        file_id: FileId,
        /// `read` or `write`
        #[arg(short, long, default_value = "read")]
        level: ShareLevel,
        /// Maximum number of downloads
        #[arg(long)]
        max_downloads: Option<i32>,
        /// Expire the link after this many hours
        #[arg(long)]
        expires_in_hours: Option<i64>,
    },
    /// List a file's links
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
    /// Link counts for a file
    Stats {
        /// File ID
        file_id: FileId,
    },
    /// Revoke a link
    Revoke {
        /// Share link ID
        share_id: ShareId,
    },
    /// Show a link by token without counting a download
    Resolve {
        /// Share token
        token: String,
    },
    /// Download through a link, counting one download
    Download {
        /// Share token
        token: String,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Share link display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Link ID
    id: String,
    /// Level
    level: String,
    /// Validity
    validity: String,
    /// Downloads
    downloads: String,
    /// Expires at
    expires_at: String,
    /// URL
    url: String,
}

impl ShareRow {
    fn new(link: &ShareLink, hub: &ArtifactHub) -> Self {
        let downloads = match link.max_downloads {
            Some(max) => format!("{}/{}", link.download_count, max),
            None => link.download_count.to_string(),
        };
        Self {
            id: link.id.to_string(),
            level: link.level.to_string(),
            validity: link.validity(Utc::now()).to_string(),
            downloads,
            expires_at: output::or_dash(link.expires_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
            url: hub.shares().share_url(link),
        }
    }
}

/// Execute share commands
pub async fn execute(args: &ShareArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let hub = super::build_hub(config).await?;

    match &args.command {
        ShareCommand::Create {
            file_id,
            level,
            max_downloads,
            expires_in_hours,
        } => {
            let ctx = cli.context()?;
            let req = CreateShareRequest {
                level: *level,
                max_downloads: *max_downloads,
                expires_at: expires_in_hours.map(|h| Utc::now() + Duration::hours(h)),
            };
            let link = hub.create_share(&ctx, *file_id, &req).await?;
            output::print_success(&format!("Share link created: {}", hub.shares().share_url(&link)));
            output::print_item(&ShareRow::new(&link, &hub), cli.format);
        }
        ShareCommand::List {
            file_id,
            page,
            page_size,
        } => {
            let ctx = cli.context()?;
            let page = PageRequest::new(*page, *page_size);
            let links = hub.list_shares(&ctx, *file_id, &page).await?;
            let rows: Vec<ShareRow> = links.items.iter().map(|l| ShareRow::new(l, &hub)).collect();
            output::print_list(&rows, cli.format);
        }
        ShareCommand::Stats { file_id } => {
            let ctx = cli.context()?;
            let stats = hub.share_stats(&ctx, *file_id).await?;
            output::print_value(&stats, cli.format);
        }
        ShareCommand::Revoke { share_id } => {
            let ctx = cli.context()?;
            hub.revoke_share(&ctx, *share_id).await?;
            output::print_success(&format!("Share link {share_id} revoked"));
        }
        ShareCommand::Resolve { token } => {
            let link = hub.resolve_share(token).await?;
            output::print_item(&ShareRow::new(&link, &hub), cli.format);
        }
        ShareCommand::Download { token, output: out } => {
            let download = hub.download_shared(token).await?;
            tokio::fs::write(out, &download.data).await?;
            output::print_success(&format!(
                "Wrote '{}' to {}",
                download.file.name,
                out.display()
            ));
            if let Some(left) = download.link.remaining_downloads() {
                output::print_kv("Downloads left", &left.to_string());
            }
        }
    }

    Ok(())
}
