//! Version history commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use artivault_core::config::AppConfig;
use artivault_core::error::AppError;
use artivault_core::types::{FileId, PageRequest, VersionId};
use artivault_entity::file::human_readable_size;
use artivault_entity::version::Version;
use artivault_service::ContentUpload;

use super::Cli;
use crate::output;

/// Arguments for version commands
#[derive(Debug, Args)]
pub struct VersionArgs {
    /// Version subcommand
    #[command(subcommand)]
    pub command: VersionCommand,
}

/// Version subcommands
#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// Upload new content as the current version
    Create {
        /// File ID
        file_id: FileId,
        /// Path to the new content
        path: PathBuf,
        /// Change note
        #[arg(short, long)]
        note: Option<String>,
        /// MIME type to record
        #[arg(short, long)]
        mime_type: Option<String>,
    },
    /// List a file's versions, newest first
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
    /// Make an earlier version current
    Rollback {
        /// File ID
        file_id: FileId,
        /// Version ID
        version_id: VersionId,
    },
    /// Delete a version that is not current
    Delete {
        /// Version ID
        version_id: VersionId,
    },
    /// Version history summary
    Stats {
        /// File ID
        file_id: FileId,
    },
    /// Show the label the next version would get
    NextLabel {
        /// File ID
        file_id: FileId,
    },
    /// Write a version's content to disk
    Download {
        /// Version ID
        version_id: VersionId,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Version display row for table output
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version ID
    id: String,
    /// Label
    label: String,
    /// Current
    current: String,
    /// Size
    size: String,
    /// Author
    created_by: String,
    /// Created at
    created_at: String,
    /// Note
    note: String,
}

impl From<&Version> for VersionRow {
    fn from(v: &Version) -> Self {
        Self {
            id: v.id.to_string(),
            label: v.version_label.clone(),
            current: if v.is_current { "*".to_string() } else { String::new() },
            size: human_readable_size(v.content.size_bytes),
            created_by: v.created_by.to_string(),
            created_at: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
            note: v.change_note.clone().unwrap_or_default(),
        }
    }
}

/// Execute version commands
pub async fn execute(args: &VersionArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let ctx = cli.context()?;
    let hub = super::build_hub(config).await?;

    match &args.command {
        VersionCommand::Create {
            file_id,
            path,
            note,
            mime_type,
        } => {
            let data = tokio::fs::read(path).await?;
            let original_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let mut upload = ContentUpload::new(data, original_name);
            if let Some(mime) = mime_type {
                upload = upload.with_mime_type(mime.clone());
            }
            let version = hub
                .create_version(&ctx, *file_id, &upload, note.as_deref())
                .await?;
            output::print_success(&format!(
                "Version {} is now current for {}",
                version.version_label, file_id
            ));
            output::print_item(&VersionRow::from(&version), cli.format);
        }
        VersionCommand::List {
            file_id,
            page,
            page_size,
        } => {
            let page = PageRequest::new(*page, *page_size);
            let versions = hub.list_versions(&ctx, *file_id, &page).await?;
            let rows: Vec<VersionRow> = versions.items.iter().map(VersionRow::from).collect();
            output::print_list(&rows, cli.format);
        }
        VersionCommand::Rollback {
            file_id,
            version_id,
        } => {
            let outcome = hub.rollback_version(&ctx, *file_id, *version_id).await?;
            if outcome.changed() {
                output::print_success(&format!(
                    "Rolled back {} to version {}",
                    file_id, outcome.current.version_label
                ));
            } else {
                output::print_warning(&format!(
                    "Version {} is already current",
                    outcome.current.version_label
                ));
            }
        }
        VersionCommand::Delete { version_id } => {
            let version = hub.delete_version(&ctx, *version_id).await?;
            output::print_success(&format!("Version {} deleted", version.version_label));
        }
        VersionCommand::Stats { file_id } => {
            let stats = hub.version_stats(&ctx, *file_id).await?;
            output::print_value(&stats, cli.format);
        }
        VersionCommand::NextLabel { file_id } => {
            let label = hub.next_version_label(&ctx, *file_id).await?;
            println!("{label}");
        }
        VersionCommand::Download {
            version_id,
            output: out,
        } => {
            let (version, data) = hub.read_version(&ctx, *version_id).await?;
            tokio::fs::write(out, &data).await?;
            output::print_success(&format!(
                "Wrote version {} to {}",
                version.version_label,
                out.display()
            ));
        }
    }

    Ok(())
}
