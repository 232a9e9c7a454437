//! File upload and lifecycle commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use artivault_core::config::AppConfig;
use artivault_core::error::AppError;
use artivault_core::types::{FileId, PageRequest};
use artivault_entity::file::{File, Visibility, human_readable_size};
use artivault_service::ContentUpload;

use super::Cli;
use crate::output;

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload a local file as a new artifact
    Upload {
        /// Path to the file to upload
        path: PathBuf,
        /// Override file name
        #[arg(short, long)]
        name: Option<String>,
        /// MIME type to record
        #[arg(short, long)]
        mime_type: Option<String>,
        /// Make the file readable by everyone
        #[arg(long)]
        public: bool,
    },
    /// Show a file
    Get {
        /// File ID
        file_id: FileId,
    },
    /// List files owned by the acting user
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Write a file's current content to disk
    Download {
        /// File ID
        file_id: FileId,
        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Change visibility
    Visibility {
        /// File ID
        file_id: FileId,
        /// `public` or `private`
        visibility: Visibility,
    },
    /// Soft-delete a file
    Delete {
        /// File ID
        file_id: FileId,
    },
    /// Show what the acting user may do with a file
    Access {
        /// File ID
        file_id: FileId,
    },
}

/// File display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Owner
    owner: String,
    /// Visibility
    visibility: String,
    /// Size
    size: String,
    /// MIME type
    mime_type: String,
    /// Updated at
    updated_at: String,
}

impl From<&File> for FileRow {
    fn from(f: &File) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            owner: f.owner_id.to_string(),
            visibility: f.visibility.to_string(),
            size: human_readable_size(f.head.size_bytes),
            mime_type: f.head.mime_type.clone(),
            updated_at: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute file commands
pub async fn execute(args: &FileArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let ctx = cli.context()?;
    let hub = super::build_hub(config).await?;

    match &args.command {
        FileCommand::Upload {
            path,
            name,
            mime_type,
            public,
        } => {
            let data = tokio::fs::read(path).await?;
            let original_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let name = name.clone().unwrap_or_else(|| original_name.clone());
            let mut upload = ContentUpload::new(data, original_name);
            if let Some(mime) = mime_type {
                upload = upload.with_mime_type(mime.clone());
            }
            let visibility = if *public {
                Visibility::Public
            } else {
                Visibility::Private
            };

            let (file, version) = hub.upload(&ctx, &name, &upload, visibility).await?;
            output::print_success(&format!(
                "Uploaded '{}' as {} (version {})",
                file.name, file.id, version.version_label
            ));
            output::print_item(&FileRow::from(&file), cli.format);
        }
        FileCommand::Get { file_id } => {
            let file = hub.get_file(&ctx, *file_id).await?;
            output::print_item(&FileRow::from(&file), cli.format);
        }
        FileCommand::List { page, page_size } => {
            let page = PageRequest::new(*page, *page_size);
            let files = hub.list_my_files(&ctx, &page).await?;
            let rows: Vec<FileRow> = files.items.iter().map(FileRow::from).collect();
            output::print_list(&rows, cli.format);
            println!("Page {} of {} ({} files)", files.page, files.total_pages, files.total_items);
        }
        FileCommand::Download { file_id, output: out } => {
            let (file, data) = hub.read_file(&ctx, *file_id).await?;
            tokio::fs::write(out, &data).await?;
            output::print_success(&format!(
                "Wrote '{}' ({}) to {}",
                file.name,
                human_readable_size(file.head.size_bytes),
                out.display()
            ));
        }
        FileCommand::Visibility {
            file_id,
            visibility,
        } => {
            let file = hub.set_visibility(&ctx, *file_id, *visibility).await?;
            output::print_success(&format!("File {} is now {}", file.id, file.visibility));
        }
        FileCommand::Delete { file_id } => {
            hub.delete_file(&ctx, *file_id).await?;
            output::print_success(&format!("File {file_id} deleted"));
        }
        FileCommand::Access { file_id } => {
            let access = hub.describe_access(&ctx, *file_id).await?;
            output::print_value(&access, cli.format);
        }
    }

    Ok(())
}
