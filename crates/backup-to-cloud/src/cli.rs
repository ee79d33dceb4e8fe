use std::path::PathBuf;

use backup_to_cloud::config::DEFAULT_FILTER;
use clap::{Parser, Subcommand};

/// Uploads backups to Google Drive.
#[derive(Debug, Parser)]
#[command(name = "backup-to-cloud", version)]
pub struct Cli {
    /// The directory holding backup.toml, token.json and the logs.
    #[arg(long, global = true, env = "BTC_ROOT_PATH", default_value = ".")]
    pub root_path: PathBuf,

    /// The OAuth client secrets, defaults to <ROOT_PATH>/credentials.json.
    #[arg(long, global = true, env = "BTC_CREDENTIALS_PATH")]
    pub credentials_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates a backup and uploads it to Google Drive.
    CreateBackup,

    /// Checks the backup entries without uploading anything.
    CheckSettings,

    /// Checks which files are caught by a regex.
    CheckRegex {
        /// The folder to search.
        #[arg(value_name = "ROOT_PATH")]
        path: PathBuf,

        /// The filter to apply to each file's full path.
        #[arg(default_value = DEFAULT_FILTER)]
        regex: String,
    },

    /// Generates a new token.
    GenToken,

    /// Writes an example backup.toml.
    Init,
}
