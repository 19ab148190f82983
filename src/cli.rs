use clap::{Parser, Subcommand};
use schtask_sync_lib::models::Compatibility;
use std::path::PathBuf;

/// Translate and reconcile scheduled task triggers.
///
/// Tasks live in a local SQLite task store; `apply` brings a task in line
/// with a JSON resource description.
#[derive(Parser, Debug)]
#[command(name = "schtask-sync", version, about = "Reconcile scheduled task triggers")]
pub struct CliArgs {
    /// Task store database (default: <data dir>/schtask-sync/tasks.db)
    #[arg(long, env = "SCHTASK_SYNC_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List task paths in a folder
    List {
        #[arg(long, default_value = "\\")]
        folder: String,

        /// Include sub-folders
        #[arg(long)]
        recurse: bool,

        /// Only tasks at this compatibility level (AT, V1, V2, V2_1 ...)
        #[arg(long)]
        compatibility: Option<Compatibility>,
    },

    /// Print a task and its triggers as JSON
    Show { name: String },

    /// Create or update a task from a JSON resource file ("-" for stdin)
    Apply { file: PathBuf },

    /// Delete a task
    Delete { name: String },

    /// Show or change stored settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    Set { key: String, value: String },
}
