//! Schtask Sync - Main entry point

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use schtask_sync_lib::commands::{self, TaskResource};
use schtask_sync_lib::storage::Database;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{CliArgs, Command, SettingsAction};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let db_path = match args.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open task store {}", db_path.display()))?;
    let settings = db.get_settings().context("failed to load settings")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)))
        .init();

    tracing::debug!("Task store: {:?}", db_path);

    match args.command {
        Command::List {
            folder,
            recurse,
            compatibility,
        } => {
            for name in commands::list_tasks(&db, &folder, recurse, compatibility)? {
                println!("{name}");
            }
        }
        Command::Show { name } => {
            print_json(&commands::show_task(&db, &name).with_context(|| format!("failed to read task '{name}'"))?)?;
        }
        Command::Apply { file } => {
            let resource = read_resource(&file)?;
            let outcome = commands::apply_resource(&db, &settings, &resource)
                .with_context(|| format!("failed to apply task '{}'", resource.name))?;
            print_json(&outcome)?;
        }
        Command::Delete { name } => {
            commands::delete_task(&db, &name).with_context(|| format!("failed to delete task '{name}'"))?;
        }
        Command::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => print_json(&settings)?,
            SettingsAction::Set { key, value } => {
                let mut updated = settings.clone();
                updated.set(&key, &value).map_err(anyhow::Error::msg)?;
                db.save_settings(&updated).context("failed to save settings")?;
                print_json(&updated)?;
            }
        },
    }

    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("could not determine the user data directory")?;
    Ok(data_dir.join("schtask-sync").join("tasks.db"))
}

fn read_resource(file: &Path) -> Result<TaskResource> {
    let text = if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read resource from stdin")?;
        text
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
    };
    serde_json::from_str(&text).context("invalid task resource")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
