//! Storage module - SQLite database operations

use crate::config::Settings;
use crate::error::{StoreError, StoreResult};
use crate::models::{Compatibility, TaskDefinition, TaskHandle};
use crate::store::{in_folder, normalize_path, path_key, TaskStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create database at path
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run database migrations
    fn run_migrations(&self) -> StoreResult<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                name_key TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                compatibility INTEGER NOT NULL,
                definition TEXT NOT NULL,
                updated_at_utc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    // === Settings ===

    pub fn get_settings(&self) -> StoreResult<Settings> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Settings::from_pairs(rows))
    }

    pub fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        let conn = self.conn();
        for (key, value) in settings.to_pairs() {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tracing::info!("Settings saved");
        Ok(())
    }
}

impl TaskStore for Database {
    fn enumerate(
        &self,
        folder: &str,
        recurse: bool,
        compatibility: Option<Compatibility>,
    ) -> StoreResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name, compatibility FROM tasks ORDER BY name_key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter(|(name, _)| in_folder(name, folder, recurse))
            .filter(|(_, code)| compatibility.map_or(true, |c| c.code() == *code))
            .map(|(name, _)| name)
            .collect())
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM tasks WHERE name_key = ?1",
                params![path_key(name)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn fetch(&self, name: &str) -> StoreResult<TaskHandle> {
        let row = self
            .conn()
            .query_row(
                "SELECT name, definition FROM tasks WHERE name_key = ?1",
                params![path_key(name)],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let (name, definition) = row.ok_or_else(|| StoreError::NotFound(normalize_path(name)))?;
        let definition: TaskDefinition = serde_json::from_str(&definition)?;
        Ok(TaskHandle { name, definition })
    }

    fn save(&self, handle: &TaskHandle) -> StoreResult<()> {
        let name = normalize_path(&handle.name);
        let definition = serde_json::to_string(&handle.definition)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO tasks (name_key, name, compatibility, definition, updated_at_utc)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                path_key(&name),
                name,
                handle.definition.settings.compatibility.code(),
                definition,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        tracing::info!("Saved task {}", name);
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        let deleted = self
            .conn()
            .execute("DELETE FROM tasks WHERE name_key = ?1", params![path_key(name)])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(normalize_path(name)));
        }
        tracing::info!("Deleted task {}", normalize_path(name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v2::V2TriggerType;

    #[test]
    fn test_settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_settings().unwrap(), Settings::default());

        let settings = Settings {
            default_compatibility: Compatibility::V1,
            default_user: "NETWORK SERVICE".into(),
            log_filter: "debug".into(),
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.get_settings().unwrap(), settings);
    }

    #[test]
    fn test_task_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut handle = db.create("\\Vendor\\Nightly", TaskDefinition::new(Compatibility::V2_1)).unwrap();
        handle.definition.exec_action_mut().path = "backup.exe".into();
        handle.definition.triggers.create(V2TriggerType::Weekly);
        db.save(&handle).unwrap();

        let fetched = db.fetch("\\VENDOR\\nightly").unwrap();
        assert_eq!(fetched, handle);
        assert_eq!(fetched.name, "\\Vendor\\Nightly");
    }

    #[test]
    fn test_enumerate_and_delete() {
        let db = Database::open_in_memory().unwrap();
        db.create("\\Backup", TaskDefinition::new(Compatibility::V1)).unwrap();
        db.create("\\Vendor\\Nightly", TaskDefinition::new(Compatibility::V2)).unwrap();

        assert_eq!(db.enumerate("\\", false, None).unwrap(), vec!["\\Backup"]);
        assert_eq!(
            db.enumerate("\\", true, Some(Compatibility::V2)).unwrap(),
            vec!["\\Vendor\\Nightly"]
        );

        db.delete("\\backup").unwrap();
        assert!(!db.exists("\\Backup").unwrap());
        assert!(matches!(db.delete("\\Backup"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        {
            let db = Database::open(&path).unwrap();
            db.create("\\Backup", TaskDefinition::new(Compatibility::V2)).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.exists("\\Backup").unwrap());
    }
}
