//! Task store - Named task definitions grouped in folders
//!
//! Task names are backslash-separated paths (`\Folder\Task`) compared
//! case-insensitively.

use crate::error::{StoreError, StoreResult};
use crate::models::{Compatibility, TaskDefinition, TaskHandle};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait TaskStore {
    /// Task paths directly inside `folder` (or anywhere below it with
    /// `recurse`), optionally limited to one compatibility level
    fn enumerate(
        &self,
        folder: &str,
        recurse: bool,
        compatibility: Option<Compatibility>,
    ) -> StoreResult<Vec<String>>;

    fn exists(&self, name: &str) -> StoreResult<bool>;

    fn fetch(&self, name: &str) -> StoreResult<TaskHandle>;

    /// Insert or replace the task under `handle.name`
    fn save(&self, handle: &TaskHandle) -> StoreResult<()>;

    fn delete(&self, name: &str) -> StoreResult<()>;

    /// Register a new, empty task
    fn create(&self, name: &str, definition: TaskDefinition) -> StoreResult<TaskHandle> {
        if self.exists(name)? {
            return Err(StoreError::AlreadyExists(normalize_path(name)));
        }
        let handle = TaskHandle {
            name: normalize_path(name),
            definition,
        };
        self.save(&handle)?;
        Ok(handle)
    }
}

/// `a/b\\c\` -> `\a\b\c`
pub fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path
        .split(['\\', '/'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    format!("\\{}", parts.join("\\"))
}

/// Case-insensitive lookup key for a task path
pub fn path_key(path: &str) -> String {
    normalize_path(path).to_lowercase()
}

/// Whether `task_path` sits in `folder` (directly, or anywhere below with `recurse`)
pub fn in_folder(task_path: &str, folder: &str, recurse: bool) -> bool {
    let task_key = path_key(task_path);
    let folder_key = path_key(folder);
    let prefix = if folder_key == "\\" {
        folder_key
    } else {
        format!("{folder_key}\\")
    };
    match task_key.strip_prefix(&prefix) {
        Some(rest) if !rest.is_empty() => recurse || !rest.contains('\\'),
        _ => false,
    }
}

/// Store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<BTreeMap<String, TaskHandle>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks(&self) -> MutexGuard<'_, BTreeMap<String, TaskHandle>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for MemoryTaskStore {
    fn enumerate(
        &self,
        folder: &str,
        recurse: bool,
        compatibility: Option<Compatibility>,
    ) -> StoreResult<Vec<String>> {
        Ok(self
            .tasks()
            .values()
            .filter(|handle| in_folder(&handle.name, folder, recurse))
            .filter(|handle| {
                compatibility.map_or(true, |c| handle.definition.settings.compatibility == c)
            })
            .map(|handle| handle.name.clone())
            .collect())
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.tasks().contains_key(&path_key(name)))
    }

    fn fetch(&self, name: &str) -> StoreResult<TaskHandle> {
        self.tasks()
            .get(&path_key(name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(normalize_path(name)))
    }

    fn save(&self, handle: &TaskHandle) -> StoreResult<()> {
        let mut stored = handle.clone();
        stored.name = normalize_path(&handle.name);
        tracing::info!("Saving task {}", stored.name);
        self.tasks().insert(path_key(&stored.name), stored);
        Ok(())
    }

    fn delete(&self, name: &str) -> StoreResult<()> {
        match self.tasks().remove(&path_key(name)) {
            Some(handle) => {
                tracing::info!("Deleted task {}", handle.name);
                Ok(())
            }
            None => Err(StoreError::NotFound(normalize_path(name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[(&str, Compatibility)]) -> MemoryTaskStore {
        let store = MemoryTaskStore::new();
        for (name, compatibility) in names {
            store.create(name, TaskDefinition::new(*compatibility)).unwrap();
        }
        store
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("Backup"), "\\Backup");
        assert_eq!(normalize_path("/Vendor//Nightly/"), "\\Vendor\\Nightly");
        assert_eq!(normalize_path("\\"), "\\");
        assert_eq!(path_key("\\Vendor\\Nightly"), path_key("vendor/NIGHTLY"));
    }

    #[test]
    fn test_in_folder() {
        assert!(in_folder("\\Backup", "\\", false));
        assert!(!in_folder("\\Vendor\\Nightly", "\\", false));
        assert!(in_folder("\\Vendor\\Nightly", "\\", true));
        assert!(in_folder("\\Vendor\\Nightly", "\\vendor", false));
        assert!(!in_folder("\\VendorX\\Nightly", "\\Vendor", true));
        assert!(!in_folder("\\Vendor", "\\Vendor", true));
    }

    #[test]
    fn test_enumerate_filters() {
        let store = store_with(&[
            ("\\Backup", Compatibility::V1),
            ("\\Vendor\\Nightly", Compatibility::V2),
            ("\\Vendor\\Deep\\Weekly", Compatibility::V2_1),
        ]);
        assert_eq!(store.enumerate("\\", false, None).unwrap(), vec!["\\Backup"]);
        assert_eq!(store.enumerate("\\", true, None).unwrap().len(), 3);
        assert_eq!(
            store.enumerate("\\", true, Some(Compatibility::V2)).unwrap(),
            vec!["\\Vendor\\Nightly"]
        );
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let store = store_with(&[("\\Backup", Compatibility::V2)]);
        assert!(store.exists("\\BACKUP").unwrap());
        assert_eq!(store.fetch("backup").unwrap().name, "\\Backup");
        assert!(matches!(
            store.create("\\backup", TaskDefinition::default()),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_save_fetch_delete() {
        let store = store_with(&[("\\Backup", Compatibility::V2)]);
        let mut handle = store.fetch("\\Backup").unwrap();
        handle.definition.settings.enabled = false;
        store.save(&handle).unwrap();
        assert!(!store.fetch("\\Backup").unwrap().definition.settings.enabled);

        store.delete("\\Backup").unwrap();
        assert!(!store.exists("\\Backup").unwrap());
        assert!(matches!(store.delete("\\Backup"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.fetch("\\Backup"), Err(StoreError::NotFound(_))));
    }
}
