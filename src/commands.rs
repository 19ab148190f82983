//! Command handlers - Task store operations behind the CLI

use crate::config::Settings;
use crate::error::{StoreResult, TriggerError, TriggerResult};
use crate::manifest::ManifestTrigger;
use crate::models::Compatibility;
use crate::store::TaskStore;
use crate::task::ScheduledTask;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Desired state of one scheduled task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResource {
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub compatibility: Option<Compatibility>,
    /// One trigger hash or a list of them
    #[serde(default)]
    pub trigger: Value,
}

/// Current state of one scheduled task
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub enabled: bool,
    pub compatibility: Compatibility,
    pub command: Option<String>,
    pub arguments: Option<String>,
    pub working_dir: Option<String>,
    pub user: String,
    pub triggers: Vec<ManifestTrigger>,
}

impl From<&ScheduledTask> for TaskSummary {
    fn from(task: &ScheduledTask) -> Self {
        Self {
            name: task.name().to_string(),
            enabled: task.enabled(),
            compatibility: task.compatibility(),
            command: task.application_name().map(str::to_string),
            arguments: task.parameters().map(str::to_string),
            working_dir: task.working_directory().map(str::to_string),
            user: task.account_information().to_string(),
            triggers: task.triggers(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub name: String,
    pub created: bool,
    pub deleted_triggers: Vec<usize>,
    pub added_triggers: Vec<ManifestTrigger>,
}

/// Flatten a resource's `trigger` value into a list of trigger hashes
pub fn trigger_list(value: &Value) -> TriggerResult<Vec<Value>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.clone()),
        Value::Object(_) => Ok(vec![value.clone()]),
        _ => Err(TriggerError::type_error(
            "trigger must be a hash or a list of hashes",
        )),
    }
}

pub fn list_tasks(
    store: &dyn TaskStore,
    folder: &str,
    recurse: bool,
    compatibility: Option<Compatibility>,
) -> StoreResult<Vec<String>> {
    store.enumerate(folder, recurse, compatibility)
}

pub fn show_task(store: &dyn TaskStore, name: &str) -> StoreResult<TaskSummary> {
    let task = ScheduledTask::load(store, name)?;
    Ok(TaskSummary::from(&task))
}

/// Create or update a task so it matches `resource`
pub fn apply_resource(
    store: &dyn TaskStore,
    settings: &Settings,
    resource: &TaskResource,
) -> StoreResult<ApplyOutcome> {
    let desired = trigger_list(&resource.trigger)?;
    let created = !store.exists(&resource.name)?;
    let mut task = if created {
        ScheduledTask::create(&resource.name, settings)
    } else {
        ScheduledTask::load(store, &resource.name)?
    };

    if let Some(compatibility) = resource.compatibility {
        task.set_compatibility(compatibility);
    }
    if let Some(enabled) = resource.enabled {
        task.set_enabled(enabled);
    }
    if let Some(command) = &resource.command {
        task.set_application_name(command);
    }
    if let Some(arguments) = &resource.arguments {
        task.set_parameters(arguments);
    }
    if let Some(dir) = &resource.working_dir {
        task.set_working_directory(dir);
    }
    if let Some(user) = &resource.user {
        task.set_account_information(user);
    }

    let plan = task.set_triggers(&desired)?;
    task.save(store)?;
    tracing::info!(
        "Applied {}: {} trigger(s) deleted, {} appended",
        task.name(),
        plan.to_delete.len(),
        plan.to_add.len()
    );

    Ok(ApplyOutcome {
        name: task.name().to_string(),
        created,
        deleted_triggers: plan.to_delete,
        added_triggers: plan.to_add,
    })
}

pub fn delete_task(store: &dyn TaskStore, name: &str) -> StoreResult<()> {
    store.delete(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryTaskStore;
    use serde_json::json;

    fn resource(value: Value) -> TaskResource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_trigger_list_shapes() {
        assert!(trigger_list(&Value::Null).unwrap().is_empty());
        assert_eq!(trigger_list(&json!({"schedule": "once"})).unwrap().len(), 1);
        assert_eq!(trigger_list(&json!([{}, {}])).unwrap().len(), 2);
        assert!(matches!(trigger_list(&json!("daily")), Err(TriggerError::Type(_))));
    }

    #[test]
    fn test_apply_creates_then_converges() {
        let store = MemoryTaskStore::new();
        let backup = resource(json!({
            "name": "\\Vendor\\Backup",
            "command": "C:\\backup.exe",
            "arguments": "/all",
            "trigger": [
                {"schedule": "daily", "start_date": "2011-9-12", "start_time": "2:00 am"},
                {"schedule": "weekly", "start_time": "23:00", "day_of_week": ["sat"]},
            ],
        }));

        let first = apply_resource(&store, &Settings::default(), &backup).unwrap();
        assert!(first.created);
        assert_eq!(first.added_triggers.len(), 2);

        let second = apply_resource(&store, &Settings::default(), &backup).unwrap();
        assert!(!second.created);
        assert!(second.deleted_triggers.is_empty());
        assert!(second.added_triggers.is_empty());

        let summary = show_task(&store, "\\vendor\\backup").unwrap();
        assert_eq!(summary.command.as_deref(), Some("C:\\backup.exe"));
        assert_eq!(summary.user, "");
        assert_eq!(summary.compatibility, Compatibility::V2);
        assert_eq!(summary.triggers.len(), 2);
    }

    #[test]
    fn test_apply_with_bad_trigger_saves_nothing() {
        let store = MemoryTaskStore::new();
        let bad = resource(json!({
            "name": "Backup",
            "trigger": {"schedule": "daily", "start_time": "10:00", "colour": "red"},
        }));
        let err = apply_resource(&store, &Settings::default(), &bad).unwrap_err();
        assert!(matches!(err, StoreError::Trigger(TriggerError::UnknownOptions(_))));
        assert!(!store.exists("Backup").unwrap());
    }

    #[test]
    fn test_list_and_delete() {
        let store = MemoryTaskStore::new();
        for name in ["A", "Vendor\\B"] {
            apply_resource(&store, &Settings::default(), &resource(json!({"name": name}))).unwrap();
        }
        assert_eq!(list_tasks(&store, "\\", true, None).unwrap().len(), 2);
        assert_eq!(list_tasks(&store, "\\", false, None).unwrap(), vec!["\\A"]);
        delete_task(&store, "\\A").unwrap();
        assert!(matches!(show_task(&store, "\\A"), Err(StoreError::NotFound(_))));
    }
}
