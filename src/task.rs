//! Scheduled task facade - Read and write a task the way a resource
//! provider sees it: actions, account, enabled flag and manifest triggers

use crate::config::Settings;
use crate::error::{StoreResult, TriggerResult};
use crate::manifest::{self, ManifestTrigger};
use crate::models::{Compatibility, LogonType, TaskDefinition, TaskHandle};
use crate::reconcile::{self, ReconcilePlan};
use crate::store::{normalize_path, TaskStore};
use crate::v1::V1Trigger;
use crate::v2::{TriggerCollection, TriggerView};
use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, warn};

const SERVICE_ACCOUNTS: [&str; 3] = ["SYSTEM", "LOCAL SERVICE", "NETWORK SERVICE"];

/// Built-in accounts that run without a password, in canonical spelling
fn service_account(user: &str) -> Option<&'static str> {
    let user = user.trim();
    let bare = match user.get(..13) {
        Some(prefix) if prefix.eq_ignore_ascii_case("NT AUTHORITY\\") => &user[13..],
        _ => user,
    };
    SERVICE_ACCOUNTS
        .into_iter()
        .find(|account| account.eq_ignore_ascii_case(bare))
}

#[derive(Debug, Clone)]
pub struct ScheduledTask {
    handle: TaskHandle,
}

impl ScheduledTask {
    /// A new, unsaved task using the configured defaults
    pub fn create(name: &str, settings: &Settings) -> Self {
        let mut task = Self {
            handle: TaskHandle {
                name: normalize_path(name),
                definition: TaskDefinition::new(settings.default_compatibility),
            },
        };
        task.set_account_information(&settings.default_user);
        task
    }

    pub fn load(store: &dyn TaskStore, name: &str) -> StoreResult<Self> {
        Ok(Self {
            handle: store.fetch(name)?,
        })
    }

    pub fn save(&self, store: &dyn TaskStore) -> StoreResult<()> {
        store.save(&self.handle)
    }

    pub fn name(&self) -> &str {
        &self.handle.name
    }

    pub fn definition(&self) -> &TaskDefinition {
        &self.handle.definition
    }

    pub fn compatibility(&self) -> Compatibility {
        self.handle.definition.settings.compatibility
    }

    pub fn set_compatibility(&mut self, compatibility: Compatibility) {
        self.handle.definition.settings.compatibility = compatibility;
    }

    pub fn enabled(&self) -> bool {
        self.handle.definition.settings.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.handle.definition.settings.enabled = enabled;
    }

    // === Actions ===

    pub fn application_name(&self) -> Option<&str> {
        self.handle.definition.exec_action().map(|a| a.path.as_str())
    }

    pub fn set_application_name(&mut self, path: &str) {
        self.handle.definition.exec_action_mut().path = path.to_string();
    }

    pub fn parameters(&self) -> Option<&str> {
        self.handle.definition.exec_action().map(|a| a.arguments.as_str())
    }

    pub fn set_parameters(&mut self, arguments: &str) {
        self.handle.definition.exec_action_mut().arguments = arguments.to_string();
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.handle
            .definition
            .exec_action()
            .map(|a| a.working_directory.as_str())
    }

    pub fn set_working_directory(&mut self, dir: &str) {
        self.handle.definition.exec_action_mut().working_directory = dir.to_string();
    }

    // === Principal ===

    /// Account the task runs as; empty for SYSTEM
    pub fn account_information(&self) -> &str {
        let user = self.handle.definition.principal.user_id.as_str();
        match service_account(user) {
            Some("SYSTEM") => "",
            _ => user,
        }
    }

    /// Built-in service accounts (or an empty user, meaning SYSTEM) get the
    /// service-account logon type, anyone else an interactive token.
    pub fn set_account_information(&mut self, user: &str) {
        let principal = &mut self.handle.definition.principal;
        let user = if user.trim().is_empty() { "SYSTEM" } else { user };
        match service_account(user) {
            Some(account) => {
                principal.user_id = account.to_string();
                principal.logon_type = LogonType::ServiceAccount;
            }
            None => {
                principal.user_id = user.to_string();
                principal.logon_type = LogonType::InteractiveToken;
            }
        }
    }

    // === Triggers ===

    /// Every trigger that has a manifest form, tagged with its index.
    /// Triggers of kinds that cannot be represented are skipped.
    pub fn triggers(&self) -> Vec<ManifestTrigger> {
        TriggerView::new(&self.handle.definition.triggers)
            .iter()
            .filter_map(|(index, trigger)| match trigger.to_manifest_hash() {
                Ok(mut manifest) => {
                    manifest.index = Some(index);
                    Some(manifest)
                }
                Err(e) => {
                    warn!("Skipping trigger {} of {}: {}", index, self.name(), e);
                    None
                }
            })
            .collect()
    }

    pub fn append_trigger(&mut self, raw: &Value) -> TriggerResult<usize> {
        let trigger = manifest::canonicalize_and_validate(raw)?;
        self.check_representable(&trigger, Local::now().naive_local())?;
        TriggerCollection::new(&mut self.handle.definition.triggers)
            .append_canonical_at(&trigger, Local::now().date_naive())
    }

    pub fn delete_trigger(&mut self, index: usize) -> TriggerResult<()> {
        TriggerCollection::new(&mut self.handle.definition.triggers).delete(index)?;
        Ok(())
    }

    pub fn set_triggers(&mut self, desired: &[Value]) -> TriggerResult<ReconcilePlan> {
        self.set_triggers_at(desired, Local::now().naive_local())
    }

    /// Make the task's triggers match `desired`, keeping live triggers that
    /// already satisfy a desired one. Nothing is changed if any desired
    /// trigger is invalid.
    pub fn set_triggers_at(&mut self, desired: &[Value], now: NaiveDateTime) -> TriggerResult<ReconcilePlan> {
        let desired = desired
            .iter()
            .map(manifest::canonicalize_and_validate)
            .collect::<TriggerResult<Vec<_>>>()?;
        for trigger in &desired {
            trigger.ensure_writable()?;
            self.check_representable(trigger, now)?;
        }

        let plan = reconcile::reconcile(&self.triggers(), &desired);
        if plan.is_empty() {
            debug!("Triggers of {} already in sync", self.name());
            return Ok(plan);
        }
        let mut collection = TriggerCollection::new(&mut self.handle.definition.triggers);
        reconcile::apply_at(&plan, &mut collection, now.date())?;
        Ok(plan)
    }

    /// V1-compatible tasks only take what the V1 format can hold
    fn check_representable(&self, trigger: &ManifestTrigger, now: NaiveDateTime) -> TriggerResult<()> {
        if self.compatibility().is_v1_compatible() {
            V1Trigger::from_canonical_at(trigger, now)?;
        }
        Ok(())
    }
}
