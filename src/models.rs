//! Data models for scheduled task definitions

use crate::v2::{V2Trigger, V2TriggerType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task definition format level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    At = 0,
    V1 = 1,
    #[default]
    V2 = 2,
    V2_1 = 3,
    V2_2 = 4,
    V2_3 = 5,
    V2_4 = 6,
}

impl Compatibility {
    pub const ALL: [Compatibility; 7] = [
        Compatibility::At,
        Compatibility::V1,
        Compatibility::V2,
        Compatibility::V2_1,
        Compatibility::V2_2,
        Compatibility::V2_3,
        Compatibility::V2_4,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Compatibility::At => "AT",
            Compatibility::V1 => "V1",
            Compatibility::V2 => "V2",
            Compatibility::V2_1 => "V2_1",
            Compatibility::V2_2 => "V2_2",
            Compatibility::V2_3 => "V2_3",
            Compatibility::V2_4 => "V2_4",
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Compatibility::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Tasks at this level can only hold what the V1 format can express
    pub fn is_v1_compatible(self) -> bool {
        self <= Compatibility::V1
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compatibility {
    type Err = String;

    /// Accepts a level name (`v2_1`, `V1`, ...) or its numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Compatibility::from_code(code)
                .ok_or_else(|| format!("Unknown compatibility level {code}"));
        }
        Compatibility::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown compatibility level '{s}'"))
    }
}

/// Program launched by an EXEC action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecAction {
    pub path: String,
    #[serde(default)]
    pub arguments: String,
    #[serde(default)]
    pub working_directory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Exec(ExecAction),
    ComHandler {
        class_id: String,
        #[serde(default)]
        data: String,
    },
}

/// TASK_LOGON_TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogonType {
    None = 0,
    Password = 1,
    S4u = 2,
    #[default]
    InteractiveToken = 3,
    Group = 4,
    ServiceAccount = 5,
    InteractiveTokenOrPassword = 6,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub logon_type: LogonType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSettings {
    pub enabled: bool,
    pub compatibility: Compatibility,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            compatibility: Compatibility::default(),
        }
    }
}

/// A task's trigger collection, indexed from 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerSlots {
    items: Vec<V2Trigger>,
}

impl TriggerSlots {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, index: usize) -> Option<&V2Trigger> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Append a blank trigger of `kind` and hand it back for filling in
    pub fn create(&mut self, kind: V2TriggerType) -> &mut V2Trigger {
        self.items.push(V2Trigger::create(kind));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn remove(&mut self, index: usize) -> Option<V2Trigger> {
        if index == 0 || index > self.items.len() {
            return None;
        }
        Some(self.items.remove(index - 1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub principal: Principal,
    #[serde(default)]
    pub settings: TaskSettings,
    #[serde(default)]
    pub triggers: TriggerSlots,
}

impl TaskDefinition {
    pub fn new(compatibility: Compatibility) -> Self {
        Self {
            settings: TaskSettings {
                compatibility,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// First EXEC action, if any
    pub fn exec_action(&self) -> Option<&ExecAction> {
        self.actions.iter().find_map(|action| match action {
            Action::Exec(exec) => Some(exec),
            _ => None,
        })
    }

    /// First EXEC action, appending an empty one when there is none
    pub fn exec_action_mut(&mut self) -> &mut ExecAction {
        let position = match self.actions.iter().position(|a| matches!(a, Action::Exec(_))) {
            Some(position) => position,
            None => {
                self.actions.push(Action::Exec(ExecAction::default()));
                self.actions.len() - 1
            }
        };
        match &mut self.actions[position] {
            Action::Exec(exec) => exec,
            Action::ComHandler { .. } => unreachable!("position points at an EXEC action"),
        }
    }
}

/// A named task definition as handed out by a task store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    /// Full task path, e.g. `\Folder\Name`
    pub name: String,
    pub definition: TaskDefinition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility_parsing() {
        assert_eq!("v2_1".parse::<Compatibility>().unwrap(), Compatibility::V2_1);
        assert_eq!("1".parse::<Compatibility>().unwrap(), Compatibility::V1);
        assert!("v3".parse::<Compatibility>().is_err());
        assert!("9".parse::<Compatibility>().is_err());
    }

    #[test]
    fn test_v1_compatible_levels() {
        assert!(Compatibility::At.is_v1_compatible());
        assert!(Compatibility::V1.is_v1_compatible());
        assert!(!Compatibility::V2.is_v1_compatible());
        assert!(!Compatibility::V2_4.is_v1_compatible());
    }

    #[test]
    fn test_trigger_slots_are_one_based() {
        let mut slots = TriggerSlots::default();
        slots.create(V2TriggerType::Daily);
        slots.create(V2TriggerType::Boot);
        assert_eq!(slots.count(), 2);
        assert!(slots.item(0).is_none());
        assert_eq!(slots.item(1).map(V2Trigger::trigger_type), Some(V2TriggerType::Daily));
        assert_eq!(slots.item(2).map(V2Trigger::trigger_type), Some(V2TriggerType::Boot));
        assert!(slots.item(3).is_none());

        assert!(slots.remove(0).is_none());
        assert!(slots.remove(3).is_none());
        assert_eq!(slots.remove(1).map(|t| t.trigger_type()), Some(V2TriggerType::Daily));
        assert_eq!(slots.count(), 1);
    }

    #[test]
    fn test_exec_action_is_created_on_write() {
        let mut definition = TaskDefinition::new(Compatibility::V1);
        definition.actions.push(Action::ComHandler {
            class_id: "{0000}".into(),
            data: String::new(),
        });
        assert!(definition.exec_action().is_none());

        definition.exec_action_mut().path = "C:\\Windows\\notepad.exe".into();
        definition.exec_action_mut().arguments = "a.txt".into();
        assert_eq!(definition.actions.len(), 2);
        let exec = definition.exec_action().unwrap();
        assert_eq!(exec.path, "C:\\Windows\\notepad.exe");
        assert_eq!(exec.arguments, "a.txt");
    }

    #[test]
    fn test_definition_json_shape() {
        let mut definition = TaskDefinition::new(Compatibility::V2_1);
        definition.exec_action_mut().path = "cmd.exe".into();
        definition.triggers.create(V2TriggerType::Time);
        let value = serde_json::to_value(&definition).unwrap();
        assert_eq!(value["settings"]["compatibility"], "v2_1");
        assert_eq!(value["actions"][0]["type"], "exec");
        assert_eq!(value["triggers"][0]["Type"], "Time");
        assert_eq!(serde_json::from_value::<TaskDefinition>(value).unwrap(), definition);
    }
}
