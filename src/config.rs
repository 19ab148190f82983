//! Application settings

use crate::models::Compatibility;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Compatibility level given to newly created tasks
    pub default_compatibility: Compatibility,
    /// Account new tasks run as
    pub default_user: String,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_compatibility: Compatibility::V2,
            default_user: "SYSTEM".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Build settings from stored key/value pairs. Unknown keys are ignored
    /// and unparsable values keep their default.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Settings::default();
        for (key, value) in pairs {
            match key.as_str() {
                "default_compatibility" => match value.parse() {
                    Ok(level) => settings.default_compatibility = level,
                    Err(e) => tracing::warn!("Ignoring stored default_compatibility: {}", e),
                },
                "default_user" if !value.trim().is_empty() => settings.default_user = value,
                "log_filter" if !value.trim().is_empty() => settings.log_filter = value,
                _ => {}
            }
        }
        settings
    }

    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("default_compatibility", self.default_compatibility.name().to_string()),
            ("default_user", self.default_user.clone()),
            ("log_filter", self.log_filter.clone()),
        ]
    }

    /// Update one setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "default_compatibility" => self.default_compatibility = value.parse()?,
            "default_user" => self.default_user = value.to_string(),
            "log_filter" => self.log_filter = value.to_string(),
            _ => return Err(format!("Unknown setting '{key}'")),
        }
        Ok(())
    }
}
