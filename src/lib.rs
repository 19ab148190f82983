//! Schtask Sync - Core library
//!
//! Translates scheduled task triggers between a declarative manifest form
//! and the V1 / V2 trigger models, and reconciles a task's live triggers
//! against a desired list.

pub mod bitmask;
pub mod commands;
pub mod config;
pub mod duration;
pub mod error;
pub mod manifest;
pub mod models;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod task;
pub mod v1;
pub mod v2;

pub use error::{StoreError, TriggerError};
pub use manifest::{canonicalize_and_validate, ManifestTrigger};
pub use task::ScheduledTask;
