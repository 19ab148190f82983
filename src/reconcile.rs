//! Trigger reconciler - Match live triggers against desired ones
//!
//! Matching is greedy and runs in two independent passes: each current
//! trigger claims the first unclaimed equivalent desired trigger, then each
//! desired trigger claims the first unclaimed equivalent current trigger.
//! Unclaimed current triggers are deleted (highest index first) and
//! unclaimed desired triggers are appended afterwards.

use crate::error::TriggerResult;
use crate::manifest::{ManifestTrigger, ScheduleDetails};
use crate::v1::V1TriggerType;
use crate::v2::{TriggerCollection, V2Trigger};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Whether the live trigger `current` already satisfies `desired`.
///
/// Fields left out of `desired` (start date, `every`, `months`,
/// `day_of_week`) take the value of `current`. A disabled `current` never
/// matches.
pub fn triggers_same(current: &ManifestTrigger, desired: &ManifestTrigger) -> bool {
    if current.schedule() != desired.schedule() || !current.enabled {
        return false;
    }
    if V1TriggerType::for_manifest(current) != V1TriggerType::for_manifest(desired) {
        return false;
    }

    let mut current = current.clone();
    current.index = None;
    fill_unspecified(desired, &current) == current
}

fn fill_unspecified(desired: &ManifestTrigger, current: &ManifestTrigger) -> ManifestTrigger {
    let mut filled = desired.clone();
    filled.index = None;
    if filled.start_date.is_none() {
        filled.start_date = current.start_date;
    }

    match (&mut filled.details, &current.details) {
        (ScheduleDetails::Daily { every }, ScheduleDetails::Daily { every: live }) => {
            fill(every, live);
        }
        (
            ScheduleDetails::Weekly { every, day_of_week },
            ScheduleDetails::Weekly {
                every: live_every,
                day_of_week: live_days,
            },
        ) => {
            fill(every, live_every);
            fill(day_of_week, live_days);
        }
        (
            ScheduleDetails::MonthlyDate { months, .. },
            ScheduleDetails::MonthlyDate { months: live, .. },
        )
        | (
            ScheduleDetails::MonthlyDow { months, .. },
            ScheduleDetails::MonthlyDow { months: live, .. },
        ) => {
            fill(months, live);
        }
        _ => {}
    }
    filled
}

fn fill<T: Clone>(field: &mut Option<T>, live: &Option<T>) {
    if field.is_none() {
        field.clone_from(live);
    }
}

/// Operations that turn the current trigger list into the desired one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Indexes into the live collection, descending
    pub to_delete: Vec<usize>,
    pub to_add: Vec<ManifestTrigger>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the delete/append plan. A current trigger is identified by its
/// `index` when it has one, by its position in `current` otherwise.
pub fn reconcile(current: &[ManifestTrigger], desired: &[ManifestTrigger]) -> ReconcilePlan {
    let mut unclaimed_desired: Vec<&ManifestTrigger> = desired.iter().collect();
    let mut to_delete = Vec::new();
    for (position, trigger) in current.iter().enumerate() {
        match unclaimed_desired.iter().position(|d| triggers_same(trigger, d)) {
            Some(found) => {
                unclaimed_desired.remove(found);
            }
            None => to_delete.push(trigger.index.unwrap_or(position)),
        }
    }

    let mut unclaimed_current: Vec<&ManifestTrigger> = current.iter().collect();
    let mut to_add = Vec::new();
    for trigger in desired {
        match unclaimed_current.iter().position(|c| triggers_same(c, trigger)) {
            Some(found) => {
                unclaimed_current.remove(found);
            }
            None => to_add.push(trigger.clone()),
        }
    }

    to_delete.sort_unstable_by(|a, b| b.cmp(a));
    debug!(
        ?to_delete,
        to_add = to_add.len(),
        "Computed trigger reconcile plan"
    );
    ReconcilePlan { to_delete, to_add }
}

pub fn apply(plan: &ReconcilePlan, triggers: &mut TriggerCollection<'_>) -> TriggerResult<()> {
    apply_at(plan, triggers, Local::now().date_naive())
}

/// Run `plan` against a live collection: deletes first, then appends.
/// Every addition is converted before the collection is touched.
pub fn apply_at(
    plan: &ReconcilePlan,
    triggers: &mut TriggerCollection<'_>,
    today: NaiveDate,
) -> TriggerResult<()> {
    let additions = plan
        .to_add
        .iter()
        .map(|trigger| V2Trigger::from_manifest_at(trigger, today))
        .collect::<TriggerResult<Vec<_>>>()?;

    for &index in &plan.to_delete {
        let removed = triggers.delete(index)?;
        info!("Deleted trigger {} ({})", index, removed.trigger_type());
    }
    for trigger in additions {
        let kind = trigger.trigger_type();
        let index = triggers.append(trigger);
        info!("Appended trigger {} ({})", index, kind);
    }
    Ok(())
}
