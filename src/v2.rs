//! V2 trigger model - Per-type trigger objects with ISO-8601 boundaries
//!
//! Each concrete trigger kind is its own struct sharing a [`TriggerBase`]
//! (boundaries, repetition, enabled). [`V2Trigger`] selects between them.
//! A task definition keeps its triggers in 1-based slots; [`TriggerView`] and
//! [`TriggerCollection`] expose them 0-based.

use crate::bitmask::{day, days_of_month, month, occurrence, Day, Occurrence};
use crate::duration;
use crate::error::{TriggerError, TriggerResult};
use crate::manifest::{self, ManifestTrigger, ScheduleDetails};
use crate::models::TriggerSlots;
use crate::v1::{flags, V1Trigger, V1TriggerType};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Local time, no offset
pub const BOUNDARY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum V2TriggerType {
    Event = 0,
    Time = 1,
    Daily = 2,
    Weekly = 3,
    Monthly = 4,
    MonthlyDow = 5,
    Idle = 6,
    Registration = 7,
    Boot = 8,
    Logon = 9,
    SessionStateChange = 11,
    CustomTrigger01 = 12,
}

impl V2TriggerType {
    pub const ALL: [V2TriggerType; 12] = [
        V2TriggerType::Event,
        V2TriggerType::Time,
        V2TriggerType::Daily,
        V2TriggerType::Weekly,
        V2TriggerType::Monthly,
        V2TriggerType::MonthlyDow,
        V2TriggerType::Idle,
        V2TriggerType::Registration,
        V2TriggerType::Boot,
        V2TriggerType::Logon,
        V2TriggerType::SessionStateChange,
        V2TriggerType::CustomTrigger01,
    ];

    pub fn name(self) -> &'static str {
        match self {
            V2TriggerType::Event => "TASK_TRIGGER_EVENT",
            V2TriggerType::Time => "TASK_TRIGGER_TIME",
            V2TriggerType::Daily => "TASK_TRIGGER_DAILY",
            V2TriggerType::Weekly => "TASK_TRIGGER_WEEKLY",
            V2TriggerType::Monthly => "TASK_TRIGGER_MONTHLY",
            V2TriggerType::MonthlyDow => "TASK_TRIGGER_MONTHLYDOW",
            V2TriggerType::Idle => "TASK_TRIGGER_IDLE",
            V2TriggerType::Registration => "TASK_TRIGGER_REGISTRATION",
            V2TriggerType::Boot => "TASK_TRIGGER_BOOT",
            V2TriggerType::Logon => "TASK_TRIGGER_LOGON",
            V2TriggerType::SessionStateChange => "TASK_TRIGGER_SESSION_STATE_CHANGE",
            V2TriggerType::CustomTrigger01 => "TASK_TRIGGER_CUSTOM_TRIGGER_01",
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> TriggerResult<Self> {
        V2TriggerType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| TriggerError::UnknownTriggerType(code.to_string()))
    }

    /// Same monthly split as the V1 mapping: MONTHLYDOW when the trigger
    /// names an occurrence, MONTHLY otherwise.
    pub fn for_manifest(trigger: &ManifestTrigger) -> Self {
        match trigger.details {
            ScheduleDetails::Once => V2TriggerType::Time,
            ScheduleDetails::Daily { .. } => V2TriggerType::Daily,
            ScheduleDetails::Weekly { .. } => V2TriggerType::Weekly,
            ScheduleDetails::MonthlyDate { .. } => V2TriggerType::Monthly,
            ScheduleDetails::MonthlyDow { .. } => V2TriggerType::MonthlyDow,
            ScheduleDetails::Boot => V2TriggerType::Boot,
            ScheduleDetails::Logon { .. } => V2TriggerType::Logon,
        }
    }

    /// The V1 type with the same meaning, if there is one
    pub fn to_v1(self) -> Option<V1TriggerType> {
        match self {
            V2TriggerType::Time => Some(V1TriggerType::Once),
            V2TriggerType::Daily => Some(V1TriggerType::Daily),
            V2TriggerType::Weekly => Some(V1TriggerType::Weekly),
            V2TriggerType::Monthly => Some(V1TriggerType::MonthlyDate),
            V2TriggerType::MonthlyDow => Some(V1TriggerType::MonthlyDow),
            V2TriggerType::Idle => Some(V1TriggerType::OnIdle),
            V2TriggerType::Boot => Some(V1TriggerType::AtSystemStart),
            V2TriggerType::Logon => Some(V1TriggerType::AtLogon),
            _ => None,
        }
    }

    pub fn from_v1(v1: V1TriggerType) -> Self {
        match v1 {
            V1TriggerType::Once => V2TriggerType::Time,
            V1TriggerType::Daily => V2TriggerType::Daily,
            V1TriggerType::Weekly => V2TriggerType::Weekly,
            V1TriggerType::MonthlyDate => V2TriggerType::Monthly,
            V1TriggerType::MonthlyDow => V2TriggerType::MonthlyDow,
            V1TriggerType::OnIdle => V2TriggerType::Idle,
            V1TriggerType::AtSystemStart => V2TriggerType::Boot,
            V1TriggerType::AtLogon => V2TriggerType::Logon,
        }
    }
}

impl fmt::Display for V2TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Intra-day repetition; empty strings mean "not set"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepetitionPattern {
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub stop_at_duration_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerBase {
    #[serde(default)]
    pub start_boundary: String,
    #[serde(default)]
    pub end_boundary: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub repetition: RepetitionPattern,
}

fn default_enabled() -> bool {
    true
}

impl Default for TriggerBase {
    fn default() -> Self {
        Self {
            start_boundary: String::new(),
            end_boundary: String::new(),
            enabled: true,
            repetition: RepetitionPattern::default(),
        }
    }
}

/// Trigger kinds with no fields beyond the common ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(default)]
    pub days_interval: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(default)]
    pub days_of_week: u32,
    #[serde(default)]
    pub weeks_interval: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlyTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    /// Bits 0-30 only; the last day lives in `run_on_last_day_of_month`
    #[serde(default)]
    pub days_of_month: u32,
    #[serde(default)]
    pub months_of_year: u32,
    #[serde(default)]
    pub run_on_last_day_of_month: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlyDowTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(default)]
    pub days_of_week: u32,
    #[serde(default)]
    pub months_of_year: u32,
    #[serde(default)]
    pub weeks_of_month: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogonTrigger {
    #[serde(flatten)]
    pub base: TriggerBase,
    #[serde(default)]
    pub user_id: String,
}

/// Boundary and repetition access shared by every trigger kind
pub trait Trigger {
    fn base(&self) -> &TriggerBase;
    fn base_mut(&mut self) -> &mut TriggerBase;

    fn start_boundary(&self) -> TriggerResult<Option<NaiveDateTime>> {
        parse_boundary(&self.base().start_boundary)
    }

    fn end_boundary(&self) -> TriggerResult<Option<NaiveDateTime>> {
        parse_boundary(&self.base().end_boundary)
    }

    fn set_start_boundary(&mut self, start: NaiveDateTime) {
        self.base_mut().start_boundary = format_boundary(start);
    }

    fn set_end_boundary(&mut self, end: Option<NaiveDateTime>) {
        self.base_mut().end_boundary = end.map(format_boundary).unwrap_or_default();
    }

    fn enabled(&self) -> bool {
        self.base().enabled
    }

    fn repetition(&self) -> &RepetitionPattern {
        &self.base().repetition
    }

    fn minutes_interval(&self) -> u32 {
        minutes(&self.base().repetition.interval)
    }

    fn minutes_duration(&self) -> u32 {
        minutes(&self.base().repetition.duration)
    }
}

macro_rules! impl_trigger {
    ($($ty:ty),* $(,)?) => {
        $(impl Trigger for $ty {
            fn base(&self) -> &TriggerBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut TriggerBase {
                &mut self.base
            }
        })*
    };
}

impl_trigger!(
    BasicTrigger,
    DailyTrigger,
    WeeklyTrigger,
    MonthlyTrigger,
    MonthlyDowTrigger,
    LogonTrigger,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum V2Trigger {
    Event(BasicTrigger),
    Time(BasicTrigger),
    Daily(DailyTrigger),
    Weekly(WeeklyTrigger),
    Monthly(MonthlyTrigger),
    MonthlyDow(MonthlyDowTrigger),
    Idle(BasicTrigger),
    Registration(BasicTrigger),
    Boot(BasicTrigger),
    Logon(LogonTrigger),
    SessionStateChange(BasicTrigger),
    CustomTrigger01(BasicTrigger),
}

impl Trigger for V2Trigger {
    fn base(&self) -> &TriggerBase {
        self.inner().base()
    }

    fn base_mut(&mut self) -> &mut TriggerBase {
        self.inner_mut().base_mut()
    }
}

impl V2Trigger {
    /// A blank trigger of `kind`, as the task definition hands out from `create`
    pub fn create(kind: V2TriggerType) -> Self {
        match kind {
            V2TriggerType::Event => V2Trigger::Event(BasicTrigger::default()),
            V2TriggerType::Time => V2Trigger::Time(BasicTrigger::default()),
            V2TriggerType::Daily => V2Trigger::Daily(DailyTrigger {
                days_interval: 1,
                ..Default::default()
            }),
            V2TriggerType::Weekly => V2Trigger::Weekly(WeeklyTrigger {
                weeks_interval: 1,
                ..Default::default()
            }),
            V2TriggerType::Monthly => V2Trigger::Monthly(MonthlyTrigger::default()),
            V2TriggerType::MonthlyDow => V2Trigger::MonthlyDow(MonthlyDowTrigger::default()),
            V2TriggerType::Idle => V2Trigger::Idle(BasicTrigger::default()),
            V2TriggerType::Registration => V2Trigger::Registration(BasicTrigger::default()),
            V2TriggerType::Boot => V2Trigger::Boot(BasicTrigger::default()),
            V2TriggerType::Logon => V2Trigger::Logon(LogonTrigger::default()),
            V2TriggerType::SessionStateChange => {
                V2Trigger::SessionStateChange(BasicTrigger::default())
            }
            V2TriggerType::CustomTrigger01 => V2Trigger::CustomTrigger01(BasicTrigger::default()),
        }
    }

    pub fn trigger_type(&self) -> V2TriggerType {
        match self {
            V2Trigger::Event(_) => V2TriggerType::Event,
            V2Trigger::Time(_) => V2TriggerType::Time,
            V2Trigger::Daily(_) => V2TriggerType::Daily,
            V2Trigger::Weekly(_) => V2TriggerType::Weekly,
            V2Trigger::Monthly(_) => V2TriggerType::Monthly,
            V2Trigger::MonthlyDow(_) => V2TriggerType::MonthlyDow,
            V2Trigger::Idle(_) => V2TriggerType::Idle,
            V2Trigger::Registration(_) => V2TriggerType::Registration,
            V2Trigger::Boot(_) => V2TriggerType::Boot,
            V2Trigger::Logon(_) => V2TriggerType::Logon,
            V2Trigger::SessionStateChange(_) => V2TriggerType::SessionStateChange,
            V2Trigger::CustomTrigger01(_) => V2TriggerType::CustomTrigger01,
        }
    }

    fn inner(&self) -> &dyn Trigger {
        match self {
            V2Trigger::Event(t)
            | V2Trigger::Time(t)
            | V2Trigger::Idle(t)
            | V2Trigger::Registration(t)
            | V2Trigger::Boot(t)
            | V2Trigger::SessionStateChange(t)
            | V2Trigger::CustomTrigger01(t) => t,
            V2Trigger::Daily(t) => t,
            V2Trigger::Weekly(t) => t,
            V2Trigger::Monthly(t) => t,
            V2Trigger::MonthlyDow(t) => t,
            V2Trigger::Logon(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Trigger {
        match self {
            V2Trigger::Event(t)
            | V2Trigger::Time(t)
            | V2Trigger::Idle(t)
            | V2Trigger::Registration(t)
            | V2Trigger::Boot(t)
            | V2Trigger::SessionStateChange(t)
            | V2Trigger::CustomTrigger01(t) => t,
            V2Trigger::Daily(t) => t,
            V2Trigger::Weekly(t) => t,
            V2Trigger::Monthly(t) => t,
            V2Trigger::MonthlyDow(t) => t,
            V2Trigger::Logon(t) => t,
        }
    }

    /// Build a trigger from a canonical manifest trigger. A missing start
    /// date becomes `today`.
    pub fn from_manifest_at(trigger: &ManifestTrigger, today: NaiveDate) -> TriggerResult<Self> {
        trigger.ensure_writable()?;

        let kind = V2TriggerType::for_manifest(trigger);
        let mut v2 = V2Trigger::create(kind);
        match (&mut v2, &trigger.details) {
            (V2Trigger::Time(_), ScheduleDetails::Once) => {}
            (V2Trigger::Daily(t), ScheduleDetails::Daily { every }) => {
                t.days_interval = every.unwrap_or(1);
            }
            (V2Trigger::Weekly(t), ScheduleDetails::Weekly { every, day_of_week }) => {
                t.weeks_interval = every.unwrap_or(1);
                t.days_of_week = day_of_week
                    .as_deref()
                    .map(day::days_to_bitmask)
                    .unwrap_or(Day::MAX_BITMASK);
            }
            (V2Trigger::Monthly(t), ScheduleDetails::MonthlyDate { months, on }) => {
                t.months_of_year = months_bitmask(months.as_deref())?;
                let (days, last) = days_of_month::indexes_to_v2_bitmask(on);
                t.days_of_month = days;
                t.run_on_last_day_of_month = last;
            }
            (
                V2Trigger::MonthlyDow(t),
                ScheduleDetails::MonthlyDow {
                    months,
                    which_occurrence,
                    day_of_week,
                },
            ) => {
                t.months_of_year = months_bitmask(months.as_deref())?;
                t.weeks_of_month = which_occurrence.week_bit();
                t.days_of_week = day::days_to_bitmask(day_of_week);
            }
            _ => return Err(TriggerError::UnknownTriggerType(kind.name().to_string())),
        }

        let start = trigger
            .start_date
            .unwrap_or(today)
            .and_time(trigger.start_time.unwrap_or(NaiveTime::MIN));
        v2.set_start_boundary(start);

        let base = v2.base_mut();
        base.enabled = trigger.enabled;
        if trigger.minutes_interval > 0 {
            base.repetition.interval = duration::from_minutes(trigger.minutes_interval);
        }
        if trigger.minutes_duration > 0 {
            base.repetition.duration = duration::from_minutes(trigger.minutes_duration);
        }
        Ok(v2)
    }

    /// Read this trigger as a canonical manifest trigger.
    ///
    /// Time-based kinds go through the V1 model. Boot and logon triggers come
    /// back with the common fields only. Other kinds fail with
    /// [`TriggerError::UnknownTriggerType`].
    pub fn to_manifest_hash(&self) -> TriggerResult<ManifestTrigger> {
        let details = match self {
            V2Trigger::Boot(_) => ScheduleDetails::Boot,
            V2Trigger::Logon(t) => ScheduleDetails::Logon {
                user_id: (!t.user_id.is_empty()).then(|| t.user_id.clone()),
            },
            _ => return self.to_v1()?.to_manifest_hash(),
        };

        let start = self.start_boundary()?;
        Ok(ManifestTrigger {
            details,
            start_date: start.map(|s| s.date()),
            start_time: start.map(|s| s.time()),
            enabled: self.enabled(),
            minutes_interval: self.minutes_interval(),
            minutes_duration: self.minutes_duration(),
            index: None,
        })
    }

    /// Translate to a V1 record. Only the time-based kinds have one.
    ///
    /// `WeeksOfMonth` collapses to its lowest selected week and the
    /// last-day-of-month flag moves into bit 31 of `days`.
    pub fn to_v1(&self) -> TriggerResult<V1Trigger> {
        let kind = self.trigger_type();
        let v1_type = match kind.to_v1() {
            Some(
                t @ (V1TriggerType::Once
                | V1TriggerType::Daily
                | V1TriggerType::Weekly
                | V1TriggerType::MonthlyDate
                | V1TriggerType::MonthlyDow),
            ) => t,
            _ => return Err(TriggerError::UnknownTriggerType(kind.name().to_string())),
        };

        let start = self.start_boundary()?.ok_or_else(|| {
            TriggerError::validation(format!("{kind} trigger has no start boundary"))
        })?;
        let mut v1 = V1Trigger::default_trigger_for_at(v1_type, start);
        let data = &mut v1.type_data;

        match self {
            V2Trigger::Daily(t) => data.days_interval = Some(t.days_interval),
            V2Trigger::Weekly(t) => {
                data.weeks_interval = Some(t.weeks_interval);
                data.days_of_week = Some(t.days_of_week);
            }
            V2Trigger::Monthly(t) => {
                data.months = Some(t.months_of_year);
                data.days = Some(days_of_month::v2_to_v1(
                    t.days_of_month,
                    t.run_on_last_day_of_month,
                )?);
            }
            V2Trigger::MonthlyDow(t) => {
                let week = occurrence::weeks_bitmask_to_single(t.weeks_of_month)?.ok_or_else(|| {
                    TriggerError::validation("WeeksOfMonth must select at least one week")
                })?;
                data.months = Some(t.months_of_year);
                data.weeks = Some(week.constant());
                data.days_of_week = Some(t.days_of_week);
            }
            _ => {}
        }

        if let Some(end) = self.end_boundary()? {
            v1.flags |= flags::HAS_END_DATE;
            v1.end_year = end.year();
            v1.end_month = end.month();
            v1.end_day = end.day();
        }
        if !self.enabled() {
            v1.flags |= flags::DISABLED;
        }
        if self.repetition().stop_at_duration_end {
            v1.flags |= flags::KILL_AT_DURATION_END;
        }
        v1.minutes_interval = self.minutes_interval();
        v1.minutes_duration = self.minutes_duration();
        Ok(v1)
    }

    /// Translate a V1 record, including the V1-only event kinds
    pub fn from_v1(v1: &V1Trigger) -> TriggerResult<Self> {
        let mut v2 = V2Trigger::create(V2TriggerType::from_v1(v1.trigger_type));
        let data = &v1.type_data;
        let required = |field: &str, value: Option<u32>| {
            value.ok_or_else(|| {
                TriggerError::validation(format!(
                    "{} trigger is missing type.{field}",
                    v1.trigger_type
                ))
            })
        };

        match &mut v2 {
            V2Trigger::Daily(t) => t.days_interval = required("days_interval", data.days_interval)?,
            V2Trigger::Weekly(t) => {
                t.weeks_interval = required("weeks_interval", data.weeks_interval)?;
                t.days_of_week = required("days_of_week", data.days_of_week)?;
            }
            V2Trigger::Monthly(t) => {
                let (days, last) = days_of_month::v1_to_v2(required("days", data.days)?);
                t.months_of_year = required("months", data.months)?;
                t.days_of_month = days;
                t.run_on_last_day_of_month = last;
            }
            V2Trigger::MonthlyDow(t) => {
                t.months_of_year = required("months", data.months)?;
                t.weeks_of_month = Occurrence::from_constant(required("weeks", data.weeks)?)?.week_bit();
                t.days_of_week = required("days_of_week", data.days_of_week)?;
            }
            _ => {}
        }

        v2.set_start_boundary(v1.start_date()?.and_time(v1.start_time()?));
        v2.set_end_boundary(v1.end_date()?.map(|d| d.and_time(NaiveTime::MIN)));
        let base = v2.base_mut();
        base.enabled = v1.flags & flags::DISABLED == 0;
        base.repetition.stop_at_duration_end = v1.flags & flags::KILL_AT_DURATION_END != 0;
        if v1.minutes_interval > 0 {
            base.repetition.interval = duration::from_minutes(v1.minutes_interval);
        }
        if v1.minutes_duration > 0 {
            base.repetition.duration = duration::from_minutes(v1.minutes_duration);
        }
        Ok(v2)
    }
}

fn months_bitmask(months: Option<&[u8]>) -> TriggerResult<u32> {
    match months {
        Some(months) => month::indexes_to_bitmask(months),
        None => Ok(month::MAX_BITMASK),
    }
}

fn minutes(text: &str) -> u32 {
    u32::try_from(duration::to_minutes(Some(text))).unwrap_or(u32::MAX)
}

pub fn format_boundary(at: NaiveDateTime) -> String {
    at.format(BOUNDARY_FORMAT).to_string()
}

/// Parse a boundary as local time. Empty means no boundary; boundaries
/// carrying an offset are converted to local time.
pub fn parse_boundary(text: &str) -> TriggerResult<Option<NaiveDateTime>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(local) = NaiveDateTime::parse_from_str(text, BOUNDARY_FORMAT) {
        return Ok(Some(local));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|at| Some(at.with_timezone(&Local).naive_local()))
        .map_err(|_| TriggerError::validation(format!("Invalid trigger boundary '{text}'")))
}

/// Read-only, 0-based view of a task's trigger slots
#[derive(Debug, Clone, Copy)]
pub struct TriggerView<'a> {
    slots: &'a TriggerSlots,
}

impl<'a> TriggerView<'a> {
    pub fn new(slots: &'a TriggerSlots) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'a V2Trigger> {
        self.slots.item(index + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a V2Trigger)> + 'a {
        let slots = self.slots;
        (0..slots.count()).filter_map(move |index| slots.item(index + 1).map(|t| (index, t)))
    }
}

/// Mutable, 0-based adapter over a task's trigger slots
#[derive(Debug)]
pub struct TriggerCollection<'a> {
    slots: &'a mut TriggerSlots,
}

impl<'a> TriggerCollection<'a> {
    pub fn new(slots: &'a mut TriggerSlots) -> Self {
        Self { slots }
    }

    pub fn view(&self) -> TriggerView<'_> {
        TriggerView::new(&*self.slots)
    }

    pub fn len(&self) -> usize {
        self.slots.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append at the end; returns the new trigger's index
    pub fn append(&mut self, trigger: V2Trigger) -> usize {
        let kind = trigger.trigger_type();
        *self.slots.create(kind) = trigger;
        self.slots.count() - 1
    }

    pub fn delete(&mut self, index: usize) -> TriggerResult<V2Trigger> {
        let count = self.slots.count();
        self.slots.remove(index + 1).ok_or_else(|| {
            TriggerError::validation(format!(
                "Trigger index {index} is out of range for a task with {count} trigger(s)"
            ))
        })
    }

    /// Canonicalize `raw` and append it as a new trigger
    pub fn append_trigger(&mut self, raw: &Value) -> TriggerResult<usize> {
        let trigger = manifest::canonicalize_and_validate(raw)?;
        self.append_canonical_at(&trigger, Local::now().date_naive())
    }

    pub fn append_canonical_at(&mut self, trigger: &ManifestTrigger, today: NaiveDate) -> TriggerResult<usize> {
        let v2 = V2Trigger::from_manifest_at(trigger, today)?;
        Ok(self.append(v2))
    }
}
