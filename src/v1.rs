//! V1 trigger model - The legacy flag/type-code trigger record
//!
//! A V1 trigger stores its start as numeric fields, a `trigger_type` code and
//! a `type` sub-record holding whichever bitmasks that type needs.

use crate::bitmask::{day, days_of_month, month, Day, Occurrence};
use crate::error::{TriggerError, TriggerResult};
use crate::manifest::{self, ManifestTrigger, ScheduleDetails};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `TASK_TRIGGER.rgFlags` bits
pub mod flags {
    pub const HAS_END_DATE: u32 = 0x1;
    pub const KILL_AT_DURATION_END: u32 = 0x2;
    pub const DISABLED: u32 = 0x4;
}

const TOP_LEVEL_KEYS: [&str; 14] = [
    "start_year",
    "start_month",
    "start_day",
    "start_hour",
    "start_minute",
    "end_year",
    "end_month",
    "end_day",
    "minutes_interval",
    "minutes_duration",
    "flags",
    "random_minutes_interval",
    "trigger_type",
    "type",
];

const TYPE_KEYS: [&str; 6] = [
    "days_interval",
    "weeks_interval",
    "days_of_week",
    "months",
    "days",
    "weeks",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum V1TriggerType {
    #[serde(rename = "TASK_TIME_TRIGGER_ONCE")]
    Once = 0,
    #[serde(rename = "TASK_TIME_TRIGGER_DAILY")]
    Daily = 1,
    #[serde(rename = "TASK_TIME_TRIGGER_WEEKLY")]
    Weekly = 2,
    #[serde(rename = "TASK_TIME_TRIGGER_MONTHLYDATE")]
    MonthlyDate = 3,
    #[serde(rename = "TASK_TIME_TRIGGER_MONTHLYDOW")]
    MonthlyDow = 4,
    #[serde(rename = "TASK_EVENT_TRIGGER_ON_IDLE")]
    OnIdle = 5,
    #[serde(rename = "TASK_EVENT_TRIGGER_AT_SYSTEMSTART")]
    AtSystemStart = 6,
    #[serde(rename = "TASK_EVENT_TRIGGER_AT_LOGON")]
    AtLogon = 7,
}

impl V1TriggerType {
    pub const ALL: [V1TriggerType; 8] = [
        V1TriggerType::Once,
        V1TriggerType::Daily,
        V1TriggerType::Weekly,
        V1TriggerType::MonthlyDate,
        V1TriggerType::MonthlyDow,
        V1TriggerType::OnIdle,
        V1TriggerType::AtSystemStart,
        V1TriggerType::AtLogon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            V1TriggerType::Once => "TASK_TIME_TRIGGER_ONCE",
            V1TriggerType::Daily => "TASK_TIME_TRIGGER_DAILY",
            V1TriggerType::Weekly => "TASK_TIME_TRIGGER_WEEKLY",
            V1TriggerType::MonthlyDate => "TASK_TIME_TRIGGER_MONTHLYDATE",
            V1TriggerType::MonthlyDow => "TASK_TIME_TRIGGER_MONTHLYDOW",
            V1TriggerType::OnIdle => "TASK_EVENT_TRIGGER_ON_IDLE",
            V1TriggerType::AtSystemStart => "TASK_EVENT_TRIGGER_AT_SYSTEMSTART",
            V1TriggerType::AtLogon => "TASK_EVENT_TRIGGER_AT_LOGON",
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> TriggerResult<Self> {
        V1TriggerType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| TriggerError::UnknownTriggerType(code.to_string()))
    }

    pub fn from_name(name: &str) -> TriggerResult<Self> {
        let name = name.trim();
        V1TriggerType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| TriggerError::UnknownTriggerType(name.to_string()))
    }

    /// The type a canonical manifest trigger maps to. Monthly triggers split
    /// into MONTHLYDATE and MONTHLYDOW here.
    pub fn for_manifest(trigger: &ManifestTrigger) -> Self {
        match trigger.details {
            ScheduleDetails::Once => V1TriggerType::Once,
            ScheduleDetails::Daily { .. } => V1TriggerType::Daily,
            ScheduleDetails::Weekly { .. } => V1TriggerType::Weekly,
            ScheduleDetails::MonthlyDate { .. } => V1TriggerType::MonthlyDate,
            ScheduleDetails::MonthlyDow { .. } => V1TriggerType::MonthlyDow,
            ScheduleDetails::Boot => V1TriggerType::AtSystemStart,
            ScheduleDetails::Logon { .. } => V1TriggerType::AtLogon,
        }
    }
}

impl fmt::Display for V1TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The `type` sub-record. Only the fields relevant to the trigger type are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1TypeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    /// Day-of-month bitmask, bit 31 = last day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    /// Occurrence constant (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1Trigger {
    #[serde(default)]
    pub start_year: i32,
    #[serde(default)]
    pub start_month: u32,
    #[serde(default)]
    pub start_day: u32,
    #[serde(default)]
    pub start_hour: u32,
    #[serde(default)]
    pub start_minute: u32,
    #[serde(default)]
    pub end_year: i32,
    #[serde(default)]
    pub end_month: u32,
    #[serde(default)]
    pub end_day: u32,
    #[serde(default)]
    pub minutes_interval: u32,
    #[serde(default)]
    pub minutes_duration: u32,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub random_minutes_interval: u32,
    pub trigger_type: V1TriggerType,
    #[serde(rename = "type", default)]
    pub type_data: V1TypeData,
}

impl V1Trigger {
    /// A fully populated trigger of `trigger_type` starting now
    pub fn default_trigger_for(trigger_type: V1TriggerType) -> Self {
        Self::default_trigger_for_at(trigger_type, Local::now().naive_local())
    }

    pub fn default_trigger_for_at(trigger_type: V1TriggerType, now: NaiveDateTime) -> Self {
        let type_data = match trigger_type {
            V1TriggerType::Daily => V1TypeData {
                days_interval: Some(1),
                ..Default::default()
            },
            V1TriggerType::Weekly => V1TypeData {
                weeks_interval: Some(1),
                days_of_week: Some(day::days_to_bitmask(&Day::ALL)),
                ..Default::default()
            },
            V1TriggerType::MonthlyDate => V1TypeData {
                months: Some(month::MAX_BITMASK),
                days: Some(0),
                ..Default::default()
            },
            V1TriggerType::MonthlyDow => V1TypeData {
                months: Some(month::MAX_BITMASK),
                weeks: Some(Occurrence::First.constant()),
                days_of_week: Some(0),
                ..Default::default()
            },
            _ => V1TypeData::default(),
        };

        Self {
            start_year: now.year(),
            start_month: now.month(),
            start_day: now.day(),
            start_hour: now.hour(),
            start_minute: now.minute(),
            end_year: 0,
            end_month: 0,
            end_day: 0,
            minutes_interval: 0,
            minutes_duration: 0,
            flags: 0,
            random_minutes_interval: 0,
            trigger_type,
            type_data,
        }
    }

    /// Canonicalize a raw manifest trigger and convert it
    pub fn from_manifest_hash(raw: &Value) -> TriggerResult<Self> {
        let trigger = manifest::canonicalize_and_validate(raw)?;
        Self::from_canonical_at(&trigger, Local::now().naive_local())
    }

    /// Convert a canonical trigger; missing start date and optional fields
    /// take the defaults of [`Self::default_trigger_for_at`].
    pub fn from_canonical_at(trigger: &ManifestTrigger, now: NaiveDateTime) -> TriggerResult<Self> {
        let trigger_type = V1TriggerType::for_manifest(trigger);
        let mut v1 = Self::default_trigger_for_at(trigger_type, now);
        let data = &mut v1.type_data;

        match &trigger.details {
            ScheduleDetails::Once => {}
            ScheduleDetails::Daily { every } => {
                data.days_interval = Some(every.unwrap_or(1));
            }
            ScheduleDetails::Weekly { every, day_of_week } => {
                data.weeks_interval = Some(every.unwrap_or(1));
                if let Some(days) = day_of_week {
                    data.days_of_week = Some(day::days_to_bitmask(days));
                }
            }
            ScheduleDetails::MonthlyDate { months, on } => {
                if let Some(months) = months {
                    data.months = Some(month::indexes_to_bitmask(months)?);
                }
                data.days = Some(days_of_month::indexes_to_bitmask(on));
            }
            ScheduleDetails::MonthlyDow {
                months,
                which_occurrence,
                day_of_week,
            } => {
                if let Some(months) = months {
                    data.months = Some(month::indexes_to_bitmask(months)?);
                }
                data.weeks = Some(which_occurrence.constant());
                data.days_of_week = Some(day::days_to_bitmask(day_of_week));
            }
            ScheduleDetails::Boot | ScheduleDetails::Logon { .. } => {
                return Err(TriggerError::UnknownTriggerType(trigger_type.name().to_string()));
            }
        }

        if trigger.enabled {
            v1.flags &= !flags::DISABLED;
        } else {
            v1.flags |= flags::DISABLED;
        }

        let start_date = trigger.start_date.unwrap_or(now.date());
        let start_time = trigger.start_time.unwrap_or(now.time());
        v1.start_year = start_date.year();
        v1.start_month = start_date.month();
        v1.start_day = start_date.day();
        v1.start_hour = start_time.hour();
        v1.start_minute = start_time.minute();
        v1.minutes_interval = trigger.minutes_interval;
        v1.minutes_duration = trigger.minutes_duration;
        Ok(v1)
    }

    /// Inverse of [`Self::from_canonical_at`]. Event trigger types are
    /// rejected with [`TriggerError::UnknownTriggerType`].
    pub fn to_manifest_hash(&self) -> TriggerResult<ManifestTrigger> {
        let data = &self.type_data;
        let details = match self.trigger_type {
            V1TriggerType::Once => ScheduleDetails::Once,
            V1TriggerType::Daily => ScheduleDetails::Daily {
                every: Some(self.required("days_interval", data.days_interval)?),
            },
            V1TriggerType::Weekly => ScheduleDetails::Weekly {
                every: Some(self.required("weeks_interval", data.weeks_interval)?),
                day_of_week: Some(day::bitmask_to_days(
                    self.required("days_of_week", data.days_of_week)?,
                )?),
            },
            V1TriggerType::MonthlyDate => ScheduleDetails::MonthlyDate {
                months: Some(month::bitmask_to_indexes(self.required("months", data.months)?)?),
                on: days_of_month::bitmask_to_indexes(self.required("days", data.days)?),
            },
            V1TriggerType::MonthlyDow => ScheduleDetails::MonthlyDow {
                months: Some(month::bitmask_to_indexes(self.required("months", data.months)?)?),
                which_occurrence: Occurrence::from_constant(self.required("weeks", data.weeks)?)?,
                day_of_week: day::bitmask_to_days(self.required("days_of_week", data.days_of_week)?)?,
            },
            other => return Err(TriggerError::UnknownTriggerType(other.name().to_string())),
        };

        Ok(ManifestTrigger {
            details,
            start_date: Some(self.start_date()?),
            start_time: Some(self.start_time()?),
            enabled: self.flags & flags::DISABLED == 0,
            minutes_interval: self.minutes_interval,
            minutes_duration: self.minutes_duration,
            index: None,
        })
    }

    pub fn start_date(&self) -> TriggerResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, self.start_month, self.start_day).ok_or_else(|| {
            TriggerError::validation(format!(
                "Invalid V1 start date {}-{}-{}",
                self.start_year, self.start_month, self.start_day
            ))
        })
    }

    pub fn start_time(&self) -> TriggerResult<NaiveTime> {
        NaiveTime::from_hms_opt(self.start_hour, self.start_minute, 0).ok_or_else(|| {
            TriggerError::validation(format!(
                "Invalid V1 start time {}:{}",
                self.start_hour, self.start_minute
            ))
        })
    }

    /// End date, when the has-end-date flag is set
    pub fn end_date(&self) -> TriggerResult<Option<NaiveDate>> {
        if self.flags & flags::HAS_END_DATE == 0 {
            return Ok(None);
        }
        NaiveDate::from_ymd_opt(self.end_year, self.end_month, self.end_day)
            .map(Some)
            .ok_or_else(|| {
                TriggerError::validation(format!(
                    "Invalid V1 end date {}-{}-{}",
                    self.end_year, self.end_month, self.end_day
                ))
            })
    }

    fn required(&self, field: &str, value: Option<u32>) -> TriggerResult<u32> {
        value.ok_or_else(|| {
            TriggerError::validation(format!("{} trigger is missing type.{field}", self.trigger_type))
        })
    }

    /// Read a loosely typed V1 trigger hash.
    ///
    /// Keys are case-insensitive; keys outside the V1 vocabulary (top level
    /// or inside `type`) are rejected. `trigger_type` may be a name or a
    /// numeric code.
    pub fn from_value(raw: &Value) -> TriggerResult<Self> {
        if !raw.is_object() {
            return Err(TriggerError::type_error("V1 trigger must be a hash"));
        }
        let mut normalized = manifest::downcase_keys(raw);

        if let Value::Object(map) = &mut normalized {
            let mut unknown: Vec<String> = map
                .keys()
                .filter(|k| !TOP_LEVEL_KEYS.contains(&k.as_str()))
                .cloned()
                .collect();

            match map.get("type") {
                Some(Value::Object(type_map)) => unknown.extend(
                    type_map
                        .keys()
                        .filter(|k| !TYPE_KEYS.contains(&k.as_str()))
                        .map(|k| format!("type.{k}")),
                ),
                Some(Value::Null) => {
                    map.remove("type");
                }
                Some(_) => return Err(TriggerError::type_error("V1 trigger 'type' must be a hash")),
                None => {}
            }

            if !unknown.is_empty() {
                unknown.sort();
                return Err(TriggerError::UnknownOptions(unknown));
            }

            if let Some(trigger_type) = map.get_mut("trigger_type") {
                let resolved = match &*trigger_type {
                    Value::Number(code) => code
                        .as_u64()
                        .and_then(|c| u32::try_from(c).ok())
                        .ok_or_else(|| TriggerError::UnknownTriggerType(code.to_string()))
                        .and_then(V1TriggerType::from_code)?,
                    Value::String(name) => V1TriggerType::from_name(name)?,
                    _ => return Err(TriggerError::type_error("trigger_type must be a name or a code")),
                };
                *trigger_type = Value::String(resolved.name().to_string());
            }
        }

        serde_json::from_value(normalized)
            .map_err(|e| TriggerError::type_error(format!("Invalid V1 trigger: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask::MonthDay;
    use crate::manifest::canonicalize_and_validate;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn convert(raw: Value) -> V1Trigger {
        let trigger = canonicalize_and_validate(&raw).unwrap();
        V1Trigger::from_canonical_at(&trigger, now()).unwrap()
    }

    #[test]
    fn test_default_triggers() {
        let daily = V1Trigger::default_trigger_for_at(V1TriggerType::Daily, now());
        assert_eq!(daily.type_data.days_interval, Some(1));
        assert_eq!((daily.start_year, daily.start_month, daily.start_day), (2024, 3, 14));
        assert_eq!((daily.start_hour, daily.start_minute), (9, 26));

        let weekly = V1Trigger::default_trigger_for_at(V1TriggerType::Weekly, now());
        assert_eq!(weekly.type_data.days_of_week, Some(Day::MAX_BITMASK));
        assert_eq!(weekly.type_data.weeks_interval, Some(1));

        let monthly = V1Trigger::default_trigger_for_at(V1TriggerType::MonthlyDate, now());
        assert_eq!(monthly.type_data.months, Some(0xFFF));
        assert_eq!(monthly.type_data.days, Some(0));

        let once = V1Trigger::default_trigger_for_at(V1TriggerType::Once, now());
        assert_eq!(once.type_data, V1TypeData::default());
    }

    #[test]
    fn test_default_trigger_starts_today() {
        let before = Local::now().date_naive();
        let trigger = V1Trigger::default_trigger_for(V1TriggerType::MonthlyDow);
        let after = Local::now().date_naive();

        assert_eq!(trigger.trigger_type, V1TriggerType::MonthlyDow);
        assert_eq!(trigger.type_data.weeks, Some(Occurrence::First.constant()));
        let start = trigger.start_date().unwrap();
        assert!(start == before || start == after);
    }

    #[test]
    fn test_from_manifest_hash_canonicalizes_first() {
        let v1 = V1Trigger::from_manifest_hash(&json!({"Schedule": "Weekly", "Start_Time": "9:15 PM", "Day_Of_Week": "tues"}))
            .unwrap();
        assert_eq!(v1.trigger_type, V1TriggerType::Weekly);
        assert_eq!(v1.type_data.days_of_week, Some(0x4));
        assert_eq!(v1.start_time().unwrap(), NaiveTime::from_hms_opt(21, 15, 0).unwrap());
        assert!(v1.start_date().is_ok());

        let err = V1Trigger::from_manifest_hash(&json!({"schedule": "daily", "start_time": "10:00", "colour": "red"}))
            .unwrap_err();
        assert!(matches!(err, TriggerError::UnknownOptions(_)));
    }

    #[test]
    fn test_from_manifest_daily() {
        let v1 = convert(json!({"schedule": "daily", "start_date": "2011-9-12", "start_time": "13:20", "every": 3}));
        assert_eq!(v1.trigger_type, V1TriggerType::Daily);
        assert_eq!(v1.type_data.days_interval, Some(3));
        assert_eq!((v1.start_year, v1.start_month, v1.start_day), (2011, 9, 12));
        assert_eq!((v1.start_hour, v1.start_minute), (13, 20));
        assert_eq!(v1.flags, 0);
    }

    #[test]
    fn test_missing_start_date_defaults_to_today() {
        let v1 = convert(json!({"schedule": "daily", "start_time": "13:20"}));
        assert_eq!((v1.start_year, v1.start_month, v1.start_day), (2024, 3, 14));
        assert_eq!(v1.type_data.days_interval, Some(1));
    }

    #[test]
    fn test_from_manifest_weekly_defaults_to_every_day() {
        let v1 = convert(json!({"schedule": "weekly", "start_time": "13:20"}));
        assert_eq!(v1.type_data.days_of_week, Some(0x7F));

        let v1 = convert(json!({"schedule": "weekly", "start_time": "13:20", "day_of_week": ["mon", "fri"]}));
        assert_eq!(v1.type_data.days_of_week, Some(0x2 | 0x20));
    }

    #[test]
    fn test_monthly_disambiguation() {
        let by_date = convert(json!({"schedule": "monthly", "start_time": "10:00", "on": [9, "last"]}));
        assert_eq!(by_date.trigger_type, V1TriggerType::MonthlyDate);
        assert_eq!(by_date.type_data.days, Some((1 << 8) | (1 << 31)));
        assert_eq!(by_date.type_data.months, Some(0xFFF));

        let by_weekday = convert(json!({
            "schedule": "monthly", "start_time": "10:00",
            "which_occurrence": "second", "day_of_week": ["sat"], "months": [1, 7],
        }));
        assert_eq!(by_weekday.trigger_type, V1TriggerType::MonthlyDow);
        assert_eq!(by_weekday.type_data.weeks, Some(2));
        assert_eq!(by_weekday.type_data.days_of_week, Some(0x40));
        assert_eq!(by_weekday.type_data.months, Some(0x1 | 0x40));
    }

    #[test]
    fn test_disabled_flag() {
        let v1 = convert(json!({"schedule": "daily", "start_time": "10:00", "enabled": false}));
        assert_eq!(v1.flags & flags::DISABLED, flags::DISABLED);
        assert!(!v1.to_manifest_hash().unwrap().enabled);
    }

    #[test]
    fn test_round_trip_for_each_schedule() {
        for raw in [
            json!({"schedule": "once", "start_date": "2011-9-12", "start_time": "13:20"}),
            json!({"schedule": "daily", "start_date": "2011-9-12", "start_time": "13:20", "every": "2",
                   "minutes_interval": 10, "minutes_duration": 60}),
            json!({"schedule": "weekly", "start_date": "2011-9-12", "start_time": "13:20", "every": "1",
                   "day_of_week": ["sun", "wed"], "enabled": false}),
            json!({"schedule": "monthly", "start_date": "2011-9-12", "start_time": "13:20",
                   "months": [2, 11], "on": [1, 15, "last"]}),
            json!({"schedule": "monthly", "start_date": "2011-9-12", "start_time": "13:20",
                   "months": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
                   "which_occurrence": "last", "day_of_week": ["fri"]}),
        ] {
            let canonical = canonicalize_and_validate(&raw).unwrap();
            let v1 = V1Trigger::from_canonical_at(&canonical, now()).unwrap();
            assert_eq!(v1.to_manifest_hash().unwrap(), canonical, "{raw}");
        }
    }

    #[test]
    fn test_last_day_survives_round_trip() {
        let v1 = convert(json!({"schedule": "monthly", "start_time": "10:00", "on": [3, 5, 8, 12, "last"]}));
        let back = v1.to_manifest_hash().unwrap();
        let ScheduleDetails::MonthlyDate { on, .. } = back.details else {
            panic!("expected a date-based monthly trigger");
        };
        assert_eq!(
            on,
            vec![MonthDay::Day(3), MonthDay::Day(5), MonthDay::Day(8), MonthDay::Day(12), MonthDay::Last]
        );
    }

    #[test]
    fn test_event_types_are_rejected() {
        for trigger_type in [
            V1TriggerType::OnIdle,
            V1TriggerType::AtSystemStart,
            V1TriggerType::AtLogon,
        ] {
            let v1 = V1Trigger::default_trigger_for_at(trigger_type, now());
            assert_eq!(
                v1.to_manifest_hash().unwrap_err(),
                TriggerError::UnknownTriggerType(trigger_type.name().to_string())
            );
        }
    }

    #[test]
    fn test_missing_type_data_is_reported() {
        let mut v1 = V1Trigger::default_trigger_for_at(V1TriggerType::Daily, now());
        v1.type_data.days_interval = None;
        assert!(v1.to_manifest_hash().unwrap_err().to_string().contains("type.days_interval"));
    }

    #[test]
    fn test_from_value_accepts_loose_hashes() {
        let v1 = V1Trigger::from_value(&json!({
            "Start_Year": 2011, "start_month": 9, "start_day": 12,
            "start_hour": 13, "start_minute": 20,
            "Trigger_Type": 2,
            "TYPE": {"Weeks_Interval": 1, "days_of_week": 0x7F},
        }))
        .unwrap();
        assert_eq!(v1.trigger_type, V1TriggerType::Weekly);
        assert_eq!(v1.type_data.days_of_week, Some(0x7F));

        let named = V1Trigger::from_value(&json!({
            "trigger_type": "task_time_trigger_once",
            "start_year": 2011, "start_month": 9, "start_day": 12,
        }))
        .unwrap();
        assert_eq!(named.trigger_type, V1TriggerType::Once);
    }

    #[test]
    fn test_from_value_rejects_unknown_keys() {
        let err = V1Trigger::from_value(&json!({
            "trigger_type": 1, "colour": "red", "type": {"days_interval": 1, "hours": 3},
        }))
        .unwrap_err();
        assert_eq!(
            err,
            TriggerError::UnknownOptions(vec!["colour".to_string(), "type.hours".to_string()])
        );

        assert!(matches!(
            V1Trigger::from_value(&json!({"trigger_type": 42})),
            Err(TriggerError::UnknownTriggerType(_))
        ));
        assert!(matches!(V1Trigger::from_value(&json!([1, 2])), Err(TriggerError::Type(_))));
    }

    #[test]
    fn test_serialized_shape_uses_type_names() {
        let v1 = V1Trigger::default_trigger_for_at(V1TriggerType::MonthlyDow, now());
        let value = serde_json::to_value(&v1).unwrap();
        assert_eq!(value["trigger_type"], "TASK_TIME_TRIGGER_MONTHLYDOW");
        assert_eq!(value["type"]["weeks"], 1);
        assert!(value["type"].get("days_interval").is_none());
        assert_eq!(V1Trigger::from_value(&value).unwrap(), v1);
    }
}
