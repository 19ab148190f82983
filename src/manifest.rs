//! Manifest triggers - Validate and normalize loosely typed trigger descriptions
//!
//! A manifest trigger arrives as an untyped, case-insensitive JSON object in
//! which every value may be a string. [`canonicalize_and_validate`] turns it
//! into a [`ManifestTrigger`], whose [`ScheduleDetails`] carries only the
//! fields that are legal for its schedule.

use crate::bitmask::{day, month, Day, MonthDay, Occurrence};
use crate::error::{TriggerError, TriggerResult};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Keys accepted in a manifest trigger
pub const VALID_KEYS: [&str; 12] = [
    "index",
    "enabled",
    "schedule",
    "start_date",
    "start_time",
    "every",
    "months",
    "on",
    "which_occurrence",
    "day_of_week",
    "minutes_interval",
    "minutes_duration",
];

/// Earliest year the legacy task format can store
pub const MIN_START_YEAR: i32 = 1753;

/// Repetition window used when only an interval is given (one day)
pub const DEFAULT_MINUTES_DURATION: u32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    Once,
    Daily,
    Weekly,
    Monthly,
    /// Read-only: reported for boot triggers found on a live task
    Boot,
    /// Read-only: reported for logon triggers found on a live task
    Logon,
}

impl Schedule {
    pub const WRITABLE: [Schedule; 4] = [
        Schedule::Once,
        Schedule::Daily,
        Schedule::Weekly,
        Schedule::Monthly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Schedule::Once => "once",
            Schedule::Daily => "daily",
            Schedule::Weekly => "weekly",
            Schedule::Monthly => "monthly",
            Schedule::Boot => "boot",
            Schedule::Logon => "logon",
        }
    }

    pub fn is_writable(self) -> bool {
        Schedule::WRITABLE.contains(&self)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schedule-specific fields. `None` means "not given", which the reconciler
/// treats as "don't care".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDetails {
    Once,
    Daily {
        every: Option<u32>,
    },
    Weekly {
        every: Option<u32>,
        day_of_week: Option<Vec<Day>>,
    },
    MonthlyDate {
        months: Option<Vec<u8>>,
        on: Vec<MonthDay>,
    },
    MonthlyDow {
        months: Option<Vec<u8>>,
        which_occurrence: Occurrence,
        day_of_week: Vec<Day>,
    },
    Boot,
    Logon {
        user_id: Option<String>,
    },
}

impl ScheduleDetails {
    pub fn schedule(&self) -> Schedule {
        match self {
            ScheduleDetails::Once => Schedule::Once,
            ScheduleDetails::Daily { .. } => Schedule::Daily,
            ScheduleDetails::Weekly { .. } => Schedule::Weekly,
            ScheduleDetails::MonthlyDate { .. } | ScheduleDetails::MonthlyDow { .. } => {
                Schedule::Monthly
            }
            ScheduleDetails::Boot => Schedule::Boot,
            ScheduleDetails::Logon { .. } => Schedule::Logon,
        }
    }
}

/// Canonical manifest trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTrigger {
    pub details: ScheduleDetails,
    /// Defaults to today when written
    pub start_date: Option<NaiveDate>,
    /// Local time, minute precision
    pub start_time: Option<NaiveTime>,
    pub enabled: bool,
    pub minutes_interval: u32,
    pub minutes_duration: u32,
    /// Position in the live task's trigger collection (0-based). Read-only.
    pub index: Option<usize>,
}

impl ManifestTrigger {
    pub fn new(details: ScheduleDetails) -> Self {
        Self {
            details,
            start_date: None,
            start_time: None,
            enabled: true,
            minutes_interval: 0,
            minutes_duration: 0,
            index: None,
        }
    }

    pub fn schedule(&self) -> Schedule {
        self.details.schedule()
    }

    /// Checks that this trigger may be written to a task
    pub fn ensure_writable(&self) -> TriggerResult<()> {
        if self.index.is_some() {
            return Err(TriggerError::validation(
                "'index' is read-only on scheduled task triggers and should be removed",
            ));
        }
        if !self.schedule().is_writable() {
            return Err(TriggerError::validation(format!(
                "Triggers with schedule '{}' cannot be written",
                self.schedule()
            )));
        }
        Ok(())
    }

    /// Manifest output shape: string `every`, typed arrays, boolean `enabled`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("schedule".into(), json!(self.schedule().name()));
        if let Some(date) = self.start_date {
            map.insert("start_date".into(), json!(format_date(date)));
        }
        if let Some(time) = self.start_time {
            map.insert("start_time".into(), json!(format_time(time)));
        }
        map.insert("enabled".into(), json!(self.enabled));
        map.insert("minutes_interval".into(), json!(self.minutes_interval));
        map.insert("minutes_duration".into(), json!(self.minutes_duration));

        match &self.details {
            ScheduleDetails::Once | ScheduleDetails::Boot => {}
            ScheduleDetails::Daily { every } => {
                insert_every(&mut map, *every);
            }
            ScheduleDetails::Weekly { every, day_of_week } => {
                insert_every(&mut map, *every);
                if let Some(days) = day_of_week {
                    map.insert("day_of_week".into(), day_names(days));
                }
            }
            ScheduleDetails::MonthlyDate { months, on } => {
                insert_months(&mut map, months.as_deref());
                let on: Vec<Value> = on
                    .iter()
                    .map(|d| match d {
                        MonthDay::Day(n) => json!(n),
                        MonthDay::Last => json!("last"),
                    })
                    .collect();
                map.insert("on".into(), Value::Array(on));
            }
            ScheduleDetails::MonthlyDow {
                months,
                which_occurrence,
                day_of_week,
            } => {
                insert_months(&mut map, months.as_deref());
                map.insert("which_occurrence".into(), json!(which_occurrence.name()));
                map.insert("day_of_week".into(), day_names(day_of_week));
            }
            ScheduleDetails::Logon { user_id } => {
                if let Some(user) = user_id {
                    map.insert("user_id".into(), json!(user));
                }
            }
        }

        if let Some(index) = self.index {
            map.insert("index".into(), json!(index));
        }
        Value::Object(map)
    }
}

impl Serialize for ManifestTrigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn insert_every(map: &mut Map<String, Value>, every: Option<u32>) {
    if let Some(every) = every {
        map.insert("every".into(), json!(every.to_string()));
    }
}

fn insert_months(map: &mut Map<String, Value>, months: Option<&[u8]>) {
    if let Some(months) = months {
        map.insert("months".into(), json!(months));
    }
}

fn day_names(days: &[Day]) -> Value {
    json!(days.iter().map(|d| d.name()).collect::<Vec<_>>())
}

/// Unpadded `Y-M-D`
pub fn format_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// 24-hour `HH:MM`
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse `Y-M-D` or `Y/M/D`, padded or not
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let separator = if text.contains('-') { '-' } else { '/' };
    let parts: Vec<&str> = text.split(separator).collect();
    let [year, month, day] = parts.as_slice() else {
        return None;
    };
    NaiveDate::from_ymd_opt(
        year.trim().parse().ok()?,
        month.trim().parse().ok()?,
        day.trim().parse().ok()?,
    )
}

/// Parse 24-hour `H:MM[:SS]` or 12-hour `h:mm[:ss] am/pm`. Seconds are dropped.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let lowered = text.trim().to_ascii_lowercase();
    let (clock, pm) = if let Some(rest) = lowered.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = lowered.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else {
        (lowered.as_str(), None)
    };

    let mut pieces = clock.split(':');
    let hour = clock_number(pieces.next()?)?;
    let minute = clock_number(pieces.next()?)?;
    let second = match pieces.next() {
        Some(piece) => clock_number(piece)?,
        None => 0,
    };
    if pieces.next().is_some() || second > 59 {
        return None;
    }

    let hour = match pm {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(pm) => hour % 12 + if pm { 12 } else { 0 },
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn clock_number(piece: &str) -> Option<u32> {
    if piece.is_empty() || piece.len() > 2 || !piece.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    piece.parse().ok()
}

/// Lowercase object keys, recursively
pub fn downcase_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_lowercase(), downcase_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(downcase_keys).collect()),
        other => other.clone(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "hash",
    }
}

fn string_value(field: &str, value: &Value) -> TriggerResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(TriggerError::type_error(format!(
            "{field} must be a string, got {}",
            kind_of(other)
        ))),
    }
}

fn integer_value(field: &str, value: &Value) -> TriggerResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        TriggerError::validation(format!("Invalid {field} value: {}", display_value(value)))
    })
}

/// A single string/number or an array of them
fn list_value(field: &str, value: &Value) -> TriggerResult<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(|item| string_value(field, item)).collect(),
        Value::String(_) | Value::Number(_) => Ok(vec![string_value(field, value)?]),
        other => Err(TriggerError::type_error(format!(
            "{field} must be a string or an array, got {}",
            kind_of(other)
        ))),
    }
}

fn parse_schedule(value: Option<&Value>) -> TriggerResult<Schedule> {
    let shown = value.map(display_value).unwrap_or_else(|| "nil".to_string());
    let name = value.and_then(Value::as_str).unwrap_or_default().trim();
    Schedule::WRITABLE
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| TriggerError::validation(format!("Unknown schedule type: {shown:?}")))
}

fn parse_start_time(value: &Value) -> TriggerResult<NaiveTime> {
    let text = string_value("start_time", value)?;
    parse_time_of_day(&text)
        .ok_or_else(|| TriggerError::validation(format!("Invalid start_time value: {text}")))
}

fn parse_start_date(value: &Value) -> TriggerResult<NaiveDate> {
    let text = string_value("start_date", value)?;
    let date = parse_date(&text)
        .ok_or_else(|| TriggerError::validation(format!("Invalid start_date value: {text}")))?;
    if date.year() < MIN_START_YEAR {
        return Err(TriggerError::validation(format!(
            "start_date must be on or after {MIN_START_YEAR}-01-01, got {text}"
        )));
    }
    Ok(date)
}

fn parse_every(value: &Value) -> TriggerResult<u32> {
    let every = integer_value("every", value)?;
    u32::try_from(every)
        .ok()
        .filter(|every| *every > 0)
        .ok_or_else(|| TriggerError::validation(format!("every must be a positive integer, got {every}")))
}

fn parse_days_of_week(value: &Value) -> TriggerResult<Vec<Day>> {
    let names = list_value("day_of_week", value)?;
    let days = day::names_to_days(&names)?;
    if days.is_empty() {
        return Err(TriggerError::validation("day_of_week must list at least one day"));
    }
    Ok(days)
}

fn parse_months(value: &Value) -> TriggerResult<Vec<u8>> {
    let entries = list_value("months", value)?;
    let invalid: Vec<&String> = entries.iter().filter(|m| month::parse(m).is_none()).collect();
    if !invalid.is_empty() {
        return Err(TriggerError::validation(format!(
            "months must be between 1 and 12; invalid: {}",
            invalid.iter().map(|m| format!("'{m}'")).collect::<Vec<_>>().join(", ")
        )));
    }
    let mut months: Vec<u8> = entries.iter().filter_map(|m| month::parse(m)).collect();
    if months.is_empty() {
        return Err(TriggerError::validation("months must list at least one month"));
    }
    months.sort_unstable();
    months.dedup();
    Ok(months)
}

fn parse_on(value: &Value) -> TriggerResult<Vec<MonthDay>> {
    let mut days = list_value("on", value)?
        .iter()
        .map(|d| MonthDay::parse(d))
        .collect::<TriggerResult<Vec<_>>>()?;
    if days.is_empty() {
        return Err(TriggerError::validation("on must list at least one day of the month"));
    }
    days.sort();
    days.dedup();
    Ok(days)
}

fn parse_enabled(value: &Value) -> TriggerResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(TriggerError::validation(format!(
            "Invalid enabled value: {}",
            display_value(other)
        ))),
    }
}

fn parse_index(value: &Value) -> TriggerResult<usize> {
    let index = integer_value("index", value)?;
    usize::try_from(index)
        .map_err(|_| TriggerError::validation(format!("Invalid index value: {index}")))
}

/// Returns `(minutes_interval, minutes_duration)`.
///
/// A missing interval counts as -1 while checking the duration, so that a
/// lone duration of 0 or more is accepted. A positive interval without a
/// duration gets [`DEFAULT_MINUTES_DURATION`].
fn parse_repetition(interval: Option<&Value>, duration: Option<&Value>) -> TriggerResult<(u32, u32)> {
    let interval = interval.map(|v| integer_value("minutes_interval", v)).transpose()?;
    let duration = duration.map(|v| integer_value("minutes_duration", v)).transpose()?;

    if let Some(duration) = duration {
        let checked_interval = interval.unwrap_or(-1);
        if duration < 0 || (duration != 0 && duration <= checked_interval) {
            return Err(TriggerError::validation(
                "minutes_duration must be an integer greater than minutes_interval and equal to or greater than 0",
            ));
        }
    }

    if let Some(interval) = interval {
        if interval < 0 {
            return Err(TriggerError::validation(
                "minutes_interval must be an integer greater or equal to 0",
            ));
        }
        let checked_duration = duration.unwrap_or(DEFAULT_MINUTES_DURATION as i64);
        if interval > 0 && interval >= checked_duration {
            return Err(TriggerError::validation(
                "minutes_interval cannot be set without minutes_duration also being set to a number greater than 0",
            ));
        }
    }

    let (interval, duration) = match (interval, duration) {
        (Some(interval), Some(duration)) => (interval, duration),
        (Some(interval), None) if interval > 0 => (interval, DEFAULT_MINUTES_DURATION as i64),
        (Some(interval), None) => (interval, 0),
        (None, Some(duration)) => (0, duration),
        (None, None) => (0, 0),
    };

    let to_minutes = |field: &str, minutes: i64| {
        u32::try_from(minutes)
            .map_err(|_| TriggerError::validation(format!("{field} is too large: {minutes}")))
    };
    Ok((
        to_minutes("minutes_interval", interval)?,
        to_minutes("minutes_duration", duration)?,
    ))
}

/// Validate a raw manifest trigger and return its canonical form.
///
/// Keys are matched case-insensitively and `null` values count as absent.
/// The input is not modified.
pub fn canonicalize_and_validate(raw: &Value) -> TriggerResult<ManifestTrigger> {
    let Value::Object(raw_map) = raw else {
        return Err(TriggerError::type_error(format!(
            "trigger must be a hash, got {}",
            kind_of(raw)
        )));
    };

    let mut unknown: Vec<String> = raw_map
        .keys()
        .map(|k| k.to_lowercase())
        .filter(|k| !VALID_KEYS.contains(&k.as_str()))
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        unknown.dedup();
        return Err(TriggerError::UnknownOptions(unknown));
    }

    let fields: BTreeMap<String, Value> = raw_map
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.to_lowercase(), downcase_keys(v)))
        .collect();

    let schedule = parse_schedule(fields.get("schedule"))?;

    let start_time = match fields.get("start_time") {
        Some(value) => parse_start_time(value)?,
        None => {
            return Err(TriggerError::validation(
                "Must specify 'start_time' when defining a trigger",
            ))
        }
    };

    let start_date = fields.get("start_date").map(parse_start_date).transpose()?;
    if schedule == Schedule::Once && start_date.is_none() {
        return Err(TriggerError::validation(
            "Must specify 'start_date' when defining a one-time trigger",
        ));
    }

    let every = fields.get("every").map(parse_every).transpose()?;
    let day_of_week = fields.get("day_of_week").map(parse_days_of_week).transpose()?;
    let months = fields.get("months").map(parse_months).transpose()?;
    let on = fields.get("on").map(parse_on).transpose()?;
    let which_occurrence = fields
        .get("which_occurrence")
        .map(|v| string_value("which_occurrence", v).and_then(|s| Occurrence::from_name(&s)))
        .transpose()?;

    let details = match schedule {
        Schedule::Once => ScheduleDetails::Once,
        Schedule::Daily => ScheduleDetails::Daily { every },
        Schedule::Weekly => ScheduleDetails::Weekly { every, day_of_week },
        Schedule::Monthly => match (on, which_occurrence) {
            (Some(on), _) => {
                if day_of_week.is_some() || which_occurrence.is_some() {
                    return Err(TriggerError::validation(
                        "Neither 'day_of_week' nor 'which_occurrence' can be specified when creating a monthly date-based trigger",
                    ));
                }
                ScheduleDetails::MonthlyDate { months, on }
            }
            (None, Some(which_occurrence)) => {
                let Some(day_of_week) = day_of_week else {
                    return Err(TriggerError::validation(
                        "day_of_week must be specified when creating a monthly day-of-week based trigger",
                    ));
                };
                ScheduleDetails::MonthlyDow {
                    months,
                    which_occurrence,
                    day_of_week,
                }
            }
            (None, None) if day_of_week.is_some() => {
                return Err(TriggerError::validation(
                    "which_occurrence must be specified when creating a monthly day-of-week based trigger",
                ))
            }
            (None, None) => {
                return Err(TriggerError::validation(format!(
                    "Don't know how to create a 'monthly' schedule with the options: {}",
                    fields.keys().cloned().collect::<Vec<_>>().join(", ")
                )))
            }
        },
        Schedule::Boot | Schedule::Logon => {
            return Err(TriggerError::validation(format!(
                "Unknown schedule type: {:?}",
                schedule.name()
            )))
        }
    };

    let ignored: Vec<&str> = ignored_keys(schedule)
        .iter()
        .copied()
        .filter(|k| fields.contains_key(*k))
        .collect();
    if !ignored.is_empty() {
        tracing::debug!(%schedule, ?ignored, "Ignoring trigger options that do not apply to this schedule");
    }

    let (minutes_interval, minutes_duration) =
        parse_repetition(fields.get("minutes_interval"), fields.get("minutes_duration"))?;

    Ok(ManifestTrigger {
        details,
        start_date,
        start_time: Some(start_time),
        enabled: fields.get("enabled").map(parse_enabled).transpose()?.unwrap_or(true),
        minutes_interval,
        minutes_duration,
        index: fields.get("index").map(parse_index).transpose()?,
    })
}

fn ignored_keys(schedule: Schedule) -> &'static [&'static str] {
    match schedule {
        Schedule::Once => &["every", "day_of_week", "months", "on", "which_occurrence"],
        Schedule::Daily => &["day_of_week", "months", "on", "which_occurrence"],
        Schedule::Weekly => &["months", "on", "which_occurrence"],
        Schedule::Monthly => &["every"],
        Schedule::Boot | Schedule::Logon => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(raw: Value) -> ManifestTrigger {
        canonicalize_and_validate(&raw).unwrap()
    }

    fn error(raw: Value) -> String {
        canonicalize_and_validate(&raw).unwrap_err().to_string()
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let trigger = canonical(json!({
            "Schedule": "daily",
            "START_TIME": "5:30",
            "Every": "3",
        }));
        assert_eq!(trigger.details, ScheduleDetails::Daily { every: Some(3) });
        assert_eq!(trigger.start_time, NaiveTime::from_hms_opt(5, 30, 0));
        assert!(trigger.enabled);
    }

    #[test]
    fn test_unknown_keys_are_listed() {
        let err = canonicalize_and_validate(&json!({
            "schedule": "daily",
            "start_time": "10:00",
            "Foo": 1,
            "bar": 2,
        }))
        .unwrap_err();
        assert_eq!(
            err,
            TriggerError::UnknownOptions(vec!["bar".to_string(), "foo".to_string()])
        );
    }

    #[test]
    fn test_non_hash_is_a_type_error() {
        let err = canonicalize_and_validate(&json!("daily")).unwrap_err();
        assert!(matches!(err, TriggerError::Type(_)));
    }

    #[test]
    fn test_input_is_not_modified() {
        let raw = json!({"SCHEDULE": "once", "start_date": "2011-09-12", "start_time": "5:30 pm"});
        let before = raw.clone();
        canonical(raw.clone());
        assert_eq!(raw, before);
    }

    #[test]
    fn test_schedule_must_be_supported() {
        assert!(error(json!({"schedule": "hourly", "start_time": "10:00"})).contains("Unknown schedule type"));
        assert!(error(json!({"start_time": "10:00"})).contains("Unknown schedule type"));
        assert!(error(json!({"schedule": "boot", "start_time": "10:00"})).contains("Unknown schedule type"));
    }

    #[test]
    fn test_start_time_formats() {
        for (input, expected) in [
            ("5:30", (5, 30)),
            ("05:30", (5, 30)),
            ("17:45:59", (17, 45)),
            ("5:30 pm", (17, 30)),
            ("5:30PM", (17, 30)),
            ("12:15 am", (0, 15)),
            ("12:15 pm", (12, 15)),
        ] {
            let trigger = canonical(json!({"schedule": "daily", "start_time": input}));
            assert_eq!(
                trigger.start_time,
                NaiveTime::from_hms_opt(expected.0, expected.1, 0),
                "{input}"
            );
        }
        assert_eq!(
            canonical(json!({"schedule": "daily", "start_time": "5:30 pm"})).to_value()["start_time"],
            "17:30"
        );
    }

    #[test]
    fn test_invalid_start_time() {
        for input in ["25:00", "13:00 pm", "noon", "10", "10:60"] {
            assert!(
                error(json!({"schedule": "daily", "start_time": input})).contains("Invalid start_time"),
                "{input}"
            );
        }
    }

    #[test]
    fn test_start_time_is_required() {
        assert_eq!(
            error(json!({"schedule": "daily"})),
            "Must specify 'start_time' when defining a trigger"
        );
    }

    #[test]
    fn test_once_requires_start_date() {
        assert!(error(json!({"schedule": "once", "start_time": "10:00"})).contains("start_date"));
        assert!(canonicalize_and_validate(&json!({"schedule": "daily", "start_time": "10:00"})).is_ok());
    }

    #[test]
    fn test_start_date_floor() {
        assert!(error(json!({"schedule": "once", "start_date": "1752-12-31", "start_time": "10:00"}))
            .contains("on or after 1753-01-01"));
        let trigger = canonical(json!({"schedule": "once", "start_date": "1753-01-01", "start_time": "10:00"}));
        assert_eq!(trigger.start_date, NaiveDate::from_ymd_opt(1753, 1, 1));
    }

    #[test]
    fn test_start_date_is_reformatted_unpadded() {
        let trigger = canonical(json!({"schedule": "once", "start_date": "2011-09-02", "start_time": "10:00"}));
        assert_eq!(trigger.to_value()["start_date"], "2011-9-2");
        let slashed = canonical(json!({"schedule": "once", "start_date": "2011/9/2", "start_time": "10:00"}));
        assert_eq!(slashed.start_date, trigger.start_date);
        assert!(error(json!({"schedule": "once", "start_date": "2011-02-30", "start_time": "10:00"}))
            .contains("Invalid start_date"));
    }

    #[test]
    fn test_monthly_requires_one_option_set() {
        let message = error(json!({"schedule": "monthly", "start_time": "10:00", "months": [1]}));
        assert_eq!(
            message,
            "Don't know how to create a 'monthly' schedule with the options: months, schedule, start_time"
        );

        let both = error(json!({
            "schedule": "monthly", "start_time": "10:00",
            "on": [1], "which_occurrence": "first", "day_of_week": "mon",
        }));
        assert!(both.contains("Neither 'day_of_week' nor 'which_occurrence'"));

        let missing_days = error(json!({
            "schedule": "monthly", "start_time": "10:00", "which_occurrence": "first",
        }));
        assert!(missing_days.contains("day_of_week must be specified"));

        let missing_occurrence = error(json!({
            "schedule": "monthly", "start_time": "10:00", "day_of_week": ["mon"],
        }));
        assert_eq!(
            missing_occurrence,
            "which_occurrence must be specified when creating a monthly day-of-week based trigger"
        );
    }

    #[test]
    fn test_monthly_variants() {
        let by_date = canonical(json!({
            "schedule": "monthly", "start_time": "10:00", "on": ["last", 9, "3", 9],
        }));
        assert_eq!(
            by_date.details,
            ScheduleDetails::MonthlyDate {
                months: None,
                on: vec![MonthDay::Day(3), MonthDay::Day(9), MonthDay::Last],
            }
        );

        let by_weekday = canonical(json!({
            "schedule": "monthly", "start_time": "10:00",
            "which_occurrence": "Second", "day_of_week": "sat", "months": ["12", 1],
        }));
        assert_eq!(
            by_weekday.details,
            ScheduleDetails::MonthlyDow {
                months: Some(vec![1, 12]),
                which_occurrence: Occurrence::Second,
                day_of_week: vec![Day::Sat],
            }
        );
    }

    #[test]
    fn test_list_fields_are_validated() {
        assert!(error(json!({"schedule": "weekly", "start_time": "10:00", "day_of_week": ["mon", "blah"]}))
            .contains("'blah'"));
        assert!(matches!(
            canonicalize_and_validate(&json!({"schedule": "weekly", "start_time": "10:00", "day_of_week": {"a": 1}})),
            Err(TriggerError::Type(_))
        ));
        assert!(error(json!({"schedule": "monthly", "start_time": "10:00", "on": [1], "months": [13]}))
            .contains("'13'"));
        assert!(error(json!({"schedule": "monthly", "start_time": "10:00", "on": [0]}))
            .contains("between 1 and 31"));
        assert!(error(json!({"schedule": "weekly", "start_time": "10:00", "day_of_week": []}))
            .contains("at least one day"));
    }

    #[test]
    fn test_every_must_be_positive_integer() {
        assert!(error(json!({"schedule": "daily", "start_time": "10:00", "every": "often"}))
            .contains("Invalid every value: often"));
        assert!(error(json!({"schedule": "daily", "start_time": "10:00", "every": 0}))
            .contains("positive integer"));
    }

    #[test]
    fn test_enabled_coercion() {
        assert!(!canonical(json!({"schedule": "daily", "start_time": "10:00", "enabled": "FALSE"})).enabled);
        assert!(!canonical(json!({"schedule": "daily", "start_time": "10:00", "enabled": false})).enabled);
        assert!(error(json!({"schedule": "daily", "start_time": "10:00", "enabled": "maybe"}))
            .contains("Invalid enabled value"));
    }

    #[test]
    fn test_interval_must_be_less_than_duration() {
        let base = |interval: Value, duration: Value| {
            let mut raw = json!({"schedule": "daily", "start_time": "10:00"});
            if !interval.is_null() {
                raw["minutes_interval"] = interval;
            }
            if !duration.is_null() {
                raw["minutes_duration"] = duration;
            }
            canonicalize_and_validate(&raw).map(|t| (t.minutes_interval, t.minutes_duration))
        };

        assert!(base(json!(10), json!(10)).is_err());
        assert_eq!(base(json!(10), json!(11)).unwrap(), (10, 11));
        assert_eq!(base(json!("10"), Value::Null).unwrap(), (10, 1440));
        assert!(base(json!(1440), Value::Null).is_err());
        assert_eq!(base(Value::Null, json!(5)).unwrap(), (0, 5));
        assert_eq!(base(Value::Null, json!(0)).unwrap(), (0, 0));
        assert_eq!(base(json!(0), Value::Null).unwrap(), (0, 0));
        assert!(base(json!(10), json!(0)).is_err());
        assert!(base(json!(-1), Value::Null).is_err());
        assert!(base(Value::Null, json!(-5)).is_err());
        assert_eq!(base(Value::Null, Value::Null).unwrap(), (0, 0));
    }

    #[test]
    fn test_index_is_carried_and_blocks_writes() {
        let trigger = canonical(json!({"schedule": "daily", "start_time": "10:00", "index": 2}));
        assert_eq!(trigger.index, Some(2));
        assert!(trigger.ensure_writable().is_err());
        assert_eq!(trigger.to_value()["index"], 2);
    }

    #[test]
    fn test_output_shape() {
        let trigger = canonical(json!({
            "schedule": "weekly", "start_date": "2011-9-12", "start_time": "15:00",
            "every": 2, "day_of_week": ["fri", "mon"],
        }));
        assert_eq!(
            trigger.to_value(),
            json!({
                "schedule": "weekly",
                "start_date": "2011-9-12",
                "start_time": "15:00",
                "enabled": true,
                "minutes_interval": 0,
                "minutes_duration": 0,
                "every": "2",
                "day_of_week": ["mon", "fri"],
            })
        );
        assert_eq!(serde_json::to_value(&trigger).unwrap(), trigger.to_value());
    }

    #[test]
    fn test_nulls_count_as_absent() {
        let trigger = canonical(json!({"schedule": "weekly", "start_time": "10:00", "every": null}));
        assert_eq!(trigger.details, ScheduleDetails::Weekly { every: None, day_of_week: None });
    }
}
