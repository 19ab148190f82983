//! Day-of-month codec
//!
//! Days 1-31 occupy bits 0-30 in both trigger formats. The "last day of the
//! month" concept is encoded differently:
//! - V1 stores it as bit 31 (index 32 is the sentinel).
//! - V2 keeps bits 0-30 only and carries a separate `RunOnLastDayOfMonth`
//!   flag.
//!
//! The two encodings are not bit-compatible; use [`v1_to_v2`] / [`v2_to_v1`]
//! to move between them.

use super::set_bits;
use crate::error::{TriggerError, TriggerResult};
use std::fmt;

/// Sentinel index standing for the last day of the month
pub const LAST_DAY_INDEX: u32 = 32;

const LAST_DAY_BIT: u32 = 1 << 31;

/// Bits 0-30
pub const V2_MAX_BITMASK: u32 = LAST_DAY_BIT - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MonthDay {
    Day(u8),
    Last,
}

impl MonthDay {
    /// Accepts 1-31, plus the [`LAST_DAY_INDEX`] sentinel
    pub fn from_index(index: u32) -> TriggerResult<Self> {
        match index {
            1..=31 => Ok(MonthDay::Day(index as u8)),
            LAST_DAY_INDEX => Ok(MonthDay::Last),
            _ => Err(TriggerError::validation(format!(
                "Day of month {index} must be between 1 and 31, or 'last'"
            ))),
        }
    }

    /// Parse a manifest value: a day number or `last`
    pub fn parse(text: &str) -> TriggerResult<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("last") {
            return Ok(MonthDay::Last);
        }
        match text.parse::<u32>() {
            Ok(day @ 1..=31) => Ok(MonthDay::Day(day as u8)),
            _ => Err(TriggerError::validation(format!(
                "Day of month '{text}' must be between 1 and 31, or 'last'"
            ))),
        }
    }

    pub fn index(self) -> u32 {
        match self {
            MonthDay::Day(day) => day as u32,
            MonthDay::Last => LAST_DAY_INDEX,
        }
    }

    fn bit(self) -> u32 {
        1 << (self.index() - 1)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthDay::Day(day) => write!(f, "{day}"),
            MonthDay::Last => f.write_str("last"),
        }
    }
}

/// V1 encoding: `Last` sets bit 31
pub fn indexes_to_bitmask(days: &[MonthDay]) -> u32 {
    days.iter().fold(0, |mask, day| mask | day.bit())
}

/// V1 decoding. Every 32-bit value is legal.
pub fn bitmask_to_indexes(bitmask: u32) -> Vec<MonthDay> {
    set_bits(bitmask)
        .map(|bit| match bit + 1 {
            LAST_DAY_INDEX => MonthDay::Last,
            day => MonthDay::Day(day as u8),
        })
        .collect()
}

/// V2 encoding: returns the day bitmask and the last-day flag
pub fn indexes_to_v2_bitmask(days: &[MonthDay]) -> (u32, bool) {
    let mask = indexes_to_bitmask(days);
    (mask & V2_MAX_BITMASK, mask & LAST_DAY_BIT != 0)
}

pub fn v2_bitmask_to_indexes(bitmask: u32, run_on_last_day: bool) -> TriggerResult<Vec<MonthDay>> {
    if bitmask > V2_MAX_BITMASK {
        return Err(TriggerError::validation(format!(
            "DaysOfMonth bitmask {bitmask} must be between 0 and {V2_MAX_BITMASK}"
        )));
    }
    let mut days = bitmask_to_indexes(bitmask);
    if run_on_last_day {
        days.push(MonthDay::Last);
    }
    Ok(days)
}

pub fn v1_to_v2(bitmask: u32) -> (u32, bool) {
    (bitmask & V2_MAX_BITMASK, bitmask & LAST_DAY_BIT != 0)
}

pub fn v2_to_v1(bitmask: u32, run_on_last_day: bool) -> TriggerResult<u32> {
    let days = v2_bitmask_to_indexes(bitmask, run_on_last_day)?;
    Ok(indexes_to_bitmask(&days))
}
