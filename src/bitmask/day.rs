//! Day-of-week codec: sun = 0x1 ... sat = 0x40

use super::{quoted_list, set_bits};
use crate::error::{TriggerError, TriggerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Sun,
    Mon,
    Tues,
    Wed,
    Thurs,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sun,
        Day::Mon,
        Day::Tues,
        Day::Wed,
        Day::Thurs,
        Day::Fri,
        Day::Sat,
    ];

    /// Every day selected
    pub const MAX_BITMASK: u32 = 0b111_1111;

    pub fn name(self) -> &'static str {
        match self {
            Day::Sun => "sun",
            Day::Mon => "mon",
            Day::Tues => "tues",
            Day::Wed => "wed",
            Day::Thurs => "thurs",
            Day::Fri => "fri",
            Day::Sat => "sat",
        }
    }

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Case-insensitive lookup by manifest name
    pub fn from_name(name: &str) -> Option<Day> {
        let name = name.trim();
        Day::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve names to days, listing every invalid entry on failure.
/// The result is sorted and de-duplicated.
pub fn names_to_days<S: AsRef<str>>(names: &[S]) -> TriggerResult<Vec<Day>> {
    let mut days = Vec::with_capacity(names.len());
    let mut invalid = Vec::new();

    for name in names {
        match Day::from_name(name.as_ref()) {
            Some(day) => days.push(day),
            None => invalid.push(name.as_ref().to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(TriggerError::validation(format!(
            "Day names must be one of {}; invalid: {}",
            quoted_list(&Day::ALL.map(Day::name)),
            quoted_list(&invalid)
        )));
    }

    days.sort();
    days.dedup();
    Ok(days)
}

pub fn days_to_bitmask(days: &[Day]) -> u32 {
    days.iter().fold(0, |mask, day| mask | day.bit())
}

pub fn names_to_bitmask<S: AsRef<str>>(names: &[S]) -> TriggerResult<u32> {
    Ok(days_to_bitmask(&names_to_days(names)?))
}

pub fn bitmask_to_days(bitmask: u32) -> TriggerResult<Vec<Day>> {
    if bitmask > Day::MAX_BITMASK {
        return Err(TriggerError::validation(format!(
            "Day bitmask {bitmask} must be between 0 and {}",
            Day::MAX_BITMASK
        )));
    }
    Ok(set_bits(bitmask).map(|bit| Day::ALL[bit as usize]).collect())
}

pub fn bitmask_to_names(bitmask: u32) -> TriggerResult<Vec<&'static str>> {
    Ok(bitmask_to_days(bitmask)?.into_iter().map(Day::name).collect())
}
