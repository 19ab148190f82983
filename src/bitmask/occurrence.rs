//! Week-of-month codec
//!
//! V1 stores a single occurrence as a constant (first = 1 ... last = 5). V2
//! stores `WeeksOfMonth` as a bitmask (first = bit 0 ... last = bit 4) and
//! nominally allows several weeks at once. Going from V2 to V1 keeps only the
//! lowest selected week.

use super::{quoted_list, set_bits};
use crate::error::{TriggerError, TriggerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occurrence {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
    Last = 5,
}

impl Occurrence {
    pub const ALL: [Occurrence; 5] = [
        Occurrence::First,
        Occurrence::Second,
        Occurrence::Third,
        Occurrence::Fourth,
        Occurrence::Last,
    ];

    pub const MAX_WEEKS_BITMASK: u32 = 0b1_1111;

    pub fn name(self) -> &'static str {
        match self {
            Occurrence::First => "first",
            Occurrence::Second => "second",
            Occurrence::Third => "third",
            Occurrence::Fourth => "fourth",
            Occurrence::Last => "last",
        }
    }

    pub fn from_name(name: &str) -> TriggerResult<Self> {
        let trimmed = name.trim();
        Occurrence::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                TriggerError::validation(format!(
                    "which_occurrence must be one of {}; invalid: '{name}'",
                    quoted_list(&Occurrence::ALL.map(Occurrence::name))
                ))
            })
    }

    /// V1 `weeks` constant
    pub fn constant(self) -> u32 {
        self as u32
    }

    pub fn from_constant(constant: u32) -> TriggerResult<Self> {
        Occurrence::ALL
            .into_iter()
            .find(|o| o.constant() == constant)
            .ok_or_else(|| {
                TriggerError::validation(format!(
                    "Week of month constant {constant} must be between 1 and 5"
                ))
            })
    }

    /// V2 `WeeksOfMonth` bit
    pub fn week_bit(self) -> u32 {
        1 << (self.constant() - 1)
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn weeks_bitmask_to_occurrences(bitmask: u32) -> TriggerResult<Vec<Occurrence>> {
    if bitmask > Occurrence::MAX_WEEKS_BITMASK {
        return Err(TriggerError::validation(format!(
            "WeeksOfMonth bitmask {bitmask} must be between 0 and {}",
            Occurrence::MAX_WEEKS_BITMASK
        )));
    }
    Ok(set_bits(bitmask).map(|bit| Occurrence::ALL[bit as usize]).collect())
}

/// Collapse a V2 bitmask to the single occurrence V1 can hold.
///
/// Lossy: when several weeks are selected only the lowest one survives.
pub fn weeks_bitmask_to_single(bitmask: u32) -> TriggerResult<Option<Occurrence>> {
    let occurrences = weeks_bitmask_to_occurrences(bitmask)?;
    if occurrences.len() > 1 {
        tracing::debug!(
            bitmask,
            kept = %occurrences[0],
            "WeeksOfMonth selects several weeks, keeping only the first"
        );
    }
    Ok(occurrences.first().copied())
}
