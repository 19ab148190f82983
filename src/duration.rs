//! Duration codec for the ISO-8601 strings used by V2 repetition patterns
//!
//! Format: `P<n>Y<n>M<n>DT<n>H<n>M<n>S`, any component optional
//! (`PT5M`, `P1M4DT2H5M`, `P1D`).

/// Approximate; matches what the scheduler UI reports
const SECONDS_PER_YEAR: f64 = 365.2422 * 24.0 * 3600.0;
const SECONDS_PER_MONTH: f64 = SECONDS_PER_YEAR / 12.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationParts {
    pub years: Option<u64>,
    pub months: Option<u64>,
    pub days: Option<u64>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

/// Split a duration string into its components.
///
/// Returns `None` when the string does not match the format.
pub fn parse(duration: &str) -> Option<DurationParts> {
    let rest = duration.strip_prefix('P')?;
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let [years, months, days] = components(date, ['Y', 'M', 'D'])?;
    let [hours, minutes, seconds] = match time {
        Some(time) => components(time, ['H', 'M', 'S'])?,
        None => [None; 3],
    };

    Some(DurationParts {
        years,
        months,
        days,
        hours,
        minutes,
        seconds,
    })
}

/// `<digits><unit>` pairs with units in the given order, each at most once
fn components<const N: usize>(text: &str, units: [char; N]) -> Option<[Option<u64>; N]> {
    let mut values = [None; N];
    let mut next_unit = 0;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return None;
        }
        let slot = next_unit + units[next_unit..].iter().position(|u| *u == c)?;
        values[slot] = Some(digits.parse().ok()?);
        digits.clear();
        next_unit = slot + 1;
    }

    digits.is_empty().then_some(values)
}

/// Total seconds, or `None` when the total does not fit in a `u64`
pub fn to_seconds(parts: &DurationParts) -> Option<u64> {
    let approximate = parts.years.unwrap_or(0) as f64 * SECONDS_PER_YEAR
        + parts.months.unwrap_or(0) as f64 * SECONDS_PER_MONTH;
    if approximate >= u64::MAX as f64 {
        return None;
    }
    [
        (parts.days, 86_400),
        (parts.hours, 3_600),
        (parts.minutes, 60),
        (parts.seconds, 1),
    ]
    .into_iter()
    .try_fold(approximate as u64, |total, (value, unit)| {
        value.unwrap_or(0).checked_mul(unit)?.checked_add(total)
    })
}

/// Whole minutes in `duration`, truncated. Missing, empty, malformed or
/// overflowing strings count as zero.
pub fn to_minutes(duration: Option<&str>) -> u64 {
    match duration {
        Some(text) if !text.is_empty() => parse(text)
            .and_then(|p| to_seconds(&p))
            .map(|seconds| seconds / 60)
            .unwrap_or(0),
        _ => 0,
    }
}

pub fn from_minutes(minutes: u32) -> String {
    format!("PT{minutes}M")
}
