//! Month codec: january = bit 0 ... december = bit 11

use super::{quoted_list, set_bits};
use crate::error::{TriggerError, TriggerResult};

pub const MAX_BITMASK: u32 = 0xFFF;

const NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// All month indexes, 1-12
pub fn all() -> Vec<u8> {
    (1..=12).collect()
}

/// Parse a month number ("3") or a (possibly abbreviated) english name ("march", "mar")
pub fn parse(text: &str) -> Option<u8> {
    let text = text.trim().to_ascii_lowercase();
    if let Ok(index) = text.parse::<u8>() {
        return (1..=12).contains(&index).then_some(index);
    }
    if text.len() < 3 {
        return None;
    }
    NAMES
        .iter()
        .position(|name| text.starts_with(name) && full_name(name).starts_with(text.as_str()))
        .map(|position| position as u8 + 1)
}

fn full_name(short: &str) -> &'static str {
    match short {
        "jan" => "january",
        "feb" => "february",
        "mar" => "march",
        "apr" => "april",
        "may" => "may",
        "jun" => "june",
        "jul" => "july",
        "aug" => "august",
        "sep" => "september",
        "oct" => "october",
        "nov" => "november",
        _ => "december",
    }
}

pub fn indexes_to_bitmask(months: &[u8]) -> TriggerResult<u32> {
    let invalid: Vec<String> = months
        .iter()
        .filter(|m| !(1..=12).contains(*m))
        .map(|m| m.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(TriggerError::validation(format!(
            "Month indexes must be between 1 and 12; invalid: {}",
            quoted_list(&invalid)
        )));
    }
    Ok(months.iter().fold(0, |mask, m| mask | 1 << (m - 1)))
}

pub fn bitmask_to_indexes(bitmask: u32) -> TriggerResult<Vec<u8>> {
    if bitmask > MAX_BITMASK {
        return Err(TriggerError::validation(format!(
            "Month bitmask {bitmask} must be between 0 and {MAX_BITMASK}"
        )));
    }
    Ok(set_bits(bitmask).map(|bit| bit as u8 + 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_months() {
        assert_eq!(indexes_to_bitmask(&all()).unwrap(), MAX_BITMASK);
        assert_eq!(bitmask_to_indexes(MAX_BITMASK).unwrap(), all());
    }

    #[test]
    fn test_round_trip() {
        let mask = indexes_to_bitmask(&[12, 1, 6]).unwrap();
        assert_eq!(mask, 0x1 | 0x20 | 0x800);
        assert_eq!(bitmask_to_indexes(mask).unwrap(), vec![1, 6, 12]);
    }

    #[test]
    fn test_invalid_indexes() {
        let err = indexes_to_bitmask(&[0, 4, 13]).unwrap_err();
        assert!(err.to_string().contains("'0', '13'"));
        assert!(bitmask_to_indexes(0x1000).is_err());
    }

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!(parse("3"), Some(3));
        assert_eq!(parse("March"), Some(3));
        assert_eq!(parse("sept"), Some(9));
        assert_eq!(parse("dec"), Some(12));
        assert_eq!(parse("13"), None);
        assert_eq!(parse("ma"), None);
        assert_eq!(parse("marchy"), None);
    }
}
