//! Bitmask codecs - Convert between symbolic names/indexes and the integer
//! bitmasks used by the V1 and V2 trigger formats

pub mod day;
pub mod days_of_month;
pub mod month;
pub mod occurrence;

pub use day::Day;
pub use days_of_month::MonthDay;
pub use occurrence::Occurrence;

/// Render a list of rejected inputs for an error message
fn quoted_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Indexes of the bits set in `bitmask`, lowest first
fn set_bits(bitmask: u32) -> impl Iterator<Item = u32> {
    (0..32).filter(move |bit| bitmask & (1 << bit) != 0)
}
