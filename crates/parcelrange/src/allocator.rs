//! Range allocation for tracking numbers.
//!
//! Every function here is a pure computation over its inputs. Nothing is
//! reserved: two callers looking at the same issued set get the same
//! suggestion, and the store is what rejects the second writer.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::code::{parse_tracking_code, CodeError};
use crate::station::Station;

/// Whether `number` lies in `station`'s inclusive range.
#[must_use]
pub fn is_valid_code(station: &Station, number: u32) -> bool {
    station.range_min <= number && number <= station.range_max
}

/// Same test as [`is_valid_code`], as a `Result` for callers that report.
///
/// # Errors
///
/// Returns [`CodeError::OutOfRange`] if `number` is outside the range.
pub fn check_number(station: &Station, number: u32) -> Result<(), CodeError> {
    if is_valid_code(station, number) {
        Ok(())
    } else {
        Err(CodeError::OutOfRange {
            station: station.name.clone(),
            number,
            min: station.range_min,
            max: station.range_max,
        })
    }
}

/// The lowest number in `station`'s range that is not in `issued`.
///
/// Returns `None` when every number in the range is taken.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use parcelrange::allocator::next_free_number;
/// use parcelrange::station::Station;
///
/// let embu = Station::new("Embu", 1, 300);
/// let issued: HashSet<u32> = [1, 2, 3, 5].into_iter().collect();
/// assert_eq!(next_free_number(&embu, &issued), Some(4));
/// ```
#[must_use]
pub fn next_free_number(station: &Station, issued: &HashSet<u32>) -> Option<u32> {
    (station.range_min..=station.range_max).find(|n| !issued.contains(n))
}

/// Numbers already issued at `station`, derived from stored tracking codes.
///
/// Codes belonging to other stations are ignored. Malformed codes are
/// skipped.
pub fn issued_numbers<'a, I>(station: &Station, codes: I) -> HashSet<u32>
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter_map(|raw| match parse_tracking_code(raw) {
            Ok(code) => Some(code),
            Err(err) => {
                debug!("Skipping stored code: {}", err);
                None
            }
        })
        .filter(|code| code.station == station.name)
        .map(|code| code.number)
        .collect()
}

/// Per-station record counts derived from tracking codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationCounts {
    /// Records per station name, in name order.
    pub counts: BTreeMap<String, usize>,
    /// Number of codes that could not be parsed.
    pub malformed: usize,
}

impl StationCounts {
    /// Count for one station, zero if it has no records.
    #[must_use]
    pub fn get(&self, station: &str) -> usize {
        self.counts.get(station).copied().unwrap_or(0)
    }

    /// Total number of well-formed records counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Count records per station.
///
/// Duplicate codes are counted once per record. Malformed codes are left
/// out of the counts and tallied in [`StationCounts::malformed`].
pub fn count_by_station<'a, I>(codes: I) -> StationCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = StationCounts::default();
    for raw in codes {
        match parse_tracking_code(raw) {
            Ok(code) => *result.counts.entry(code.station).or_insert(0) += 1,
            Err(err) => {
                debug!("Excluding from counts: {}", err);
                result.malformed += 1;
            }
        }
    }
    result
}
