//! Tracking codes.
//!
//! A tracking code is the human-facing identifier of a package, written as
//! `<StationName>-<Number>`. Station names never contain `-`, so a code is
//! always split on its last separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the station name and the number.
pub const SEPARATOR: char = '-';

/// Errors raised while parsing or validating tracking codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// The code does not have the `<name>-<integer>` shape.
    #[error("malformed tracking code '{code}': {reason}")]
    Malformed {
        /// The offending input.
        code: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The number lies outside the owning station's range.
    #[error("number {number} is outside the range of station '{station}' ({min}..={max})")]
    OutOfRange {
        /// Name of the station.
        station: String,
        /// The rejected number.
        number: u32,
        /// Lowest number of the station's range.
        min: u32,
        /// Highest number of the station's range.
        max: u32,
    },

    /// No station with this name is configured.
    #[error("unknown station '{name}'")]
    UnknownStation {
        /// The station name that was looked up.
        name: String,
    },
}

impl CodeError {
    fn malformed(code: &str, reason: &'static str) -> Self {
        Self::Malformed {
            code: code.to_string(),
            reason,
        }
    }
}

/// A parsed tracking code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackingCode {
    /// Name of the station that issued the code.
    pub station: String,
    /// Number within the station's range.
    pub number: u32,
}

impl TrackingCode {
    /// Build a code from its parts.
    #[must_use]
    pub fn new(station: impl Into<String>, number: u32) -> Self {
        Self {
            station: station.into(),
            number,
        }
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.station, self.number)
    }
}

impl FromStr for TrackingCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tracking_code(s)
    }
}

/// Parse a tracking code of the form `<StationName>-<Number>`.
///
/// The input is split on the last `-`. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`CodeError::Malformed`] if there is no separator, the station
/// part is empty, or the suffix is not a non-negative integer.
///
/// # Examples
///
/// ```
/// use parcelrange::code::parse_tracking_code;
///
/// let code = parse_tracking_code("Embu-42").unwrap();
/// assert_eq!(code.station, "Embu");
/// assert_eq!(code.number, 42);
/// assert!(parse_tracking_code("Embu-x").is_err());
/// ```
pub fn parse_tracking_code(code: &str) -> Result<TrackingCode, CodeError> {
    let trimmed = code.trim();
    let (station, suffix) = trimmed
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| CodeError::malformed(code, "missing '-' separator"))?;

    let station = station.trim();
    if station.is_empty() {
        return Err(CodeError::malformed(code, "empty station name"));
    }

    // u32::from_str accepts a leading '+'
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodeError::malformed(code, "suffix is not an integer"));
    }
    let number = suffix
        .parse::<u32>()
        .map_err(|_| CodeError::malformed(code, "suffix is not an integer"))?;

    Ok(TrackingCode::new(station, number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationTable;

    #[test]
    fn test_parse_simple() {
        let code = parse_tracking_code("Embu-1").unwrap();
        assert_eq!(code, TrackingCode::new("Embu", 1));
    }

    #[test]
    fn test_parse_splits_on_last_separator() {
        let code = parse_tracking_code("Old-Town-17").unwrap();
        assert_eq!(code.station, "Old-Town");
        assert_eq!(code.number, 17);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let code = parse_tracking_code("  Ugweri-301 ").unwrap();
        assert_eq!(code, TrackingCode::new("Ugweri", 301));
    }

    #[test]
    fn test_parse_missing_separator() {
        let err = parse_tracking_code("Embu42").unwrap_err();
        assert!(matches!(err, CodeError::Malformed { .. }));
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_parse_non_integer_suffix() {
        for bad in ["Embu-", "Embu-abc", "Embu-4a", "Embu-+4", "Embu-1.5"] {
            let err = parse_tracking_code(bad).unwrap_err();
            assert!(
                matches!(err, CodeError::Malformed { .. }),
                "expected malformed for {bad}"
            );
        }
    }

    #[test]
    fn test_parse_doubled_separator_keeps_dash_in_station() {
        // The last '-' is the separator, so "Embu--3" names station "Embu-".
        let code = parse_tracking_code("Embu--3").unwrap();
        assert_eq!(code, TrackingCode::new("Embu-", 3));
        assert!(StationTable::default().validate_code(&code).is_err());
    }

    #[test]
    fn test_parse_suffix_overflow() {
        assert!(parse_tracking_code("Embu-99999999999").is_err());
    }

    #[test]
    fn test_parse_empty_station() {
        let err = parse_tracking_code("-12").unwrap_err();
        assert!(err.to_string().contains("empty station name"));
    }

    #[test]
    fn test_display_and_from_str_agree() {
        for (name, n) in [("Embu", 1), ("Ugweri", 600), ("Siakago", 1201)] {
            let code = TrackingCode::new(name, n);
            let parsed: TrackingCode = code.to_string().parse().unwrap();
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn test_out_of_range_display() {
        let err = CodeError::OutOfRange {
            station: "Embu".to_string(),
            number: 301,
            min: 1,
            max: 300,
        };
        assert_eq!(
            err.to_string(),
            "number 301 is outside the range of station 'Embu' (1..=300)"
        );
    }
}
