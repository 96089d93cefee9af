//! Pickup stations and their reserved tracking-number ranges.

use serde::{Deserialize, Serialize};

use crate::allocator;
use crate::code::{CodeError, TrackingCode, SEPARATOR};
use crate::error::{Error, Result};

/// A pickup station owning the inclusive range `range_min..=range_max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Display name, also the prefix of every tracking code it issues.
    pub name: String,
    /// Lowest number in the station's range.
    pub range_min: u32,
    /// Highest number in the station's range.
    pub range_max: u32,
}

impl Station {
    /// Create a station.
    #[must_use]
    pub fn new(name: impl Into<String>, range_min: u32, range_max: u32) -> Self {
        Self {
            name: name.into(),
            range_min,
            range_max,
        }
    }

    /// Number of tracking numbers in the range.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        if self.range_min > self.range_max {
            0
        } else {
            u64::from(self.range_max - self.range_min) + 1
        }
    }

    /// Check whether `number` lies in the station's range.
    #[must_use]
    pub fn contains(&self, number: u32) -> bool {
        allocator::is_valid_code(self, number)
    }

    /// Tracking code for `number` at this station.
    #[must_use]
    pub fn code_for(&self, number: u32) -> TrackingCode {
        TrackingCode::new(self.name.clone(), number)
    }

    fn overlaps(&self, other: &Station) -> bool {
        self.range_min <= other.range_max && other.range_min <= self.range_max
    }
}

/// The configured set of stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationTable {
    stations: Vec<Station>,
}

impl Default for StationTable {
    fn default() -> Self {
        Self::new(default_stations())
    }
}

/// The five stations of the default deployment.
#[must_use]
pub fn default_stations() -> Vec<Station> {
    vec![
        Station::new("Embu", 1, 300),
        Station::new("Ugweri", 301, 600),
        Station::new("Runyenjes", 601, 900),
        Station::new("Kiritiri", 901, 1200),
        Station::new("Siakago", 1201, 1500),
    ]
}

impl StationTable {
    /// Wrap a list of stations. Call [`StationTable::validate`] before use.
    #[must_use]
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Look up a station by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// Look up a station by name, failing with [`CodeError::UnknownStation`].
    ///
    /// # Errors
    ///
    /// Returns an error if no station has this name.
    pub fn require(&self, name: &str) -> std::result::Result<&Station, CodeError> {
        self.get(name).ok_or_else(|| CodeError::UnknownStation {
            name: name.to_string(),
        })
    }

    /// The station whose range contains `number`, if any.
    #[must_use]
    pub fn owner_of(&self, number: u32) -> Option<&Station> {
        self.stations.iter().find(|s| s.contains(number))
    }

    /// Iterate over the stations in configured order.
    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    /// Number of stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the table has no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Resolve the owning station of a code and check its number.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::UnknownStation`] or [`CodeError::OutOfRange`].
    pub fn validate_code(&self, code: &TrackingCode) -> std::result::Result<&Station, CodeError> {
        let station = self.require(&code.station)?;
        allocator::check_number(station, code.number)?;
        Ok(station)
    }

    /// Check the table invariants: non-empty trimmed names without `-`,
    /// unique names, `range_min <= range_max`, and no two ranges overlapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(Error::config_validation("at least one station is required"));
        }

        for (i, station) in self.stations.iter().enumerate() {
            if station.name.trim().is_empty() {
                return Err(Error::config_validation("station name cannot be empty"));
            }
            if station.name.trim() != station.name {
                return Err(Error::config_validation(format!(
                    "station name '{}' has leading or trailing whitespace",
                    station.name
                )));
            }
            if station.name.contains(SEPARATOR) {
                return Err(Error::config_validation(format!(
                    "station name '{}' cannot contain '{SEPARATOR}'",
                    station.name
                )));
            }
            if station.range_min > station.range_max {
                return Err(Error::config_validation(format!(
                    "station '{}' has range_min ({}) greater than range_max ({})",
                    station.name, station.range_min, station.range_max
                )));
            }

            for other in &self.stations[i + 1..] {
                if other.name == station.name {
                    return Err(Error::config_validation(format!(
                        "duplicate station name '{}'",
                        station.name
                    )));
                }
                if station.overlaps(other) {
                    return Err(Error::config_validation(format!(
                        "ranges of stations '{}' and '{}' overlap",
                        station.name, other.name
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a StationTable {
    type Item = &'a Station;
    type IntoIter = std::slice::Iter<'a, Station>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = StationTable::default();
        assert_eq!(table.len(), 5);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_get_and_require() {
        let table = StationTable::default();
        assert_eq!(table.get("Ugweri").unwrap().range_min, 301);
        assert!(table.get("ugweri").is_none());

        let err = table.require("Nairobi").unwrap_err();
        assert_eq!(
            err,
            CodeError::UnknownStation {
                name: "Nairobi".to_string()
            }
        );
    }

    #[test]
    fn test_owner_of() {
        let table = StationTable::default();
        assert_eq!(table.owner_of(1).unwrap().name, "Embu");
        assert_eq!(table.owner_of(300).unwrap().name, "Embu");
        assert_eq!(table.owner_of(301).unwrap().name, "Ugweri");
        assert_eq!(table.owner_of(1500).unwrap().name, "Siakago");
        assert!(table.owner_of(0).is_none());
        assert!(table.owner_of(1501).is_none());
    }

    #[test]
    fn test_capacity() {
        assert_eq!(Station::new("Embu", 1, 300).capacity(), 300);
        assert_eq!(Station::new("One", 7, 7).capacity(), 1);
        assert_eq!(Station::new("All", 0, u32::MAX).capacity(), 1 << 32);
    }

    #[test]
    fn test_validate_code() {
        let table = StationTable::default();
        let ok = TrackingCode::new("Embu", 300);
        assert_eq!(table.validate_code(&ok).unwrap().name, "Embu");

        let wrong_range = TrackingCode::new("Embu", 301);
        assert!(matches!(
            table.validate_code(&wrong_range),
            Err(CodeError::OutOfRange { number: 301, .. })
        ));

        let unknown = TrackingCode::new("Meru", 1);
        assert!(matches!(
            table.validate_code(&unknown),
            Err(CodeError::UnknownStation { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let table = StationTable::new(vec![
            Station::new("Embu", 1, 300),
            Station::new("Ugweri", 300, 600),
        ]);
        let err = table.validate().unwrap_err().to_string();
        assert!(err.contains("overlap"));
    }

    #[test]
    fn test_validate_rejects_separator_in_name() {
        let table = StationTable::new(vec![Station::new("Old-Town", 1, 10)]);
        let err = table.validate().unwrap_err().to_string();
        assert!(err.contains("cannot contain '-'"));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let table = StationTable::new(vec![Station::new("Embu", 10, 1)]);
        let err = table.validate().unwrap_err().to_string();
        assert!(err.contains("greater than range_max"));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let table = StationTable::new(vec![
            Station::new("Embu", 1, 10),
            Station::new("Embu", 11, 20),
        ]);
        let err = table.validate().unwrap_err().to_string();
        assert!(err.contains("duplicate station name"));
    }

    #[test]
    fn test_validate_rejects_empty_table_and_name() {
        assert!(StationTable::new(Vec::new()).validate().is_err());
        assert!(StationTable::new(vec![Station::new(" ", 1, 2)])
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_padded_name() {
        for name in ["Embu ", " Embu", "Embu\t"] {
            let table = StationTable::new(vec![Station::new(name, 1, 10)]);
            let err = table.validate().unwrap_err().to_string();
            assert!(err.contains("whitespace"), "accepted {name:?}");
        }
        let inner = StationTable::new(vec![Station::new("Old Town", 1, 10)]);
        assert!(inner.validate().is_ok());
    }

    #[test]
    fn test_table_serializes_as_list() {
        let table = StationTable::new(vec![Station::new("Embu", 1, 300)]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"name":"Embu","range_min":1,"range_max":300}]"#);
    }
}
