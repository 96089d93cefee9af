//! Per-station summaries.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::package::{Package, Quantities};

/// Totals for one station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationSummary {
    /// Station name, as parsed from the tracking codes.
    pub station: String,
    /// Number of package records.
    pub records: usize,
    /// Summed container counts.
    pub quantities: Quantities,
}

/// Per-station record counts and quantity sums.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// One row per station with at least one record, ordered by name.
    pub stations: Vec<StationSummary>,
    /// Records whose tracking code could not be parsed.
    pub malformed: usize,
}

impl Report {
    /// Summarize a package list.
    ///
    /// Packages are attributed to the station named in their tracking code.
    /// Duplicate codes count as separate records; unparseable codes are left
    /// out and counted in [`Report::malformed`].
    #[must_use]
    pub fn from_packages(packages: &[Package]) -> Self {
        let mut rows: BTreeMap<String, StationSummary> = BTreeMap::new();
        let mut malformed = 0;

        for package in packages {
            let code = match package.code() {
                Ok(code) => code,
                Err(err) => {
                    debug!("Package {} left out of report: {}", package.id, err);
                    malformed += 1;
                    continue;
                }
            };

            let row = rows
                .entry(code.station.clone())
                .or_insert_with(|| StationSummary {
                    station: code.station,
                    ..StationSummary::default()
                });
            row.records += 1;
            row.quantities += package.quantities;
        }

        Self {
            stations: rows.into_values().collect(),
            malformed,
        }
    }

    /// Summary row for a station, if it has records.
    #[must_use]
    pub fn station(&self, name: &str) -> Option<&StationSummary> {
        self.stations.iter().find(|s| s.station == name)
    }

    /// Total well-formed records.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.stations.iter().map(|s| s.records).sum()
    }

    /// Quantities summed over every station.
    #[must_use]
    pub fn total_quantities(&self) -> Quantities {
        let mut total = Quantities::default();
        for row in &self.stations {
            total += row.quantities;
        }
        total
    }
}
