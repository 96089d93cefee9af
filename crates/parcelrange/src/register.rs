//! Package registration.
//!
//! Registration reads the current package list, picks (or checks) a number
//! in the station's range, and appends the package through the store. The
//! store, not this module, is the final word on uniqueness.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::allocator::{check_number, issued_numbers, next_free_number};
use crate::code::TrackingCode;
use crate::error::{Error, Result};
use crate::package::{NewPackage, Package, PackageDetails, Quantities};
use crate::station::{Station, StationTable};
use crate::storage::PackageStore;

/// Everything needed to register one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Name of the station registering the package.
    pub station: String,
    /// Explicit number; `None` takes the next free one.
    pub number: Option<u32>,
    /// Container counts.
    pub quantities: Quantities,
    /// Contact and routing details.
    pub details: PackageDetails,
}

impl RegisterRequest {
    /// Request the next free number at `station`.
    #[must_use]
    pub fn auto(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            ..Self::default()
        }
    }

    /// Request a specific number at `station`.
    #[must_use]
    pub fn with_number(station: impl Into<String>, number: u32) -> Self {
        Self {
            station: station.into(),
            number: Some(number),
            ..Self::default()
        }
    }
}

/// Issued numbers at `station`, read from the store.
fn issued_at<S>(store: &S, station: &Station) -> Result<HashSet<u32>>
where
    S: PackageStore + ?Sized,
{
    let packages = store.packages()?;
    Ok(issued_numbers(
        station,
        packages.iter().map(|p| p.tracking_code.as_str()),
    ))
}

/// The code the next registration at `station` would receive.
///
/// Returns `Ok(None)` when the station's range is full.
///
/// # Errors
///
/// Returns an error if the station is unknown or the store cannot be read.
pub fn suggest<S>(
    store: &S,
    stations: &StationTable,
    station: &str,
) -> Result<Option<TrackingCode>>
where
    S: PackageStore + ?Sized,
{
    let station = stations.require(station)?;
    let issued = issued_at(store, station)?;
    Ok(next_free_number(station, &issued).map(|n| station.code_for(n)))
}

/// Register a package.
///
/// # Errors
///
/// - [`crate::code::CodeError::UnknownStation`] if the station is not configured.
/// - [`crate::code::CodeError::OutOfRange`] if an explicit number is outside the range.
/// - [`Error::RangeFull`] if no number is left.
/// - [`Error::DuplicateCode`] if the number is taken, including by a
///   concurrent writer between the read and the append.
pub fn register<S>(store: &S, stations: &StationTable, request: RegisterRequest) -> Result<Package>
where
    S: PackageStore + ?Sized,
{
    let station = stations.require(&request.station)?;
    let issued = issued_at(store, station)?;

    let number = match request.number {
        Some(number) => {
            check_number(station, number)?;
            if issued.contains(&number) {
                return Err(Error::DuplicateCode {
                    code: station.code_for(number).to_string(),
                });
            }
            number
        }
        None => next_free_number(station, &issued).ok_or_else(|| Error::RangeFull {
            station: station.name.clone(),
        })?,
    };
    debug!(
        "Allocating {} ({} of {} issued)",
        station.code_for(number),
        issued.len(),
        station.capacity()
    );

    let package = NewPackage::new(station.code_for(number), request.quantities, request.details);
    let stored = store.append(&package)?;
    info!("Registered package {}", stored.tracking_code);
    Ok(stored)
}
