//! `parcelrange` - tracking-number allocation for parcel pickup stations
//!
//! Each pickup station owns a reserved range of tracking numbers. A package's
//! tracking code is `<Station>-<Number>`. This library validates numbers
//! against station ranges, parses tracking codes, suggests the lowest free
//! number at a station, and records packages in a `SQLite` store that refuses
//! to issue the same code twice.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod cli;
pub mod code;
pub mod config;
pub mod error;
pub mod logging;
pub mod package;
pub mod register;
pub mod report;
pub mod station;
pub mod storage;

pub use allocator::{count_by_station, is_valid_code, next_free_number, StationCounts};
pub use code::{parse_tracking_code, CodeError, TrackingCode};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use package::{NewPackage, Package, PackageDetails, Quantities};
pub use register::{register, suggest, RegisterRequest};
pub use report::Report;
pub use station::{Station, StationTable};
pub use storage::{PackageStore, Storage, StorageStats};
