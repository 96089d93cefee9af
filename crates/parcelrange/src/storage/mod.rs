//! Storage layer for parcelrange.
//!
//! Packages live in a single `SQLite` table. Callers reach it through the
//! [`PackageStore`] trait, which only exposes an ordered read of every
//! package and an append. The table carries unique indexes on the tracking
//! code and on `(station, number)`, so two writers that computed the same
//! "next free number" cannot both succeed.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::package::{NewPackage, Package, PackageDetails, Quantities};

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const PACKAGE_COLUMNS: &str = "id, tracking_code, station, boxes, basins, small_sacks, \
     sender_name, receiver_name, receiver_phone, destination, created_at";

/// Read and append access to the package list.
pub trait PackageStore {
    /// Every stored package, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn packages(&self) -> Result<Vec<Package>>;

    /// Append a package, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateCode`] if the tracking code, or another
    /// spelling of the same station and number, is already held by another
    /// package, or a storage error.
    fn append(&self, package: &NewPackage) -> Result<Package>;
}

/// `SQLite`-backed package store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a package by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Package>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = ?1"),
                [id],
                Self::row_to_package,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a package by its exact tracking code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_by_code(&self, code: &str) -> Result<Option<Package>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE tracking_code = ?1"),
                [code],
                Self::row_to_package,
            )
            .optional()?;
        Ok(result)
    }

    /// Get the most recently registered packages, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<Package>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages ORDER BY id DESC LIMIT ?1"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let packages = stmt
            .query_map([limit_i64], Self::row_to_package)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(packages)
    }

    /// Get packages registered at a station, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn by_station(&self, station: &str, limit: usize) -> Result<Vec<Package>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE station = ?1 ORDER BY id DESC LIMIT ?2"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let packages = stmt
            .query_map(params![station, limit_i64], Self::row_to_package)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(packages)
    }

    /// Every stored tracking code, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn tracking_codes(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tracking_code FROM packages ORDER BY id ASC")?;
        let codes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(codes)
    }

    /// Count total packages in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_packages = self.count()?;

        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT station FROM packages ORDER BY station")?;
        let stations_in_use = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        let (oldest, newest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM packages",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_packages,
            stations_in_use,
            oldest_package: oldest.as_deref().and_then(parse_timestamp),
            newest_package: newest.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Convert a database row to a Package struct.
    fn row_to_package(row: &rusqlite::Row) -> rusqlite::Result<Package> {
        let id: i64 = row.get(0)?;
        let created_at_str: String = row.get(10)?;

        let created_at = parse_timestamp(&created_at_str).unwrap_or_else(|| {
            warn!(
                "Package {} has unreadable timestamp '{}', using epoch",
                id, created_at_str
            );
            DateTime::<Utc>::UNIX_EPOCH
        });

        Ok(Package {
            id,
            tracking_code: row.get(1)?,
            station: row.get(2)?,
            quantities: Quantities {
                boxes: row.get(3)?,
                basins: row.get(4)?,
                small_sacks: row.get(5)?,
            },
            details: PackageDetails {
                sender_name: row.get(6)?,
                receiver_name: row.get(7)?,
                receiver_phone: row.get(8)?,
                destination: row.get(9)?,
            },
            created_at,
        })
    }
}

impl PackageStore for Storage {
    fn packages(&self) -> Result<Vec<Package>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages ORDER BY id ASC"
        ))?;
        let packages = stmt
            .query_map([], Self::row_to_package)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("Read {} packages", packages.len());
        Ok(packages)
    }

    fn append(&self, package: &NewPackage) -> Result<Package> {
        let tracking_code = package.code.to_string();
        let created_at = Utc::now();

        let inserted = self.conn.execute(
            r"
            INSERT INTO packages (
                tracking_code, station, number, boxes, basins, small_sacks,
                sender_name, receiver_name, receiver_phone, destination, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                tracking_code,
                package.code.station,
                package.code.number,
                package.quantities.boxes,
                package.quantities.basins,
                package.quantities.small_sacks,
                package.details.sender_name,
                package.details.receiver_name,
                package.details.receiver_phone,
                package.details.destination,
                created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::DuplicateCode {
                    code: tracking_code,
                });
            }
            Err(err) => return Err(err.into()),
        }

        let id = self.conn.last_insert_rowid();
        debug!("Inserted package {} with id {}", tracking_code, id);

        Ok(Package {
            id,
            tracking_code,
            station: package.code.station.clone(),
            quantities: package.quantities,
            details: package.details.clone(),
            created_at,
        })
    }
}

/// Whether `err` comes from a unique index rejecting a row.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Total number of packages stored.
    pub total_packages: i64,
    /// Names of stations that have at least one package.
    pub stations_in_use: Vec<String>,
    /// Registration time of the oldest package.
    pub oldest_package: Option<DateTime<Utc>>,
    /// Registration time of the newest package.
    pub newest_package: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::TrackingCode;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn new_package(station: &str, number: u32) -> NewPackage {
        NewPackage::new(
            TrackingCode::new(station, number),
            Quantities::new(1, 0, 2),
            PackageDetails {
                receiver_name: Some("Muthoni".to_string()),
                ..PackageDetails::default()
            },
        )
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
        assert_eq!(storage.unwrap().path(), Path::new(":memory:"));
    }

    #[test]
    fn test_append_and_get() {
        let storage = create_test_storage();
        let stored = storage.append(&new_package("Embu", 1)).unwrap();

        assert_eq!(stored.tracking_code, "Embu-1");
        assert_eq!(stored.station, "Embu");

        let retrieved = storage.get(stored.id).unwrap().unwrap();
        assert_eq!(retrieved.tracking_code, "Embu-1");
        assert_eq!(retrieved.quantities, Quantities::new(1, 0, 2));
        assert_eq!(retrieved.details.receiver_name.as_deref(), Some("Muthoni"));
        assert!(retrieved.details.sender_name.is_none());
    }

    #[test]
    fn test_append_duplicate_code_rejected() {
        let storage = create_test_storage();
        storage.append(&new_package("Embu", 4)).unwrap();

        let err = storage.append(&new_package("Embu", 4)).unwrap_err();
        assert!(err.is_duplicate_code());
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_packages_ordered_oldest_first() {
        let storage = create_test_storage();
        for n in [3, 1, 2] {
            storage.append(&new_package("Embu", n)).unwrap();
        }

        let codes: Vec<String> = storage
            .packages()
            .unwrap()
            .into_iter()
            .map(|p| p.tracking_code)
            .collect();
        assert_eq!(codes, vec!["Embu-3", "Embu-1", "Embu-2"]);
        assert_eq!(storage.tracking_codes().unwrap(), codes);
    }

    #[test]
    fn test_append_rejects_other_spelling_of_number() {
        let storage = create_test_storage();
        storage
            .conn
            .execute(
                "INSERT INTO packages (tracking_code, station, number, created_at) VALUES ('Embu-07', 'Embu', 7, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let err = storage.append(&new_package("Embu", 7)).unwrap_err();
        assert!(matches!(err, Error::DuplicateCode { ref code } if code == "Embu-7"));
        assert!(storage.append(&new_package("Embu", 8)).is_ok());
    }

    #[test]
    fn test_only_unique_violations_count_as_duplicates() {
        let storage = create_test_storage();
        storage.append(&new_package("Embu", 1)).unwrap();

        let unique = storage
            .conn
            .execute(
                "INSERT INTO packages (tracking_code, station, created_at) VALUES ('Embu-1', 'Embu', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap_err();
        assert!(is_unique_violation(&unique));

        let not_null = storage
            .conn
            .execute(
                "INSERT INTO packages (tracking_code, station) VALUES ('Embu-2', 'Embu')",
                [],
            )
            .unwrap_err();
        assert!(!is_unique_violation(&not_null));
        assert!(matches!(
            Error::from(not_null),
            Error::DatabaseQuery(_)
        ));
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = create_test_storage();
        assert!(storage.get(99999).unwrap().is_none());
        assert!(storage.get_by_code("Embu-1").unwrap().is_none());
    }

    #[test]
    fn test_get_by_code() {
        let storage = create_test_storage();
        storage.append(&new_package("Ugweri", 301)).unwrap();
        let found = storage.get_by_code("Ugweri-301").unwrap().unwrap();
        assert_eq!(found.station, "Ugweri");
    }

    #[test]
    fn test_recent_and_by_station() {
        let storage = create_test_storage();
        storage.append(&new_package("Embu", 1)).unwrap();
        storage.append(&new_package("Ugweri", 301)).unwrap();
        storage.append(&new_package("Embu", 2)).unwrap();

        let recent = storage.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tracking_code, "Embu-2");

        let embu = storage.by_station("Embu", 10).unwrap();
        assert_eq!(embu.len(), 2);
        assert!(embu.iter().all(|p| p.station == "Embu"));
    }

    #[test]
    fn test_malformed_stored_code_still_loads() {
        let storage = create_test_storage();
        storage
            .conn
            .execute(
                "INSERT INTO packages (tracking_code, station, created_at) VALUES ('Embu#9', 'Embu', 'not a date')",
                [],
            )
            .unwrap();

        let packages = storage.packages().unwrap();
        assert_eq!(packages.len(), 1);
        assert!(packages[0].code().is_err());
        assert_eq!(packages[0].created_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_stats_empty() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.total_packages, 0);
        assert!(stats.stations_in_use.is_empty());
        assert!(stats.oldest_package.is_none());
        assert!(stats.newest_package.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        storage.append(&new_package("Ugweri", 301)).unwrap();
        storage.append(&new_package("Embu", 1)).unwrap();
        storage.append(&new_package("Embu", 2)).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_packages, 3);
        assert_eq!(stats.stations_in_use, vec!["Embu", "Ugweri"]);
        assert!(stats.oldest_package.is_some());
        assert!(stats.oldest_package <= stats.newest_package);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("packages.db");

        let storage = Storage::open(&path).unwrap();
        storage.append(&new_package("Embu", 1)).unwrap();

        assert!(path.exists());
        assert_eq!(storage.stats().unwrap().total_packages, 1);
    }

    #[test]
    fn test_reopen_keeps_packages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.db");

        {
            let storage = Storage::open(&path).unwrap();
            storage.append(&new_package("Kiritiri", 901)).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.count().unwrap(), 1);
        assert_eq!(storage.tracking_codes().unwrap(), vec!["Kiritiri-901"]);
    }
}
