//! Database migration system for parcelrange.
//!
//! Schema versions are tracked in the `metadata` table and applied in order.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{CREATE_UNIQUE_CODE_INDEX, CREATE_UNIQUE_NUMBER_INDEX, SCHEMA_STATEMENTS};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 3;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist, then runs any
/// pending migrations to bring the schema up to the current version.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run migrations from the given version to the current version.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < CURRENT_VERSION {
        current += 1;
        run_migration(conn, current)?;
        set_schema_version(conn, current)?;
    }

    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => Ok(()),
        2 => migrate_v2(conn),
        3 => migrate_v3(conn),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Migration to version 2: one package per tracking code.
///
/// Refuses to proceed while duplicate codes are present; those have to be
/// resolved by hand first.
fn migrate_v2(conn: &Connection) -> Result<()> {
    let duplicates: Vec<String> = conn
        .prepare(
            r"
            SELECT tracking_code FROM packages
            GROUP BY tracking_code HAVING COUNT(*) > 1
            ORDER BY tracking_code LIMIT 10
            ",
        )?
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<_, _>>()?;

    if !duplicates.is_empty() {
        return Err(Error::DatabaseMigration {
            message: format!(
                "cannot enforce unique tracking codes, duplicates present: {}",
                duplicates.join(", ")
            ),
        });
    }

    conn.execute(CREATE_UNIQUE_CODE_INDEX, [])?;
    info!("Enforcing unique tracking codes");
    Ok(())
}

/// Migration to version 3: one package per station and number.
///
/// Like version 2, stops on existing conflicts and lists them.
fn migrate_v3(conn: &Connection) -> Result<()> {
    let conflicts: Vec<String> = conn
        .prepare(
            r"
            SELECT station || '-' || number FROM packages
            WHERE number IS NOT NULL
            GROUP BY station, number HAVING COUNT(*) > 1
            ORDER BY station, number LIMIT 10
            ",
        )?
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<_, _>>()?;

    if !conflicts.is_empty() {
        return Err(Error::DatabaseMigration {
            message: format!(
                "cannot enforce unique station numbers, repeated numbers present: {}",
                conflicts.join(", ")
            ),
        });
    }

    conn.execute(CREATE_UNIQUE_NUMBER_INDEX, [])?;
    info!("Enforcing unique station numbers");
    Ok(())
}
