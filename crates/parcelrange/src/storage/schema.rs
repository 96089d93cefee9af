//! `SQLite` schema definitions for parcelrange.

/// SQL statement to create the packages table.
///
/// `number` is null for rows whose tracking code does not parse.
pub const CREATE_PACKAGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tracking_code TEXT NOT NULL,
    station TEXT NOT NULL,
    number INTEGER,
    boxes INTEGER NOT NULL DEFAULT 0,
    basins INTEGER NOT NULL DEFAULT 0,
    small_sacks INTEGER NOT NULL DEFAULT 0,
    sender_name TEXT,
    receiver_name TEXT,
    receiver_phone TEXT,
    destination TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on station for per-station reads.
pub const CREATE_STATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_packages_station ON packages(station)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PACKAGES_TABLE,
    CREATE_STATION_INDEX,
    CREATE_METADATA_TABLE,
];

/// Unique index that makes a tracking code impossible to issue twice.
///
/// Added by migration 2 so that existing databases holding duplicates can
/// be detected instead of failing to open.
pub const CREATE_UNIQUE_CODE_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_packages_tracking_code ON packages(tracking_code)
";

/// Unique index on the parsed station and number.
///
/// Keeps spellings of one number such as `Embu-07` and `Embu-7` from
/// coexisting. Rows with a null `number` are not constrained.
pub const CREATE_UNIQUE_NUMBER_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_packages_station_number ON packages(station, number)
";
