// Floatshell schema migrations
// Versioned schema migrations for the session database.
// Applied versions are recorded in `schema_version`; each migration runs once.

use rusqlite::Connection;

/// Bump when adding a migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest applied version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs every pending migration. Safe on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);
    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Session snapshots")?;
    }
    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Per-domain zoom offsets")?;
    }
    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: one row per saved session snapshot, tab list stored as JSON.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
             id TEXT PRIMARY KEY,
             data TEXT NOT NULL,
             timestamp INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);",
    )
}

/// V2: zoom ledger checkpoint.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS zoom_offsets (
             domain TEXT PRIMARY KEY,
             factor REAL NOT NULL
         );",
    )
}
