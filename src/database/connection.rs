// Floatshell SQLite connection
// SQLite connection wrapper that migrates the schema on open.

use std::path::Path;

use log::debug;
use rusqlite::Connection;

use super::migrations;

/// Owns the session database connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            // A missing directory surfaces as SQLITE_CANTOPEN from the open below.
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        migrations::run_all(&conn)?;
        debug!("Opened session database at {}", path.display());
        Ok(Self { conn })
    }

    /// In-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
