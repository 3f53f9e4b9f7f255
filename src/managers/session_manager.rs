// Floatshell Session Manager
// `SessionStore` is the persistence collaborator: it saves and loads the tab list
// and the zoom ledger checkpoint. `SqliteSessionStore` keeps both in SQLite.
// `SessionManager` sits in front of a store and debounces saves so a burst of
// tab changes produces one write.

use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::SessionError;
use crate::types::session::SessionData;

/// How many snapshots are kept before the oldest are pruned.
pub const MAX_SAVED_SESSIONS: i64 = 5;

/// Storage for session snapshots and zoom checkpoints.
pub trait SessionStore {
    fn load_session_tabs(&self) -> Result<Option<SessionData>, SessionError>;
    fn save_session_tabs(&self, data: &SessionData) -> Result<(), SessionError>;
    fn load_zoom_offsets(&self) -> Result<Vec<(String, f64)>, SessionError>;
    fn save_zoom_offsets(&self, entries: &[(String, f64)]) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// SQLite-backed session store.
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        Ok(Self { db: Database::open(path)? })
    }

    pub fn open_in_memory() -> Result<Self, SessionError> {
        Ok(Self { db: Database::open_in_memory()? })
    }

    pub fn saved_session_count(&self) -> Result<i64, SessionError> {
        Ok(self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?)
    }
}

impl SessionStore for SqliteSessionStore {
    /// Newest snapshot, or `None` if nothing was ever saved.
    fn load_session_tabs(&self) -> Result<Option<SessionData>, SessionError> {
        let json: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT data FROM sessions ORDER BY timestamp DESC, rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Appends a snapshot and prunes everything past [`MAX_SAVED_SESSIONS`].
    fn save_session_tabs(&self, data: &SessionData) -> Result<(), SessionError> {
        let json = serde_json::to_string(data)?;
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO sessions (id, data, timestamp) VALUES (?1, ?2, ?3)",
            params![Uuid::new_v4().to_string(), json, data.timestamp],
        )?;
        conn.execute(
            "DELETE FROM sessions WHERE rowid NOT IN (
                 SELECT rowid FROM sessions ORDER BY timestamp DESC, rowid DESC LIMIT ?1
             )",
            params![MAX_SAVED_SESSIONS],
        )?;
        debug!("Saved session with {} tabs", data.tabs.len());
        Ok(())
    }

    fn load_zoom_offsets(&self) -> Result<Vec<(String, f64)>, SessionError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT domain, factor FROM zoom_offsets ORDER BY domain")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Replaces the whole checkpoint.
    fn save_zoom_offsets(&self, entries: &[(String, f64)]) -> Result<(), SessionError> {
        let conn = self.db.connection();
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM zoom_offsets", [])?;
        for (domain, offset) in entries {
            tx.execute(
                "INSERT INTO zoom_offsets (domain, factor) VALUES (?1, ?2)",
                params![domain, offset],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.db
            .connection()
            .execute_batch("DELETE FROM sessions; DELETE FROM zoom_offsets;")?;
        Ok(())
    }
}

/// Debounced front for a [`SessionStore`].
pub struct SessionManager<S: SessionStore> {
    store: S,
    debounce: Duration,
    save_at: Option<Instant>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            save_at: None,
        }
    }

    /// Schedules a save one debounce interval after the first unsaved change.
    pub fn mark_dirty(&mut self, now: Instant) {
        if self.save_at.is_none() {
            self.save_at = Some(now + self.debounce);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.save_at.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.save_at
    }

    /// Writes the snapshot if a save is due. Returns whether it wrote.
    ///
    /// The snapshot is only built when a write happens.
    pub fn save_if_due(
        &mut self,
        now: Instant,
        snapshot: impl FnOnce() -> SessionData,
    ) -> Result<bool, SessionError> {
        match self.save_at {
            Some(at) if now >= at => {
                self.save_now(&snapshot())?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Writes immediately and clears any pending save.
    pub fn save_now(&mut self, data: &SessionData) -> Result<(), SessionError> {
        self.save_at = None;
        self.store.save_session_tabs(data)
    }

    pub fn restore(&self) -> Result<Option<SessionData>, SessionError> {
        let session = self.store.load_session_tabs()?;
        if let Some(session) = &session {
            info!("Found saved session with {} tabs", session.tabs.len());
        }
        Ok(session)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
