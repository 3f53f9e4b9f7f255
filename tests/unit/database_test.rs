//! Unit tests for the Floatshell database layer (connection + migrations).

use floatshell::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use floatshell::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["schema_version", "sessions", "zoom_offsets"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_session_timestamp_index_exists() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name='idx_sessions_timestamp'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let result = run_all(db.connection());
    assert!(result.is_ok(), "Running migrations twice should succeed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_file_database_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("profile").join("session.db");

    let db = Database::open(&db_path);

    assert!(db.is_ok(), "open with file path should succeed");
    assert!(db_path.exists(), "Database file should exist on disk");
}

#[test]
fn test_reopen_keeps_schema_version() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("session.db");
    drop(Database::open(&db_path).unwrap());

    let db = Database::open(&db_path).unwrap();

    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_zoom_offsets_domain_is_unique() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    conn.execute(
        "INSERT INTO zoom_offsets (domain, factor) VALUES ('example.com', 1.2)",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO zoom_offsets (domain, factor) VALUES ('example.com', 1.5)",
        [],
    );

    assert!(duplicate.is_err());
}
