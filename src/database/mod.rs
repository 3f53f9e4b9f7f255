// Floatshell database layer
// SQLite connection management and schema migrations for the session store.

pub mod connection;
pub mod migrations;

pub use connection::Database;
