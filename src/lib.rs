//! Floatshell: a floating, always-on-top multi-tab browser shell.
//!
//! The library holds the shell core (tab directory, surface registry, lifecycle
//! manager, zoom ledger, bounds calculator) behind host traits, so the binary,
//! the headless host and the tests all drive the same code.

pub mod app;
pub mod command_handler;
pub mod database;
pub mod host;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
