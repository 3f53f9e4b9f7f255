// Floatshell shared type definitions
// Each submodule defines types used across the shell.

pub mod command;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod session;
pub mod settings;
pub mod tab;
