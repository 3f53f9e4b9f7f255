// Floatshell state managers
// Managers own mutable shell state: tabs, surfaces, lifecycle, sessions, shortcuts.

pub mod lifecycle_manager;
pub mod session_manager;
pub mod shortcut_manager;
pub mod surface_registry;
pub mod tab_directory;
pub mod update_coalescer;
