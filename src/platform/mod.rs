// Floatshell platform paths
// Where settings.json and the session database live on each OS.

use std::env;
use std::path::PathBuf;

const APP_DIR_UNIX: &str = "floatshell";
const APP_DIR_TITLED: &str = "Floatshell";

fn home_dir() -> PathBuf {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    env::var_os(var).map(PathBuf::from).unwrap_or_else(env::temp_dir)
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/floatshell` or `~/.config/floatshell`
/// - **macOS**: `~/Library/Application Support/Floatshell`
/// - **Windows**: `%APPDATA%\Floatshell`
pub fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        return home_dir().join("Library").join("Application Support").join(APP_DIR_TITLED);
    }
    if cfg!(target_os = "windows") {
        return env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR_TITLED);
    }
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(APP_DIR_UNIX)
}

/// Directory holding the session database.
///
/// Same as the config directory except on Linux, where it is
/// `$XDG_DATA_HOME/floatshell` or `~/.local/share/floatshell`.
pub fn get_data_dir() -> PathBuf {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return get_config_dir();
    }
    env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
        .join(APP_DIR_UNIX)
}

/// Path of the session database file.
pub fn get_session_db_path() -> PathBuf {
    get_data_dir().join("session.db")
}
