//! XDG Base Directory paths for flexsort.
//!
//! The CLI harness resolves its configuration and saved scorecards through
//! these helpers so every tool agrees on where files live.

use std::path::PathBuf;

const APP_DIR: &str = "flexsort";

/// Get the flexsort config directory.
///
/// Returns `$XDG_CONFIG_HOME/flexsort` if set, otherwise `~/.config/flexsort`.
///
/// # Examples
///
/// ```
/// use flexsort_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("flexsort"));
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config").join(APP_DIR)
    } else {
        PathBuf::from(".config").join(APP_DIR)
    }
}

/// Get the flexsort data directory.
///
/// Returns `$XDG_DATA_HOME/flexsort` if set, otherwise `~/.local/share/flexsort`.
/// Completed scorecards written by the CLI land in `results/` below it.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share").join(APP_DIR)
    } else {
        PathBuf::from(".local/share").join(APP_DIR)
    }
}

/// Path of the user-level engine configuration file.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory where saved scorecards are written.
pub fn results_dir() -> PathBuf {
    data_dir().join("results")
}
