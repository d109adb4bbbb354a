use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".steward_core";
const COLLECTIONS_DIR: &str = "collections";

/// Returns the application-specific data directory, defaulting to
/// `~/.steward_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("STEWARD_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the JSON collection files.
pub fn collections_dir() -> PathBuf {
    app_data_dir().join(COLLECTIONS_DIR)
}
