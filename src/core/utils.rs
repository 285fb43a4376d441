use std::{env, fs, path::Path, path::PathBuf};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".shift_core";
const BOOKS_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const STATE_FILE: &str = "state.json";
const CONFIG_FILE: &str = "config.json";

/// Returns the application-specific data directory, defaulting to `~/.shift_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("SHIFT_CORE_HOME") {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Absolute path to the managed books directory.
pub fn books_dir_in(base: &Path) -> PathBuf {
    base.join(BOOKS_DIR)
}

/// Base directory for backup snapshots.
pub fn backups_root_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

/// Path to the shared state file (tracking the last opened book, etc.).
pub fn state_file_in(base: &Path) -> PathBuf {
    base.join(STATE_FILE)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
