//! Process configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings with stable defaults.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `log_dir` is always absolute, as `init_logging` requires.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "ROLLBOOK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ROLLBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ROLLBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "students.db";
const DEFAULT_LOG_DIR_NAME: &str = "rollbook-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl AppConfig {
    /// Reads `ROLLBOOK_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(dir) = read(LOG_DIR_ENV) {
            config.log_dir = absolutize(Path::new(&dir));
        }
        config
    }
}

/// Resolves a relative path against the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| std::env::temp_dir().join(path))
}
