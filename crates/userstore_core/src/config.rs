//! Store and logging configuration.
//!
//! Values come from the environment; blank variables fall back to defaults
//! under the system temp directory.

use crate::db::{DbError, DbResult};
use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "USERSTORE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "USERSTORE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "USERSTORE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "userstore.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "userstore-logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file shared by both users tables.
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl StoreConfig {
    /// Config for an explicit database file with default logging settings.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME),
        }
    }

    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = match read(DB_PATH_ENV) {
            Some(path) => Self::new(path),
            None => Self::new(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
        };

        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(dir) = read(LOG_DIR_ENV) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(DbError::InvalidConfig(format!(
                    "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
            config.log_dir = dir;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::db::DbError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_variables_are_missing_or_blank() {
        let config = StoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   ")])).unwrap();

        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("userstore.sqlite3")
        );
        assert!(config.log_dir.is_absolute());
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn variables_override_defaults() {
        let log_dir = std::env::temp_dir().join("userstore-test-logs");
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, "/var/lib/userstore/users.db"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, log_dir.to_str().unwrap()),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/userstore/users.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, log_dir);
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "logs")])).unwrap_err();
        assert!(matches!(err, DbError::InvalidConfig(_)));
    }
}
