//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve database path and logging settings for binaries.
//!
//! # Invariants
//! - A `.env` file, when present, is loaded before variables are read.
//! - A missing `.env` is fine; an unreadable or malformed one is an error.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::default_log_level;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "NOTEDESK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "NOTEDESK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "NOTEDESK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "notedesk.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must not be empty when set")]
    Empty { var: &'static str },
    #[error("{var} must be an absolute path, got `{value}`")]
    RelativeLogDir { var: &'static str, value: String },
    #[error("failed to load .env file: {0}")]
    EnvFile(String),
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Loads `.env` (if any) and reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        accept_env_file(dotenvy::dotenv())?;
        let vars: HashMap<String, String> = [DB_PATH_VAR, LOG_LEVEL_VAR, LOG_DIR_VAR]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self::from_vars(&vars)
    }

    /// Builds configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let db_path = match non_empty(vars, DB_PATH_VAR)? {
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_DB_FILE_NAME),
        };
        let log_level = non_empty(vars, LOG_LEVEL_VAR)?
            .map(str::to_string)
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = match non_empty(vars, LOG_DIR_VAR)? {
            Some(value) => {
                let path = PathBuf::from(value);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir {
                        var: LOG_DIR_VAR,
                        value: value.to_string(),
                    });
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

fn accept_env_file<T>(result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::EnvFile(err.to_string())),
    }
}

fn non_empty<'a>(
    vars: &'a HashMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, ConfigError> {
    match vars.get(var).map(|value| value.trim()) {
        Some("") => Err(ConfigError::Empty { var }),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        accept_env_file, ConfigError, CoreConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR,
    };
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = CoreConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("notedesk.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn explicit_values_are_used() {
        let log_dir = std::env::temp_dir().join("notedesk-logs");
        let config = CoreConfig::from_vars(&vars(&[
            (DB_PATH_VAR, "/tmp/notes.db"),
            (LOG_LEVEL_VAR, "warn"),
            (LOG_DIR_VAR, log_dir.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/notes.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
    }

    #[test]
    fn blank_and_relative_values_are_rejected() {
        let err = CoreConfig::from_vars(&vars(&[(DB_PATH_VAR, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: DB_PATH_VAR });

        let err = CoreConfig::from_vars(&vars(&[(LOG_DIR_VAR, "logs")])).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir { .. }));
    }

    #[test]
    fn missing_env_file_is_ignored_but_malformed_one_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        assert_eq!(accept_env_file(dotenvy::from_path(&path)), Ok(()));

        std::fs::write(&path, "this is not a valid line\n").unwrap();
        let err = accept_env_file(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }
}
