use std::env;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::logging::LogConfig;

pub const DEFAULT_DB_URL: &str = "sqlite::memory:";
pub const DEFAULT_CATALOG_PATH: &str = "data/questions.json";
pub const DEFAULT_STORAGE_KEY: &str = "quiz_trainer_v1";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings, read from `QUIZ_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub db_url: String,
    pub catalog_path: PathBuf,
    pub storage_key: String,
    pub log_level: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl QuizConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty storage key or an
    /// unparsable log filter.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take their default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty storage key or an
    /// unparsable log filter.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let db_url = get("QUIZ_DB_URL").map_or(defaults.db_url, normalize_sqlite_url);
        let catalog_path = get("QUIZ_CATALOG_PATH").map_or(defaults.catalog_path, PathBuf::from);
        let storage_key = match lookup("QUIZ_STORAGE_KEY") {
            None => defaults.storage_key,
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    key: "QUIZ_STORAGE_KEY",
                    value: raw,
                });
            }
            Some(raw) => raw.trim().to_string(),
        };
        let log_level = get("QUIZ_LOG_LEVEL").unwrap_or(defaults.log_level);
        if EnvFilter::try_new(&log_level).is_err() {
            return Err(ConfigError::Invalid {
                key: "QUIZ_LOG_LEVEL",
                value: log_level,
            });
        }

        Ok(Self {
            db_url,
            catalog_path,
            storage_key,
            log_level,
        })
    }

    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
        }
    }
}

/// Turn a bare path or `sqlite:` path into an absolute `sqlite://` URL.
///
/// `sqlite::memory:` and URLs already starting with `sqlite://` pass through.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == DEFAULT_DB_URL || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = QuizConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.storage_key, "quiz_trainer_v1");
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let config = QuizConfig::from_lookup(lookup(&[
            ("QUIZ_DB_URL", "sqlite:///var/lib/quiz.db"),
            ("QUIZ_CATALOG_PATH", " /srv/questions.json "),
            ("QUIZ_STORAGE_KEY", "anatomy"),
            ("QUIZ_LOG_LEVEL", "services=debug"),
        ]))
        .unwrap();
        assert_eq!(config.db_url, "sqlite:///var/lib/quiz.db");
        assert_eq!(config.catalog_path, PathBuf::from("/srv/questions.json"));
        assert_eq!(config.storage_key, "anatomy");
        assert_eq!(config.log_config().log_level, "services=debug");
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let err = QuizConfig::from_lookup(lookup(&[("QUIZ_STORAGE_KEY", "  ")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "QUIZ_STORAGE_KEY",
                ..
            }
        ));
    }

    #[test]
    fn bad_log_filter_is_rejected() {
        let err = QuizConfig::from_lookup(lookup(&[("QUIZ_LOG_LEVEL", "services=loud")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "QUIZ_LOG_LEVEL",
                ..
            }
        ));
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db".into()),
            "sqlite:///tmp/a.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/b.db".into()),
            "sqlite:///tmp/b.db"
        );
        assert!(normalize_sqlite_url("quiz.db".into()).starts_with("sqlite://"));
        assert!(normalize_sqlite_url("quiz.db".into()).ends_with("quiz.db"));
    }
}
