//! Structured configs grouped by concern, loaded from the environment.

use super::env_keys::{observability as obv_keys, service};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Relative location of the SQLite database when nothing is configured.
pub const DEFAULT_DATABASE_PATH: &str = "data/events.db";

/// Storage settings for the ticketing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let database_path = env_or(
            service::TICKETING_DATABASE_PATH,
            service::DATABASE_PATH_ALIASES,
            || DEFAULT_DATABASE_PATH.to_string(),
        );
        Self {
            database_path: PathBuf::from(database_path),
        }
    }

    /// Apply a CLI override, if any.
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.database_path = p;
        }
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    /// Explicit filter directive; `None` means "derive from the run mode".
    pub log_level: Option<String>,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::TICKETING_QUIET, &[], false),
                log_level: env_optional(obv_keys::TICKETING_LOG_LEVEL, &[]),
                log_json: env_bool(obv_keys::TICKETING_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::TICKETING_AUDIT_LOG, &[]),
            }
        })
    }
}
