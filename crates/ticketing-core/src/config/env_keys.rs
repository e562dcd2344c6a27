//! Environment variable keys and aliases.
//!
//! Primary keys use `TICKETING_*`. The container image used to configure the
//! server through the web framework's own variables; those are still read as
//! aliases so older deployment manifests keep working.

/// Launch contract: what the container start command hands to the process.
pub mod launch {
    /// Entry-module indicator: names the application the process serves.
    pub const TICKETING_APP: &str = "TICKETING_APP";

    /// Run-mode indicator: `development` or `production`.
    pub const TICKETING_ENV: &str = "TICKETING_ENV";
    pub const ENV_ALIASES: &[&str] = &["FLASK_ENV"];

    pub const TICKETING_HOST: &str = "TICKETING_HOST";
    pub const HOST_ALIASES: &[&str] = &["FLASK_RUN_HOST"];

    pub const TICKETING_PORT: &str = "TICKETING_PORT";
    pub const PORT_ALIASES: &[&str] = &["FLASK_RUN_PORT", "PORT"];
}

/// Storage
pub mod service {
    pub const TICKETING_DATABASE_PATH: &str = "TICKETING_DATABASE_PATH";
    pub const DATABASE_PATH_ALIASES: &[&str] = &["DATABASE_PATH"];
}

/// Logging and audit
pub mod observability {
    pub const TICKETING_QUIET: &str = "TICKETING_QUIET";
    pub const TICKETING_LOG_LEVEL: &str = "TICKETING_LOG_LEVEL";
    pub const TICKETING_LOG_JSON: &str = "TICKETING_LOG_JSON";
    pub const TICKETING_AUDIT_LOG: &str = "TICKETING_AUDIT_LOG";
}
