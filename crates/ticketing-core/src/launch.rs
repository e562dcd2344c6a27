//! Launch contract between the container image and the service process.
//!
//! The image sets an entry-module indicator and a run-mode indicator, declares
//! port 5000 and starts the server bound to every interface. This module is the
//! process side of that contract.

use crate::config::env_keys::launch as keys;
use crate::config::loader::{env_optional, load_dotenv};
use crate::{Error, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Application name the entry-module indicator must carry.
pub const ENTRY_MODULE: &str = "ticketing";
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 5000;

/// Operating mode of the launched server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Debug-level logging. Error bodies are the same in both modes.
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Default tracing filter for this mode.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "ticketing=debug,tower_http=debug",
            Self::Production => "ticketing=info,tower_http=info",
        }
    }
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "unknown run mode '{}': expected 'development' or 'production'",
                other
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContract {
    pub entry_module: String,
    pub run_mode: RunMode,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for LaunchContract {
    fn default() -> Self {
        Self {
            entry_module: ENTRY_MODULE.to_string(),
            run_mode: RunMode::default(),
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }
}

impl LaunchContract {
    /// Read the contract from the environment (and `.env`).
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::resolve(
            env_optional(keys::TICKETING_APP, &[]),
            env_optional(keys::TICKETING_ENV, keys::ENV_ALIASES),
            env_optional(keys::TICKETING_HOST, keys::HOST_ALIASES),
            env_optional(keys::TICKETING_PORT, keys::PORT_ALIASES),
        )
    }

    /// Build a contract from raw values; `None` selects the default.
    pub fn resolve(
        entry_module: Option<String>,
        run_mode: Option<String>,
        host: Option<String>,
        port: Option<String>,
    ) -> Result<Self> {
        let entry_module = entry_module.unwrap_or_else(|| ENTRY_MODULE.to_string());
        if entry_module != ENTRY_MODULE {
            return Err(Error::Config(format!(
                "entry module '{}' is not served by this binary (expected '{}')",
                entry_module, ENTRY_MODULE
            )));
        }
        let run_mode = run_mode
            .map(|s| s.parse::<RunMode>())
            .transpose()?
            .unwrap_or_default();
        let host = host
            .map(|h| {
                h.parse::<IpAddr>()
                    .map_err(|_| Error::Config(format!("invalid host address '{}'", h)))
            })
            .transpose()?
            .unwrap_or(DEFAULT_HOST);
        let port = port
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| Error::Config(format!("invalid port '{}'", p)))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        Ok(Self {
            entry_module,
            run_mode,
            host,
            port,
        })
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(mut self, host: Option<IpAddr>, port: Option<u16>) -> Self {
        if let Some(h) = host {
            self.host = h;
        }
        if let Some(p) = port {
            self.port = p;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
