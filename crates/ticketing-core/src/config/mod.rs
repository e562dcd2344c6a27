//! Unified configuration layer.
//!
//! All environment reads go through this module; the rest of the workspace
//! works with the structured configs instead of calling `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `ServiceConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants, including legacy aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{ObservabilityConfig, ServiceConfig};
