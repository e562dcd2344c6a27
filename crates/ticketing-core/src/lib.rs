pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod launch;
pub mod observability;

pub use error::{Error, Result};
