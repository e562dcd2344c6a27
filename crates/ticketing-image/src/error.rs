use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageError>;

/// Build-time failures. Every variant aborts the build; nothing is retried.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image reference '{0}'")]
    InvalidReference(String),

    #[error("base runtime '{0}' is not pinned to a version tag")]
    UnpinnedBase(String),

    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("dependency manifest '{}' not found", .0.display())]
    ManifestMissing(PathBuf),

    #[error("dependency manifest '{}' is invalid: {reason}", .path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("dependency conflict in '{}': '{name}' requested as '{first}' and '{second}'", .path.display())]
    DependencyConflict {
        path: PathBuf,
        name: String,
        first: String,
        second: String,
    },

    #[error("build context '{}' is unreadable: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("no container engine found on PATH (tried: {0})")]
    EngineUnavailable(String),

    #[error("container build failed: {status}")]
    BuildFailed { status: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
