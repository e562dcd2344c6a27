//! Container image for the ticketing service.
//!
//! The image is described by a validated [`Recipe`]; [`render`] turns it
//! into a Dockerfile and [`build_image`] runs the preflight checks before
//! handing the result to a [`ContainerEngine`].

pub mod dockerignore;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod preflight;
pub mod recipe;
pub mod render;

pub use dockerignore::DockerIgnore;
pub use engine::{build_image, ContainerEngine, DockerCli};
pub use error::{ImageError, Result};
pub use manifest::{Manifest, ManifestKind, Requirement};
pub use preflight::{preflight, BuildPlan};
pub use recipe::{service_recipe, ImageRef, Recipe, RecipeBuilder, Step};
pub use render::render;
