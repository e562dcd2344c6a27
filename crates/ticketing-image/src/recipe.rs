//! Typed build recipe: a linear list of steps with ordering rules checked up
//! front.
//!
//! Order: base runtime → working directory → dependency install → source copy
//! → (build commands, port, environment) → entrypoint.

use std::collections::HashSet;
use std::fmt;

use ticketing_core::config::env_keys::launch as launch_keys;
use ticketing_core::launch::{RunMode, DEFAULT_PORT, ENTRY_MODULE};

use crate::error::{ImageError, Result};

/// `name:tag` reference to a base image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub name: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Parse `registry/name:tag`. A missing tag parses to an empty tag and is
    /// rejected later as unpinned.
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(ImageError::InvalidReference(reference.to_string()));
        }
        let last_slash = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match reference[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&reference[..split], &reference[split + 1..])
            }
            None => (reference, ""),
        };
        if name.is_empty() {
            return Err(ImageError::InvalidReference(reference.to_string()));
        }
        Ok(Self::new(name, tag))
    }

    pub fn is_pinned(&self) -> bool {
        !self.tag.is_empty() && self.tag != "latest"
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.name, self.tag)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Base(ImageRef),
    Workdir(String),
    /// Copy the manifests (paths relative to the build context) and run the
    /// install command.
    InstallDependencies {
        manifests: Vec<String>,
        command: String,
    },
    CopySource {
        src: String,
        dest: String,
    },
    Run(String),
    /// Declarative only; nothing is bound at build time.
    Expose(u16),
    Env {
        name: String,
        value: String,
    },
    Entrypoint(Vec<String>),
}

/// A recipe that passed every ordering and shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    steps: Vec<Step>,
}

impl Recipe {
    pub fn builder() -> RecipeBuilder {
        RecipeBuilder::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn base(&self) -> &ImageRef {
        match self.steps.first() {
            Some(Step::Base(r)) => r,
            _ => unreachable!("validated recipe starts with a base step"),
        }
    }

    pub fn workdir(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| match s {
            Step::Workdir(w) => Some(w.as_str()),
            _ => None,
        })
    }

    pub fn manifests(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| match s {
                Step::InstallDependencies { manifests, .. } => {
                    manifests.iter().map(String::as_str).collect::<Vec<_>>()
                }
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn exposed_ports(&self) -> Vec<u16> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Expose(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn env(&self) -> Vec<(&str, &str)> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Env { name, value } => Some((name.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn entrypoint(&self) -> &[String] {
        match self.steps.last() {
            Some(Step::Entrypoint(tokens)) => tokens,
            _ => unreachable!("validated recipe ends with an entrypoint"),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecipeBuilder {
    steps: Vec<Step>,
}

impl RecipeBuilder {
    pub fn base(mut self, image: ImageRef) -> Self {
        self.steps.push(Step::Base(image));
        self
    }

    pub fn workdir(mut self, path: impl Into<String>) -> Self {
        self.steps.push(Step::Workdir(path.into()));
        self
    }

    pub fn install_dependencies<I, S>(mut self, manifests: I, command: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.push(Step::InstallDependencies {
            manifests: manifests.into_iter().map(Into::into).collect(),
            command: command.into(),
        });
        self
    }

    pub fn copy_source(mut self, src: impl Into<String>, dest: impl Into<String>) -> Self {
        self.steps.push(Step::CopySource {
            src: src.into(),
            dest: dest.into(),
        });
        self
    }

    pub fn run(mut self, command: impl Into<String>) -> Self {
        self.steps.push(Step::Run(command.into()));
        self
    }

    pub fn expose(mut self, port: u16) -> Self {
        self.steps.push(Step::Expose(port));
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.steps.push(Step::Env {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn entrypoint<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps
            .push(Step::Entrypoint(tokens.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<Recipe> {
        validate(&self.steps)?;
        Ok(Recipe { steps: self.steps })
    }
}

fn invalid(msg: impl Into<String>) -> ImageError {
    ImageError::InvalidRecipe(msg.into())
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Context-relative path that stays inside the context and renders without quoting.
fn is_context_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.chars().any(char::is_whitespace)
        && !path.split('/').any(|seg| seg == "..")
}

fn validate(steps: &[Step]) -> Result<()> {
    match steps.first() {
        Some(Step::Base(image)) => {
            if !image.is_pinned() {
                return Err(ImageError::UnpinnedBase(image.to_string()));
            }
        }
        _ => return Err(invalid("the first step must select the base runtime")),
    }
    match steps.last() {
        Some(Step::Entrypoint(tokens)) if tokens.is_empty() => {
            return Err(invalid("the entrypoint command is empty"));
        }
        Some(Step::Entrypoint(_)) => {}
        _ => return Err(invalid("the last step must define the entrypoint command")),
    }

    let mut workdir_at = None;
    let mut install_at = None;
    let mut copy_at = None;
    let mut env_names = HashSet::new();

    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Base(_) if i > 0 => return Err(invalid("only one base runtime may be selected")),
            Step::Base(_) => {}
            Step::Workdir(path) => {
                if workdir_at.is_some() {
                    return Err(invalid("the working directory is declared twice"));
                }
                if !path.starts_with('/') {
                    return Err(invalid(format!("working directory '{}' must be absolute", path)));
                }
                if install_at.is_some() || copy_at.is_some() {
                    return Err(invalid("the working directory must precede file operations"));
                }
                workdir_at = Some(i);
            }
            Step::InstallDependencies { manifests, command } => {
                if manifests.is_empty() {
                    return Err(invalid("dependency installation needs a manifest"));
                }
                if let Some(bad) = manifests.iter().find(|m| !is_context_path(m)) {
                    return Err(invalid(format!("manifest path '{}' must be context-relative", bad)));
                }
                if command.trim().is_empty() {
                    return Err(invalid("dependency installation needs a command"));
                }
                if copy_at.is_some() {
                    return Err(invalid("dependencies must be installed before the source copy"));
                }
                install_at.get_or_insert(i);
            }
            Step::CopySource { src, dest } => {
                if !is_context_path(src) || dest.is_empty() || dest.chars().any(char::is_whitespace) {
                    return Err(invalid(format!("cannot copy '{}' to '{}'", src, dest)));
                }
                copy_at.get_or_insert(i);
            }
            Step::Run(command) if command.trim().is_empty() => {
                return Err(invalid("empty build command"));
            }
            Step::Run(_) => {}
            Step::Expose(0) => return Err(invalid("port 0 cannot be exposed")),
            Step::Expose(_) => {}
            Step::Env { name, .. } => {
                if !is_env_name(name) {
                    return Err(invalid(format!("'{}' is not a valid variable name", name)));
                }
                if !env_names.insert(name.as_str()) {
                    return Err(invalid(format!("variable '{}' is set twice", name)));
                }
            }
            Step::Entrypoint(_) if i + 1 != steps.len() => {
                return Err(invalid("only one entrypoint may be defined"));
            }
            Step::Entrypoint(_) => {}
        }
    }

    if copy_at.is_some() && install_at.is_none() {
        return Err(invalid("the source copy has no preceding dependency installation"));
    }
    Ok(())
}

/// Base runtime the service image is built on.
pub const BASE_IMAGE: &str = "rust";
pub const BASE_TAG: &str = "1.88-slim-bookworm";
pub const WORKDIR: &str = "/app";

/// Every manifest `cargo fetch` needs to resolve the workspace.
pub const WORKSPACE_MANIFESTS: &[&str] = &[
    "Cargo.toml",
    "ticketing/Cargo.toml",
    "crates/ticketing-core/Cargo.toml",
    "crates/ticketing-store/Cargo.toml",
    "crates/ticketing-server/Cargo.toml",
    "crates/ticketing-image/Cargo.toml",
];

/// Recipe for the ticketing service image: development mode, port 5000,
/// server bound to every interface.
pub fn service_recipe() -> Result<Recipe> {
    Recipe::builder()
        .base(ImageRef::new(BASE_IMAGE, BASE_TAG))
        .workdir(WORKDIR)
        .install_dependencies(WORKSPACE_MANIFESTS.iter().copied(), "cargo fetch")
        .copy_source(".", ".")
        .run("cargo build --release --bin ticketing")
        .expose(DEFAULT_PORT)
        .env(launch_keys::TICKETING_APP, ENTRY_MODULE)
        .env(launch_keys::TICKETING_ENV, RunMode::Development.as_str())
        .entrypoint(["./target/release/ticketing", "serve", "--host", "0.0.0.0"])
        .build()
}
