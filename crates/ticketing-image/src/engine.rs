//! Container engine driver.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ImageError, Result};
use crate::preflight::{preflight, BuildPlan};
use crate::recipe::{ImageRef, Recipe};
use crate::render::render;

/// Engines tried in order when none is named.
const ENGINE_CANDIDATES: &[&str] = &["docker", "podman"];

pub trait ContainerEngine {
    fn name(&self) -> &str;

    /// Build `dockerfile` against `context` and tag the result. Any non-zero
    /// exit is a failed build; no image is produced.
    fn build(&self, dockerfile: &str, context: &Path, tag: &str) -> Result<()>;
}

/// A docker-compatible CLI found on `PATH`.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
}

impl DockerCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn locate() -> Result<Self> {
        ENGINE_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::new)
            .ok_or_else(|| ImageError::EngineUnavailable(ENGINE_CANDIDATES.join(", ")))
    }
}

impl ContainerEngine for DockerCli {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("docker")
    }

    fn build(&self, dockerfile: &str, context: &Path, tag: &str) -> Result<()> {
        tracing::info!(engine = %self.program.display(), tag, "starting container build");
        let mut child = Command::new(&self.program)
            .args(["build", "-t", tag, "-f", "-"])
            .arg(context)
            .stdin(Stdio::piped())
            .spawn()?;
        // Dropping stdin closes the pipe so the engine sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dockerfile.as_bytes()),
            None => Ok(()),
        };
        if let Err(e) = written {
            // The engine went away mid-write; reap it before reporting.
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }
        let status = child.wait()?;
        if !status.success() {
            return Err(ImageError::BuildFailed {
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Check the tag, preflight the context, render the recipe and hand both to
/// the engine.
pub fn build_image(
    recipe: &Recipe,
    context: &Path,
    tag: &str,
    engine: &dyn ContainerEngine,
) -> Result<BuildPlan> {
    ImageRef::parse(tag)?;
    let plan = preflight(recipe, context)?;
    let dockerfile = render(recipe);
    engine.build(&dockerfile, context, tag)?;
    tracing::info!(engine = engine.name(), tag, "image built");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::recipe::ImageRef;

    #[derive(Default)]
    struct RecordingEngine {
        builds: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl ContainerEngine for RecordingEngine {
        fn name(&self) -> &str {
            "recording"
        }

        fn build(&self, dockerfile: &str, _context: &Path, tag: &str) -> Result<()> {
            self.builds
                .borrow_mut()
                .push((dockerfile.to_string(), tag.to_string()));
            if self.fail {
                return Err(ImageError::BuildFailed {
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }
    }

    fn recipe() -> Recipe {
        Recipe::builder()
            .base(ImageRef::new("python", "3.12-slim"))
            .workdir("/app")
            .install_dependencies(["requirements.txt"], "pip install -r requirements.txt")
            .copy_source(".", ".")
            .expose(5000)
            .entrypoint(["flask", "run", "--host=0.0.0.0"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_passes_rendered_dockerfile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        let engine = RecordingEngine::default();

        let plan = build_image(&recipe(), dir.path(), "events:dev", &engine).unwrap();
        assert_eq!(plan.manifests.len(), 1);
        let builds = engine.builds.borrow();
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].0, render(&recipe()));
        assert_eq!(builds[0].1, "events:dev");
    }

    #[test]
    fn test_bad_manifest_never_reaches_engine() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RecordingEngine::default();
        let err = build_image(&recipe(), dir.path(), "events:dev", &engine).unwrap_err();
        assert!(matches!(err, ImageError::ManifestMissing(_)));

        std::fs::write(dir.path().join("requirements.txt"), "flask==1\nFlask==2\n").unwrap();
        let err = build_image(&recipe(), dir.path(), "events:dev", &engine).unwrap_err();
        assert!(matches!(err, ImageError::DependencyConflict { .. }));
        assert!(engine.builds.borrow().is_empty());
    }

    #[test]
    fn test_engine_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        let engine = RecordingEngine {
            fail: true,
            ..Default::default()
        };
        let err = build_image(&recipe(), dir.path(), "events:dev", &engine).unwrap_err();
        assert!(matches!(err, ImageError::BuildFailed { .. }));
    }

    #[test]
    fn test_invalid_tag_never_reaches_engine() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        let engine = RecordingEngine::default();
        let err = build_image(&recipe(), dir.path(), "bad tag", &engine).unwrap_err();
        assert!(matches!(err, ImageError::InvalidReference(_)));
        assert!(engine.builds.borrow().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_exiting_early_is_reaped() {
        let dir = tempfile::tempdir().unwrap();
        // `true` never reads stdin, so a Dockerfile larger than the pipe
        // buffer breaks the pipe.
        let dockerfile = "# padding\n".repeat(100_000);
        let err = DockerCli::new("true")
            .build(&dockerfile, dir.path(), "events:dev")
            .unwrap_err();
        assert!(matches!(err, ImageError::Io(_)), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_failure_status() {
        let dir = tempfile::tempdir().unwrap();
        let err = DockerCli::new("false")
            .build("FROM scratch\n", dir.path(), "events:dev")
            .unwrap_err();
        assert!(matches!(err, ImageError::BuildFailed { .. }), "{err}");
    }

    #[test]
    fn test_engine_name_from_program() {
        assert_eq!(DockerCli::new("/usr/bin/podman").name(), "podman");
    }
}
