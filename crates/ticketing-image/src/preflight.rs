//! Checks run against the build context before the engine is invoked.
//!
//! A build either passes preflight completely or does not start: a missing
//! or corrupt manifest, or a source tree that cannot be read, aborts before
//! any layer is produced.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::dockerignore::DockerIgnore;
use crate::error::{ImageError, Result};
use crate::manifest::Manifest;
use crate::recipe::Recipe;

#[derive(Debug)]
pub struct BuildPlan {
    pub context: PathBuf,
    pub workdir: String,
    pub manifests: Vec<Manifest>,
    /// Context-relative paths of every source file copied into the image.
    pub source_files: Vec<PathBuf>,
}

impl BuildPlan {
    /// Where a context-relative file lands inside the image.
    pub fn image_path(&self, relative: &Path) -> String {
        let rel = relative.to_string_lossy().replace('\\', "/");
        format!("{}/{}", self.workdir.trim_end_matches('/'), rel)
    }

    pub fn image_paths(&self) -> Vec<String> {
        self.source_files.iter().map(|p| self.image_path(p)).collect()
    }
}

pub fn preflight(recipe: &Recipe, context: &Path) -> Result<BuildPlan> {
    let unreadable = |reason: String| ImageError::SourceUnreadable {
        path: context.to_path_buf(),
        reason,
    };
    let meta = std::fs::metadata(context).map_err(|e| unreadable(e.to_string()))?;
    if !meta.is_dir() {
        return Err(unreadable("not a directory".to_string()));
    }

    let manifests = recipe
        .manifests()
        .into_iter()
        .map(|m| Manifest::load(&context.join(m)))
        .collect::<Result<Vec<_>>>()?;

    let ignore = DockerIgnore::load(context)?;
    let prune = ignore.can_prune();
    let mut source_files = Vec::new();
    let walker = WalkDir::new(context)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !prune || !e.file_type().is_dir() {
                return true;
            }
            e.path()
                .strip_prefix(context)
                .map(|rel| !ignore.is_excluded(rel))
                .unwrap_or(true)
        });
    for entry in walker {
        let entry = entry.map_err(|e| unreadable(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(context)
            .map_err(|e| unreadable(e.to_string()))?;
        if ignore.is_excluded(rel) {
            continue;
        }
        source_files.push(rel.to_path_buf());
    }

    let plan = BuildPlan {
        context: context.to_path_buf(),
        workdir: recipe.workdir().unwrap_or("/").to_string(),
        manifests,
        source_files,
    };
    tracing::info!(
        context = %context.display(),
        manifests = plan.manifests.len(),
        files = plan.source_files.len(),
        "preflight passed"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::ImageRef;

    fn recipe(manifest: &str) -> Recipe {
        Recipe::builder()
            .base(ImageRef::new("python", "3.12-slim"))
            .workdir("/app")
            .install_dependencies([manifest], "pip install -r requirements.txt")
            .copy_source(".", ".")
            .expose(5000)
            .entrypoint(["flask", "run", "--host=0.0.0.0"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_plan_lists_sources_under_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==3.0.3\n").unwrap();
        std::fs::write(dir.path().join("app.py"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/index.html"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        std::fs::write(dir.path().join("target/debug/junk"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/events.db"), "").unwrap();
        std::fs::write(dir.path().join(".dockerignore"), "target\ndata\n").unwrap();

        let plan = preflight(&recipe("requirements.txt"), dir.path()).unwrap();
        assert_eq!(plan.manifests.len(), 1);
        assert_eq!(
            plan.image_paths(),
            vec![
                "/app/.dockerignore",
                "/app/app.py",
                "/app/requirements.txt",
                "/app/templates/index.html",
            ]
        );
    }

    #[test]
    fn test_plan_without_dockerignore_ships_everything() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/events.db"), "").unwrap();

        let plan = preflight(&recipe("requirements.txt"), dir.path()).unwrap();
        assert_eq!(plan.image_paths(), vec!["/app/data/events.db", "/app/requirements.txt"]);
    }

    #[test]
    fn test_workspace_dockerignore_matches_plan() {
        // The checked-in ignore file keeps build output and local data out.
        let ignore = DockerIgnore::parse(include_str!("../../../.dockerignore"));
        for path in ["target/release/ticketing", ".git/HEAD", "data/events.db"] {
            assert!(ignore.is_excluded(Path::new(path)), "{path}");
        }
        assert!(!ignore.is_excluded(Path::new("crates/ticketing-image/src/lib.rs")));
    }

    #[test]
    fn test_missing_manifest_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), "").unwrap();
        let err = preflight(&recipe("requirements.txt"), dir.path()).unwrap_err();
        assert!(matches!(err, ImageError::ManifestMissing(_)));
    }

    #[test]
    fn test_corrupt_manifest_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==\n").unwrap();
        let err = preflight(&recipe("requirements.txt"), dir.path()).unwrap_err();
        assert!(matches!(err, ImageError::ManifestInvalid { .. }));
    }

    #[test]
    fn test_unreadable_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = preflight(&recipe("requirements.txt"), &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ImageError::SourceUnreadable { .. }));

        let file = dir.path().join("file");
        std::fs::write(&file, "").unwrap();
        let err = preflight(&recipe("requirements.txt"), &file).unwrap_err();
        assert!(err.to_string().contains("not a directory"), "{err}");
    }
}
