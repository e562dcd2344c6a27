use std::path::Path;

use anyhow::{Context, Result};
use ticketing_image::{build_image, preflight, render, service_recipe, DockerCli};

pub fn cmd_render(output: Option<&Path>) -> Result<()> {
    let dockerfile = render(&service_recipe()?);
    match output {
        Some(path) => {
            std::fs::write(path, &dockerfile)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{dockerfile}"),
    }
    Ok(())
}

pub fn cmd_check(context: &Path) -> Result<()> {
    let plan = preflight(&service_recipe()?, context)?;
    for manifest in &plan.manifests {
        println!(
            "{} ({} dependencies)",
            manifest.path.display(),
            manifest.requirements.len()
        );
    }
    println!(
        "{} source files would be copied to {}",
        plan.source_files.len(),
        plan.workdir
    );
    Ok(())
}

pub fn cmd_build(context: &Path, tag: &str) -> Result<()> {
    let recipe = service_recipe()?;
    let engine = DockerCli::locate()?;
    let plan = build_image(&recipe, context, tag, &engine)
        .with_context(|| format!("Failed to build image {}", tag))?;
    println!("Built {} from {} files", tag, plan.source_files.len());
    Ok(())
}
