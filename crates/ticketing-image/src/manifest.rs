//! Dependency manifests consumed by the install step.
//!
//! Two formats are read: Cargo manifests and plain requirement lists
//! (`name`, `name==1.2`, `name>=1,<2 ; marker`, `#` comments).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ImageError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Cargo,
    Requirements,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    /// Version constraint as written, if any.
    pub constraint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub kind: ManifestKind,
    pub requirements: Vec<Requirement>,
}

impl Manifest {
    /// Read and parse a manifest. The format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ImageError::ManifestMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ImageError::ManifestInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let kind = if path.extension().is_some_and(|ext| ext == "toml") {
            ManifestKind::Cargo
        } else {
            ManifestKind::Requirements
        };
        let manifest = match kind {
            ManifestKind::Cargo => Self::parse_cargo(path, &content)?,
            ManifestKind::Requirements => Self::parse_requirements(path, &content)?,
        };
        tracing::debug!(
            path = %path.display(),
            requirements = manifest.requirements.len(),
            "dependency manifest parsed"
        );
        Ok(manifest)
    }

    pub fn parse_cargo(path: &Path, content: &str) -> Result<Self> {
        let invalid = |reason: String| ImageError::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        };
        let table: toml::Table = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        if !table.contains_key("package") && !table.contains_key("workspace") {
            return Err(invalid("neither a [package] nor a [workspace] table".to_string()));
        }

        let mut requirements = Vec::new();
        let sections = [
            table.get("dependencies"),
            table.get("build-dependencies"),
            table
                .get("workspace")
                .and_then(|w| w.get("dependencies")),
        ];
        for section in sections.into_iter().flatten() {
            let deps = section
                .as_table()
                .ok_or_else(|| invalid("dependency section is not a table".to_string()))?;
            for (name, spec) in deps {
                let constraint = match spec {
                    toml::Value::String(v) => Some(v.clone()),
                    toml::Value::Table(t) => t
                        .get("version")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    _ => {
                        return Err(invalid(format!(
                            "dependency '{}' has an unsupported specification",
                            name
                        )))
                    }
                };
                requirements.push(Requirement {
                    name: name.clone(),
                    constraint,
                });
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            kind: ManifestKind::Cargo,
            requirements,
        })
    }

    pub fn parse_requirements(path: &Path, content: &str) -> Result<Self> {
        let mut requirements: Vec<Requirement> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            // Installer options (-r, --index-url, ...) are passed through untouched.
            if line.is_empty() || line.starts_with('-') {
                continue;
            }
            let req = parse_requirement(line).ok_or_else(|| ImageError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: format!("line {}: cannot parse requirement '{}'", lineno + 1, line),
            })?;

            let key = normalize_name(&req.name);
            match seen.get(&key) {
                Some(&idx) if requirements[idx].constraint == req.constraint => {}
                Some(&idx) => {
                    return Err(ImageError::DependencyConflict {
                        path: path.to_path_buf(),
                        name: req.name,
                        first: display_constraint(&requirements[idx].constraint),
                        second: display_constraint(&req.constraint),
                    });
                }
                None => {
                    seen.insert(key, requirements.len());
                    requirements.push(req);
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            kind: ManifestKind::Requirements,
            requirements,
        })
    }
}

fn display_constraint(c: &Option<String>) -> String {
    c.clone().unwrap_or_else(|| "any version".to_string())
}

/// Names compare case-insensitively with `-`, `_` and `.` treated alike.
fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

fn parse_requirement(line: &str) -> Option<Requirement> {
    let spec = line.split(';').next()?.trim();
    let op_at = spec.find(['=', '<', '>', '!', '~']).unwrap_or(spec.len());
    let (name_part, constraint) = spec.split_at(op_at);
    let name_part = name_part.trim();
    // Drop extras: `uvicorn[standard]`.
    let name = match name_part.find('[') {
        Some(i) if name_part.ends_with(']') => &name_part[..i],
        Some(_) => return None,
        None => name_part,
    };

    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid_name {
        return None;
    }

    let constraint = constraint.trim();
    let constraint = if constraint.is_empty() {
        None
    } else {
        let has_version = constraint.split(',').all(|part| {
            part.trim()
                .trim_start_matches(['=', '<', '>', '!', '~'])
                .chars()
                .any(|c| c.is_ascii_alphanumeric())
        });
        if !has_version {
            return None;
        }
        Some(constraint.replace(' ', ""))
    };

    Some(Requirement {
        name: name.to_string(),
        constraint,
    })
}
