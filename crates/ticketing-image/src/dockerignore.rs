//! `.dockerignore` rules, so preflight lists exactly what the engine ships.
//!
//! Patterns are matched segment by segment against context-relative paths:
//! `*` and `?` stay within a segment, `**` spans any number of segments, a
//! leading `!` re-includes. A pattern that matches a directory excludes
//! everything under it. The last matching rule wins.

use std::path::Path;

use crate::error::{ImageError, Result};

pub const FILE_NAME: &str = ".dockerignore";

#[derive(Debug, Clone)]
struct Rule {
    segments: Vec<String>,
    negated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DockerIgnore {
    rules: Vec<Rule>,
}

impl DockerIgnore {
    /// Rules from `<context>/.dockerignore`; no file means nothing is ignored.
    pub fn load(context: &Path) -> Result<Self> {
        let path = context.join(FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ImageError::SourceUnreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let rules = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|line| {
                let (negated, pattern) = match line.strip_prefix('!') {
                    Some(rest) => (true, rest.trim()),
                    None => (false, line),
                };
                let segments: Vec<String> = pattern
                    .split('/')
                    .filter(|s| !s.is_empty() && *s != ".")
                    .map(str::to_string)
                    .collect();
                (!segments.is_empty()).then_some(Rule { segments, negated })
            })
            .collect();
        Self { rules }
    }

    /// Whether directories can be skipped whole: only when nothing inside one
    /// could be re-included.
    pub fn can_prune(&self) -> bool {
        !self.rules.iter().any(|r| r.negated)
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let mut excluded = false;
        for rule in &self.rules {
            let hit = (1..=parts.len()).any(|n| match_segments(&rule.segments, &parts[..n]));
            if hit {
                excluded = !rule.negated;
            }
        }
        excluded
    }
}

fn match_segments(pattern: &[String], path: &[String]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((first, rest)) if first == "**" => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((first, rest)) => match path.split_first() {
            Some((seg, path_rest)) => {
                match_glob(first.as_bytes(), seg.as_bytes()) && match_segments(rest, path_rest)
            }
            None => false,
        },
    }
}

fn match_glob(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((b'*', rest)) => (0..=text.len()).any(|i| match_glob(rest, &text[i..])),
        Some((b'?', rest)) => !text.is_empty() && match_glob(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && match_glob(rest, &text[1..]),
    }
}
