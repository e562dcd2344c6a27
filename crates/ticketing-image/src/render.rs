//! Dockerfile rendering. One instruction per step, in recipe order.

use std::fmt::Write;

use crate::recipe::{Recipe, Step};

pub const HEADER: &str = "# Generated by `ticketing image render`. Do not edit by hand.";

pub fn render(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");
    for step in recipe.steps() {
        match step {
            Step::Base(image) => {
                let _ = writeln!(out, "FROM {image}");
            }
            Step::Workdir(path) => {
                let _ = writeln!(out, "WORKDIR {path}");
            }
            Step::InstallDependencies { manifests, command } => {
                for m in manifests {
                    let _ = writeln!(out, "COPY {m} ./{m}");
                }
                let _ = writeln!(out, "RUN {command}");
            }
            Step::CopySource { src, dest } => {
                let _ = writeln!(out, "COPY {src} {dest}");
            }
            Step::Run(command) => {
                let _ = writeln!(out, "RUN {command}");
            }
            Step::Expose(port) => {
                let _ = writeln!(out, "EXPOSE {port}");
            }
            Step::Env { name, value } => {
                let _ = writeln!(out, "ENV {name}={}", quote_env(value));
            }
            Step::Entrypoint(tokens) => {
                // Exec form: no shell between the engine and the process.
                let json = serde_json::to_string(tokens).unwrap_or_else(|_| "[]".to_string());
                let _ = writeln!(out, "CMD {json}");
            }
        }
    }
    out
}

fn quote_env(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '$' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{service_recipe, ImageRef};

    #[test]
    fn test_checked_in_dockerfile_is_current() {
        let rendered = render(&service_recipe().unwrap());
        assert_eq!(rendered, include_str!("../../../Dockerfile"));
    }

    #[test]
    fn test_render_instruction_order() {
        let recipe = Recipe::builder()
            .base(ImageRef::new("python", "3.12-slim"))
            .workdir("/app")
            .install_dependencies(["requirements.txt"], "pip install -r requirements.txt")
            .copy_source(".", ".")
            .expose(5000)
            .env("FLASK_APP", "app.py")
            .env("GREETING", "hello world")
            .entrypoint(["flask", "run", "--host=0.0.0.0"])
            .build()
            .unwrap();
        let text = render(&recipe);
        let lines: Vec<_> = text.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "FROM python:3.12-slim",
                "WORKDIR /app",
                "COPY requirements.txt ./requirements.txt",
                "RUN pip install -r requirements.txt",
                "COPY . .",
                "EXPOSE 5000",
                "ENV FLASK_APP=app.py",
                "ENV GREETING=\"hello world\"",
                r#"CMD ["flask","run","--host=0.0.0.0"]"#,
            ]
        );
    }

    #[test]
    fn test_quote_env() {
        assert_eq!(quote_env("development"), "development");
        assert_eq!(quote_env(""), "\"\"");
        assert_eq!(quote_env("a $HOME"), "\"a \\$HOME\"");
        assert_eq!(quote_env("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
