//! Environment loading with fallback chains.
//!
//! Keeps the `primary → aliases → default` logic in one place so callers never
//! repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Deprecated variable → preferred variable.
const DEPRECATED_PAIRS: &[(&str, &str)] = &[
    ("FLASK_ENV", "TICKETING_ENV"),
    ("FLASK_RUN_HOST", "TICKETING_HOST"),
    ("FLASK_RUN_PORT", "TICKETING_PORT"),
    ("DATABASE_PATH", "TICKETING_DATABASE_PATH"),
];

/// Print one migration hint when a deprecated variable is set and its
/// replacement is not.
fn warn_deprecated_env_vars() {
    use std::sync::Once;
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        let hints: Vec<String> = DEPRECATED_PAIRS
            .iter()
            .filter(|(deprecated, recommended)| {
                env::var(deprecated).is_ok() && env::var(recommended).is_err()
            })
            .map(|(deprecated, recommended)| format!("{} → {}", deprecated, recommended))
            .collect();
        if !hints.is_empty() {
            tracing::warn!(
                "[DEPRECATED] the following environment variables are deprecated:\n   {}",
                hints.join("\n   ")
            );
        }
    });
}

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, unquoted inline comments are
/// stripped and one level of matching quotes is removed.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Load `<dir>/.env` into the process environment without overriding
/// variables that are already set. Returns how many variables were applied.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return 0;
    };
    let mut applied = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(&key, value);
            applied += 1;
        }
    }
    applied
}

/// Load `.env` from the current directory once per process.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
        warn_deprecated_env_vars();
    });
}

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary variable or the first set alias; empty values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Boolean variable: `0/false/no/off` are false, any other value is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => parse_bool(&s),
        None => default,
    }
}

fn parse_bool(s: &str) -> bool {
    !matches!(
        s.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_quotes_and_comments() {
        let content = r#"
# comment
TICKETING_ENV=development
TICKETING_DATABASE_PATH="data/events.db"
export TICKETING_PORT=5000 # inline
TICKETING_LOG_LEVEL='ticketing=debug'
EMPTY=
not a pair
"#;
        let pairs = parse_dotenv(content);
        assert_eq!(
            pairs,
            vec![
                ("TICKETING_ENV".to_string(), "development".to_string()),
                ("TICKETING_DATABASE_PATH".to_string(), "data/events.db".to_string()),
                ("TICKETING_PORT".to_string(), "5000".to_string()),
                ("TICKETING_LOG_LEVEL".to_string(), "ticketing=debug".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "TICKETING_TEST_DOTENV_KEEP=file\nTICKETING_TEST_DOTENV_NEW=file\n",
        )
        .unwrap();
        env::set_var("TICKETING_TEST_DOTENV_KEEP", "process");

        let applied = load_dotenv_from_dir(dir.path());

        assert_eq!(applied, 1);
        assert_eq!(env::var("TICKETING_TEST_DOTENV_KEEP").unwrap(), "process");
        assert_eq!(env::var("TICKETING_TEST_DOTENV_NEW").unwrap(), "file");
    }

    #[test]
    fn test_env_optional_alias_chain() {
        env::set_var("TICKETING_TEST_ALIAS_LEGACY", "legacy");
        assert_eq!(
            env_optional("TICKETING_TEST_ALIAS_PRIMARY", &["TICKETING_TEST_ALIAS_LEGACY"]),
            Some("legacy".to_string())
        );
        env::set_var("TICKETING_TEST_ALIAS_PRIMARY", "  ");
        // Blank primary falls through to nothing, not to the alias.
        assert_eq!(
            env_optional("TICKETING_TEST_ALIAS_PRIMARY", &["TICKETING_TEST_ALIAS_LEGACY"]),
            None
        );
    }

    #[test]
    fn test_parse_bool() {
        for falsy in ["0", "false", "No", "OFF"] {
            assert!(!parse_bool(falsy), "{falsy}");
        }
        for truthy in ["1", "true", "yes", "on"] {
            assert!(parse_bool(truthy), "{truthy}");
        }
    }
}
