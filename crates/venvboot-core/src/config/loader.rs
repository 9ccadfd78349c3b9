//! Environment variable loading with fallback chains.
//!
//! Keeps the `or_else` alias chains in one place instead of repeating them
//! at every call site.

use std::env;
use std::path::Path;
use std::sync::Once;

static DOTENV: Once = Once::new();

/// Load `.env` from the current directory into the process environment
/// (existing variables are never overwritten).
pub fn load_dotenv() {
    let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    load_dotenv_from_dir(&dir);
}

/// Load `<dir>/.env` into the process environment. Only the first call in a
/// process has any effect, so the CLI calls this with the project directory
/// before any config struct is built.
pub fn load_dotenv_from_dir(dir: &Path) {
    DOTENV.call_once(|| {
        let path = dir.join(".env");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return;
        };
        let mut loaded = 0usize;
        for line in content.lines() {
            if let Some((key, value)) = parse_dotenv_line(line) {
                if env::var(key).is_err() {
                    env::set_var(key, value);
                    loaded += 1;
                }
            }
        }
        tracing::debug!(path = %path.display(), loaded, "Loaded .env");
    });
}

/// Parse one `.env` line into `(key, value)`. Blank lines and comments yield `None`.
pub fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let mut value = value.trim();
    // Strip inline comment (# not inside quotes)
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
    if key.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

/// Read the primary variable or the first set alias; empty values fall back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` when unset or blank.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean variable: 0/false/no/off are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    let v = env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()));
    match v.as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_line_plain() {
        assert_eq!(
            parse_dotenv_line("VENVBOOT_ENV_DIR=.venv"),
            Some(("VENVBOOT_ENV_DIR", ".venv"))
        );
    }

    #[test]
    fn test_parse_dotenv_line_quotes_and_comments() {
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line("   "), None);
        assert_eq!(
            parse_dotenv_line("export VENVBOOT_PYTHON=\"/opt/py/bin/python3\""),
            Some(("VENVBOOT_PYTHON", "/opt/py/bin/python3"))
        );
        assert_eq!(
            parse_dotenv_line("VENVBOOT_QUIET=1 # silence"),
            Some(("VENVBOOT_QUIET", "1"))
        );
        assert_eq!(parse_dotenv_line("=value"), None);
        assert_eq!(parse_dotenv_line("NO_EQUALS"), None);
    }

    #[test]
    fn test_env_fallbacks_when_unset() {
        let key = "VENVBOOT_TEST_KEY_THAT_IS_NEVER_SET";
        assert_eq!(env_or(key, &[], || "fallback".to_string()), "fallback");
        assert_eq!(env_optional(key, &[]), None);
        assert!(env_bool(key, &[], true));
        assert!(!env_bool(key, &[], false));
    }
}
