//! Project `.env` reader. Produces a key-value map; applying it to the process env is
//! done in `lib.rs` so that existing variables are never overwritten.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `override_dir` when given, else in the current directory. `None` when absent.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Removes one pair of matching surrounding quotes. Double quotes honour `\"`.
fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

/// Line-oriented `KEY=VALUE` parser.
///
/// * Blank lines and lines starting with `#` are skipped; `#` inside a value is kept.
/// * An optional leading `export ` is accepted, as written by shell-style env files.
/// * `KEY=` and `KEY=""` give an empty value; lines without `=` or with an empty key are skipped.
/// * No multiline values or continuations.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim())))
        })
        .collect()
}

/// Reads `.env` into a map. A missing file yields an empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse_dotenv(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}
