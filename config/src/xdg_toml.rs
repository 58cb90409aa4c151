//! `[env]` table of `$XDG_CONFIG_HOME/<app>/config.toml`.
//!
//! ```toml
//! [env]
//! OPENAI_MODEL = "gpt-4o-mini"
//! STUDIO_QUALITY_THRESHOLD = "0.8"
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set and non-empty, else the platform config dir.
fn config_home() -> Result<PathBuf, LoadError> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into())),
    }
}

/// `<config home>/<app_name>/config.toml`, whether or not it exists.
pub fn config_file_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

fn xdg_config_path(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let path = config_file_path(app_name)?;
    Ok(path.is_file().then_some(path))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Returns env key-value pairs from `[env]` section. Missing file or empty section returns empty map.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = xdg_config_path(app_name)? else {
        return Ok(HashMap::new());
    };
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_env::{with_xdg_home, write_app_config};

    #[test]
    fn config_file_path_uses_xdg_config_home() {
        let dir = tempfile::tempdir().unwrap();
        let path = with_xdg_home(dir.path(), || config_file_path("content-studio"));
        assert_eq!(
            path.unwrap(),
            dir.path().join("content-studio").join("config.toml")
        );
    }

    #[test]
    fn missing_config_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let map = with_xdg_home(dir.path(), || load_env_map("content-studio")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn reads_env_table() {
        let dir = tempfile::tempdir().unwrap();
        write_app_config(
            dir.path(),
            "content-studio",
            "[env]\nOPENAI_MODEL = \"from_toml\"\nSTUDIO_MAX_REVISIONS = \"3\"\n",
        );
        let map = with_xdg_home(dir.path(), || load_env_map("content-studio")).unwrap();
        assert_eq!(map.get("OPENAI_MODEL").map(String::as_str), Some("from_toml"));
        assert_eq!(map.get("STUDIO_MAX_REVISIONS").map(String::as_str), Some("3"));
    }

    /// **Scenario**: a file with other tables but no `[env]`, or an empty `[env]`, adds nothing.
    #[test]
    fn absent_or_empty_env_table_returns_empty_map() {
        for body in ["[env]\n", "[other]\nmodel = \"ignored\"\n"] {
            let dir = tempfile::tempdir().unwrap();
            write_app_config(dir.path(), "content-studio", body);
            let map = with_xdg_home(dir.path(), || load_env_map("content-studio")).unwrap();
            assert!(map.is_empty(), "{}", body);
        }
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_app_config(dir.path(), "content-studio", "not valid toml [[[\n");
        let result = with_xdg_home(dir.path(), || load_env_map("content-studio"));
        assert!(matches!(result, Err(LoadError::XdgParse(_))));
    }
}
