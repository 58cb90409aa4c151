//! Configuration loading for content-studio.
//!
//! Values come from the project `.env` and from `$XDG_CONFIG_HOME/<app>/config.toml`
//! (`[env]` table) and are applied to the process environment with priority
//! **existing env > .env > XDG**. `studio::settings` then reads the environment.
//!
//! With the `tracing-init` feature, [`tracing_init::init`] installs the shared subscriber
//! used by the CLI.

mod dotenv;
mod xdg_toml;

#[cfg(feature = "tracing-init")]
pub mod tracing_init;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;

pub use xdg_toml::config_file_path;

/// Application name used for the XDG config directory.
pub const APP_NAME: &str = "content-studio";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Resolves the value each key should get: `.env` first, then XDG. Keys for which
/// `is_set` is true are left out, since the process environment wins.
fn resolve(
    dotenv: &HashMap<String, String>,
    xdg: &HashMap<String, String>,
    is_set: impl Fn(&str) -> bool,
) -> Vec<(String, String)> {
    let keys: BTreeSet<&String> = dotenv.keys().chain(xdg.keys()).collect();
    keys.into_iter()
        .filter(|key| !is_set(key.as_str()))
        .filter_map(|key| {
            dotenv
                .get(key)
                .or_else(|| xdg.get(key))
                .map(|value| (key.clone(), value.clone()))
        })
        .collect()
}

/// Loads the XDG `config.toml` and the optional project `.env`, then sets environment
/// variables only for keys that are not already set.
///
/// * `app_name`: directory under the config home, normally [`APP_NAME`].
/// * `override_dir`: look for `.env` here instead of the current directory.
///
/// Returns the keys that were applied, sorted.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let xdg = xdg_toml::load_env_map(app_name)?;
    let dotenv = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let applied = resolve(&dotenv, &xdg, |key| std::env::var_os(key).is_some());
    for (key, value) in &applied {
        std::env::set_var(key, value);
    }
    Ok(applied.into_iter().map(|(key, _)| key).collect())
}
