//! Style library: influencer style profiles stored as JSON files.
//!
//! ```text
//! <root>/influencer_styles/<name>.json       long-form (YouTube)
//! <root>/IG_influencer_styles/<name>.json    short-form (Instagram)
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::CliError;

pub const LONGFORM_DIR: &str = "influencer_styles";
pub const SHORTFORM_DIR: &str = "IG_influencer_styles";
pub const PERSONALIZED_SUFFIX: &str = "_personalized";

/// `<name>_personalized`: where a calibrated style is saved.
pub fn personalized_name(name: &str) -> String {
    format!("{}{}", name, PERSONALIZED_SUFFIX)
}

fn is_shortform(content_type: &str) -> bool {
    content_type.trim().eq_ignore_ascii_case("instagram")
}

/// Reads one style file.
pub fn load_style_file(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct StyleLibrary {
    root: PathBuf,
}

impl StyleLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding styles for `content_type` (`"instagram"` → short-form).
    pub fn dir_for(&self, content_type: &str) -> PathBuf {
        let sub = if is_shortform(content_type) {
            SHORTFORM_DIR
        } else {
            LONGFORM_DIR
        };
        self.root.join(sub)
    }

    fn path_for(&self, name: &str, content_type: &str) -> Result<PathBuf, CliError> {
        let valid = !name.trim().is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        if !valid {
            return Err(CliError::InvalidStyleName(name.to_string()));
        }
        Ok(self.dir_for(content_type).join(format!("{}.json", name)))
    }

    /// Style names (file stems of `*.json`), sorted. A missing directory lists nothing.
    pub fn list(&self, content_type: &str) -> Result<Vec<String>, CliError> {
        let dir = self.dir_for(content_type);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "style directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(CliError::io(&dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CliError::io(&dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str, content_type: &str) -> Result<Value, CliError> {
        let path = self.path_for(name, content_type)?;
        if !path.is_file() {
            return Err(CliError::StyleNotFound {
                name: name.to_string(),
                dir: self.dir_for(content_type),
            });
        }
        load_style_file(&path)
    }

    /// Writes `style` as pretty JSON, creating the directory. Overwrites an existing file.
    pub fn save(&self, name: &str, content_type: &str, style: &Value) -> Result<PathBuf, CliError> {
        let path = self.path_for(name, content_type)?;
        let dir = self.dir_for(content_type);
        std::fs::create_dir_all(&dir).map_err(|e| CliError::io(&dir, e))?;
        let text = serde_json::to_string_pretty(style).map_err(CliError::Encode)?;
        std::fs::write(&path, text).map_err(|e| CliError::io(&path, e))?;
        tracing::info!(path = %path.display(), "style saved");
        Ok(path)
    }
}
