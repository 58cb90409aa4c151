//! CLI error type. Every variant renders as a one-line message naming the cause.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("style '{name}' not found in {}", dir.display())]
    StyleNotFound { name: String, dir: PathBuf },
    #[error("invalid style name '{0}'")]
    InvalidStyleName(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: invalid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("no style given: pass --influencer NAME or --style PATH")]
    NoStyle,
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("build pipeline: {0}")]
    Build(#[from] studio::CompilationError),
    #[error("voice calibration: {0}")]
    Calibration(#[from] studio::AgentError),
    #[error("{0}")]
    Run(#[from] studio::RunError),
    #[error("run ended without a final state")]
    StreamClosed,
    #[error("encode output: {0}")]
    Encode(serde_json::Error),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
