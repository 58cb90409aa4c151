//! Shared tracing subscriber for the CLI.
//!
//! - **RUST_LOG**: filter directives. When unset: `warn`, or `warn,studio=debug` with `verbose`.
//! - **STUDIO_LOG_DIR**: when set, logs go to a daily-rolling `studio.log` in that
//!   directory (plain text, no ANSI); otherwise to stderr so stdout carries only the script.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_DIR_ENV: &str = "STUDIO_LOG_DIR";
pub const LOG_FILE_PREFIX: &str = "studio.log";

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("create log dir {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("install subscriber: {0}")]
    Install(String),
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,studio=debug,studio_cli=debug"
    } else {
        "warn"
    }
}

/// `STUDIO_LOG_DIR` when set and non-empty.
pub fn log_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(LOG_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn filter(verbose: bool) -> Result<EnvFilter, TracingInitError> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .map_err(|e| TracingInitError::Filter(e.to_string())),
        _ => Ok(EnvFilter::new(default_directives(verbose))),
    }
}

fn file_layer<S>(dir: &Path) -> Result<Box<dyn Layer<S> + Send + Sync>, TracingInitError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    std::fs::create_dir_all(dir).map_err(|source| TracingInitError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    Ok(tracing_subscriber::fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .boxed())
}

/// Installs the global subscriber. `log_dir` overrides `STUDIO_LOG_DIR`.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Result<(), TracingInitError> {
    let filter = filter(verbose)?;
    let log_dir = log_dir.map(Path::to_path_buf).or_else(log_dir_from_env);

    let layer = match &log_dir {
        Some(dir) => file_layer(dir)?,
        None => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TracingInitError::Install(e.to_string()))?;

    if let Some(dir) = log_dir {
        tracing::info!(dir = %dir.display(), "logging to daily file");
    }
    Ok(())
}
