//! Library side of the `studio` binary: style library, run orchestration, terminal output.
//!
//! The binary parses arguments and wires Ctrl-C to a cancellation token; everything that
//! can be tested without a terminal lives here.

pub mod display;
pub mod error;
pub mod run;
pub mod styles;

pub use display::{format_quality_report, strip_influencer_mentions, truncate};
pub use error::CliError;
pub use run::{
    build_llm, demo_llm, initial_state, progress_line, resolve_style, run_once, run_pipeline,
    ContentType, ResolvedStyle, RunOptions,
};
pub use styles::{load_style_file, personalized_name, StyleLibrary};

/// Text printed (or written with `--output`) after a successful run.
///
/// JSON mode serializes the whole final state. Text mode prints the processed script,
/// with standalone "Influencer" mentions removed unless `keep_influencer`, followed by
/// the quality report.
pub fn render_output(
    state: &studio::ScriptState,
    json: bool,
    keep_influencer: bool,
) -> Result<String, CliError> {
    if json {
        return serde_json::to_string_pretty(state).map_err(CliError::Encode);
    }
    let script = state.processed_script.as_deref().unwrap_or_default();
    let script = if keep_influencer {
        script.trim().to_string()
    } else {
        strip_influencer_mentions(script)
    };
    let mut out = format!("=== Final script ===\n{}\n", script);
    if let Some(report) = &state.quality_report {
        out.push_str("\n=== Quality report ===\n");
        out.push_str(&format_quality_report(report));
        out.push('\n');
    }
    if let Some(n) = state.revision_count {
        out.push_str(&format!("revisions:    {}\n", n));
    }
    Ok(out)
}
