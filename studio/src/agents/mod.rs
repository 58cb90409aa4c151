//! Pipeline agents: one LLM call per run, reading and writing `ScriptState` fields.
//!
//! | node               | reads                                   | writes             | temp |
//! |--------------------|-----------------------------------------|--------------------|------|
//! | `research`         | topic                                   | research_notes     | 0.9  |
//! | `generate_hooks`   | topic, style_profile                    | hooks              | 1.0  |
//! | `write_script`     | topic, style_profile                    | draft_script       | 1.0  |
//! | `revise_script`    | processed_script, revision_feedback     | draft_script       | 0.9  |
//! | `shortform_script` | topic, style_profile                    | draft_script       | 1.0  |
//! | `edit_script`      | draft_script                            | edited_script      | 0.6  |
//! | `post_process`     | edited_script                           | processed_script   | 0.0  |
//! | `evaluate_quality` | processed_script, style_profile         | quality_report     | 0.0  |
//!
//! [`VoiceCalibrator`] is not a graph node; hosts call it to build a style profile.

mod editor;
mod hooks;
mod postprocess;
mod quality;
mod research;
mod shortform;
mod voice;
mod writer;

pub use editor::EditorAgent;
pub use hooks::HookAgent;
pub use postprocess::PostProcessAgent;
pub use quality::{report_from_reply, QualityAgent};
pub use research::ResearchAgent;
pub use shortform::ShortFormAgent;
pub use voice::{influencer_core, VoiceCalibrator};
pub use writer::{ScriptWriter, WriterMode};

use serde_json::Value;

/// Words spoken per second of video, used to size scripts.
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Default long-form length in seconds.
pub const DEFAULT_LONGFORM_SECONDS: u32 = 180;

/// Default short-form length in seconds.
pub const DEFAULT_SHORTFORM_SECONDS: u32 = 60;

/// Approximate word budget for a script of `seconds`.
pub fn target_words(seconds: u32) -> u32 {
    (f64::from(seconds) * WORDS_PER_SECOND) as u32
}

/// Style profile rendered for a prompt (pretty JSON, strings unquoted).
pub(crate) fn render_style(style: &Value) -> String {
    match style {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
