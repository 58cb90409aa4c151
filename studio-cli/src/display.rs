//! Output formatting for the terminal: final script, quality report, verbose state dumps.

use std::sync::OnceLock;

use regex::Regex;
use studio::{QualityReport, ScriptState};

/// Indent for nested lines.
const INDENT: &str = "  ";

fn influencer_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\binfluencer\b").ok())
        .as_ref()
}

/// Removes standalone "Influencer" (any case, whole word) and trims the result.
pub fn strip_influencer_mentions(text: &str) -> String {
    match influencer_re() {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Truncates to at most `max` chars, ending in "..." when cut. UTF-8 safe.
pub fn truncate(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", head, SUFFIX)
}

pub fn format_quality_report(report: &QualityReport) -> String {
    let mut lines = vec![
        format!("style match:  {:.2}", report.style_match_score),
        format!("clarity:      {:.2}", report.clarity_score),
        format!("storytelling: {:.2}", report.storytelling_score),
        format!("feedback:     {}", report.feedback),
    ];
    for warning in &report.warnings {
        lines.push(format!("warning:      {}", warning));
    }
    lines.join("\n")
}

/// One line per present text field, each truncated to `max` chars on a single line.
pub fn format_state_summary(state: &ScriptState, max: usize) -> String {
    let one_line = |s: &str| truncate(&s.replace('\n', " "), max);
    let mut lines = vec!["ScriptState {".to_string()];
    let text_fields = [
        ("topic", &state.topic),
        ("content_type", &state.content_type),
        ("research_notes", &state.research_notes),
        ("draft_script", &state.draft_script),
        ("edited_script", &state.edited_script),
        ("processed_script", &state.processed_script),
        ("revision_feedback", &state.revision_feedback),
    ];
    for (name, value) in text_fields {
        if let Some(v) = value {
            lines.push(format!("{}{}: {}", INDENT, name, one_line(v)));
        }
    }
    if let Some(hooks) = &state.hooks {
        lines.push(format!("{}hooks: {}", INDENT, one_line(&hooks.to_string())));
    }
    if let Some(report) = &state.quality_report {
        lines.push(format!(
            "{}quality_report: style={:.2} clarity={:.2} storytelling={:.2}",
            INDENT, report.style_match_score, report.clarity_score, report.storytelling_score
        ));
    }
    if let Some(n) = state.revision_count {
        lines.push(format!("{}revision_count: {}", INDENT, n));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: whole-word, case-insensitive; words containing it are untouched.
    #[test]
    fn strips_standalone_mentions_only() {
        assert_eq!(
            strip_influencer_mentions("Influencer: hey INFLUENCER fans, influencers rule"),
            ": hey  fans, influencers rule"
        );
        assert_eq!(strip_influencer_mentions("  plain script \n"), "plain script");
    }

    #[test]
    fn truncate_keeps_short_and_marks_cut() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8).chars().count(), 8);
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn quality_report_lists_scores_and_warnings() {
        let mut report = QualityReport::uniform(0.5, "tighten the intro");
        report.warnings.push("clarity_score clamped".into());
        let text = format_quality_report(&report);
        assert!(text.contains("style match:  0.50"));
        assert!(text.contains("tighten the intro"));
        assert!(text.contains("clamped"));
    }

    #[test]
    fn state_summary_shows_present_fields() {
        let mut state = ScriptState::new("sleep", serde_json::json!({}));
        state.draft_script = Some("line one\nline two".into());
        state.revision_count = Some(1);
        let text = format_state_summary(&state, 100);
        assert!(text.contains("topic: sleep"));
        assert!(text.contains("draft_script: line one line two"));
        assert!(text.contains("revision_count: 1"));
        assert!(!text.contains("edited_script"));
    }
}
