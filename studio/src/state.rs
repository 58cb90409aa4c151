//! Shared pipeline state.
//!
//! One `ScriptState` is created per run, passed through every node and returned at the
//! end. All members are optional: a field is filled by the node that declares it as a
//! write, and nodes read only fields their path guarantees (or tolerate absence).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;

/// Field names, as used in node `reads` / `writes` declarations.
pub mod fields {
    pub const TOPIC: &str = "topic";
    pub const INFLUENCER: &str = "influencer";
    pub const STYLE_PROFILE: &str = "style_profile";
    pub const DURATION: &str = "duration";
    pub const CONTENT_TYPE: &str = "content_type";
    pub const RESEARCH_NOTES: &str = "research_notes";
    pub const HOOKS: &str = "hooks";
    pub const DRAFT_SCRIPT: &str = "draft_script";
    pub const EDITED_SCRIPT: &str = "edited_script";
    pub const PROCESSED_SCRIPT: &str = "processed_script";
    pub const QUALITY_REPORT: &str = "quality_report";
    pub const REVISION_COUNT: &str = "revision_count";
    pub const REVISION_FEEDBACK: &str = "revision_feedback";
}

/// Quality evaluation of the processed script. Scores are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub style_match_score: f64,
    pub clarity_score: f64,
    pub storytelling_score: f64,
    pub feedback: String,
    /// The evaluator's reply as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    /// Problems found while reading the reply (clamped or non-numeric scores).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl QualityReport {
    /// Report with every score set to `score` and the given feedback.
    pub fn uniform(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            style_match_score: score,
            clarity_score: score,
            storytelling_score: score,
            feedback: feedback.into(),
            raw_output: None,
            warnings: Vec::new(),
        }
    }
}

/// State shared by all pipeline nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub influencer: Option<String>,
    /// Style descriptor; opaque to the orchestrator, rendered into prompts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_profile: Option<Value>,
    /// Target length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// `"youtube"` (default) or `"instagram"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_report: Option<QualityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_feedback: Option<String>,
}

impl ScriptState {
    /// State with the two inputs every run needs.
    pub fn new(topic: impl Into<String>, style_profile: Value) -> Self {
        Self {
            topic: Some(topic.into()),
            style_profile: Some(style_profile),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_influencer(mut self, influencer: impl Into<String>) -> Self {
        self.influencer = Some(influencer.into());
        self
    }

    /// Whether the named field is present. Unknown names are reported absent.
    pub fn has_field(&self, name: &str) -> bool {
        use fields::*;
        match name {
            TOPIC => self.topic.is_some(),
            INFLUENCER => self.influencer.is_some(),
            STYLE_PROFILE => self.style_profile.is_some(),
            DURATION => self.duration.is_some(),
            CONTENT_TYPE => self.content_type.is_some(),
            RESEARCH_NOTES => self.research_notes.is_some(),
            HOOKS => self.hooks.is_some(),
            DRAFT_SCRIPT => self.draft_script.is_some(),
            EDITED_SCRIPT => self.edited_script.is_some(),
            PROCESSED_SCRIPT => self.processed_script.is_some(),
            QUALITY_REPORT => self.quality_report.is_some(),
            REVISION_COUNT => self.revision_count.is_some(),
            REVISION_FEEDBACK => self.revision_feedback.is_some(),
            _ => false,
        }
    }

    /// Revision counter, 0 when absent.
    pub fn revisions(&self) -> u32 {
        self.revision_count.unwrap_or(0)
    }
}

/// Returns the field's value or `AgentError::MissingField(name)`.
pub fn require<'a, T: ?Sized>(value: Option<&'a T>, name: &str) -> Result<&'a T, AgentError> {
    value.ok_or_else(|| AgentError::missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn has_field_tracks_presence() {
        let mut s = ScriptState::new("sleep", json!({"tone": "calm"}));
        assert!(s.has_field(fields::TOPIC));
        assert!(s.has_field(fields::STYLE_PROFILE));
        assert!(!s.has_field(fields::DRAFT_SCRIPT));
        s.draft_script = Some(String::new());
        assert!(s.has_field(fields::DRAFT_SCRIPT));
        assert!(!s.has_field("no_such_field"));
    }

    /// **Scenario**: absent fields are omitted when the state is serialized.
    #[test]
    fn serialization_omits_absent_fields() {
        let s = ScriptState::new("t", json!({})).with_duration(60);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, json!({"topic": "t", "style_profile": {}, "duration": 60}));
        let back: ScriptState = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn require_names_missing_field() {
        let s = ScriptState::default();
        match require(s.topic.as_deref(), fields::TOPIC) {
            Err(AgentError::MissingField(f)) => assert_eq!(f, "topic"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn revisions_defaults_to_zero() {
        assert_eq!(ScriptState::default().revisions(), 0);
    }
}
