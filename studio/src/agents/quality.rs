//! Quality evaluator: scores the processed script against the style profile.
//!
//! The reply is read with best-effort extraction and never fails the run: missing
//! scores default to 0.5, out-of-range scores are clamped, and an unreadable reply
//! produces an all-0.5 report that keeps the raw text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::agents::render_style;
use crate::error::AgentError;
use crate::extract::{extract_structured, Extracted};
use crate::llm::LlmClient;
use crate::pipeline::nodes;
use crate::state::{fields, require, QualityReport, ScriptState};
use crate::traits::Agent;

const TEMPERATURE: f32 = 0.0;

/// Score used when the evaluator did not provide one.
pub const DEFAULT_SCORE: f64 = 0.5;
pub const NO_FEEDBACK: &str = "No structured feedback available.";
pub const UNPARSED_FEEDBACK: &str = "Unable to parse feedback.";

fn prompt(script: &str, style: &str) -> String {
    format!(
        r#"Evaluate how well this script matches the influencer's style.

Influencer style:
{style}

Script:
{script}

Return JSON with:
{{
  "style_match_score": float (0-1),
  "clarity_score": float (0-1),
  "storytelling_score": float (0-1),
  "feedback": "short qualitative notes"
}}"#
    )
}

fn read_score(obj: &Map<String, Value>, key: &str, warnings: &mut Vec<String>) -> f64 {
    let raw = match obj.get(key) {
        None | Some(Value::Null) => return DEFAULT_SCORE,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match raw {
        Some(score) if score.is_finite() && (0.0..=1.0).contains(&score) => score,
        Some(score) if score.is_finite() => {
            let clamped = score.clamp(0.0, 1.0);
            tracing::warn!(key = key, score = score, clamped = clamped, "score out of range");
            warnings.push(format!("{key} {score} outside [0, 1], clamped to {clamped}"));
            clamped
        }
        _ => {
            tracing::warn!(key = key, value = ?obj.get(key), "non-numeric score");
            warnings.push(format!("{key} is not a number, using {DEFAULT_SCORE}"));
            DEFAULT_SCORE
        }
    }
}

fn read_feedback(obj: &Map<String, Value>) -> String {
    match obj.get("feedback") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => UNPARSED_FEEDBACK.to_string(),
    }
}

/// Builds a report from the evaluator's reply.
pub fn report_from_reply(reply: &str) -> QualityReport {
    let obj = match extract_structured(reply) {
        Extracted::Structured(Value::Object(obj)) => obj,
        _ => {
            tracing::warn!("quality reply was not a JSON object, using fallback report");
            return QualityReport {
                raw_output: Some(reply.to_string()),
                ..QualityReport::uniform(DEFAULT_SCORE, NO_FEEDBACK)
            };
        }
    };
    let mut warnings = Vec::new();
    QualityReport {
        style_match_score: read_score(&obj, "style_match_score", &mut warnings),
        clarity_score: read_score(&obj, "clarity_score", &mut warnings),
        storytelling_score: read_score(&obj, "storytelling_score", &mut warnings),
        feedback: read_feedback(&obj),
        raw_output: Some(reply.to_string()),
        warnings,
    }
}

/// Writes `quality_report` from `processed_script` and `style_profile`.
pub struct QualityAgent {
    llm: Arc<dyn LlmClient>,
}

impl QualityAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for QualityAgent {
    type State = ScriptState;

    fn name(&self) -> &str {
        nodes::EVALUATE_QUALITY
    }

    fn reads(&self) -> &[&'static str] {
        &[fields::PROCESSED_SCRIPT, fields::STYLE_PROFILE]
    }

    fn writes(&self) -> &[&'static str] {
        &[fields::QUALITY_REPORT]
    }

    async fn run(&self, mut state: ScriptState) -> Result<ScriptState, AgentError> {
        let script = require(state.processed_script.as_deref(), fields::PROCESSED_SCRIPT)?;
        let style = require(state.style_profile.as_ref(), fields::STYLE_PROFILE)?;
        let reply = self
            .llm
            .generate(&prompt(script, &render_style(style)), TEMPERATURE)
            .await?;
        let report = report_from_reply(&reply);
        tracing::info!(
            style_match = report.style_match_score,
            clarity = report.clarity_score,
            storytelling = report.storytelling_score,
            "quality evaluated"
        );
        state.quality_report = Some(report);
        Ok(state)
    }
}
