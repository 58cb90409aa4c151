//! Voice calibration: derive a creator's style fingerprint from writing samples and
//! blend it into an influencer profile (influencer leads, about 70/30).
//!
//! Both operations make one LLM call at a low temperature and never fail on a
//! malformed reply: analysis falls back to an "unable to parse" record, merging falls
//! back to the influencer profile annotated with the raw reply.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::error::AgentError;
use crate::extract::{extract_structured, Extracted};
use crate::llm::LlmClient;

const TEMPERATURE: f32 = 0.3;
const SAMPLE_BREAK: &str = "\n\n--- SAMPLE BREAK ---\n\n";
const UNPARSED: &str = "unable to parse";

fn analyze_prompt(samples: &str) -> String {
    format!(
        r#"You are an expert writing-style analyst.

Analyse the writing samples below and extract the creator's voice fingerprint: the
subtle patterns that make their writing distinct.

Return strict JSON with exactly these keys:
{{
  "tone": "emotional tone (casual, professional, motivational...)",
  "structure": "pacing style",
  "sentence_pattern": "rhythm and length patterns",
  "signature_phrases": ["recurring expressions or transitions"],
  "persona": "identity or worldview",
  "vocabulary_patterns": ["common word choices or technical terms"],
  "sentence_rhythm": "cadence (staccato, flowing, conversational...)",
  "emotional_markers": ["words or phrases that show emotion"],
  "forbidden_phrases": ["cliches or expressions the creator avoids"]
}}

Be specific and base everything on patterns actually present. Use "varies" or "mixed"
when unclear. No markdown, no explanations, JSON only.

Writing samples:
{samples}"#
    )
}

fn merge_prompt(influencer: &str, creator: &str) -> String {
    format!(
        r#"You are a style synthesis expert. Merge two writing styles into one profile.

Priority:
1. Influencer style is primary: macro structure, tone, persona, pacing.
2. Creator style is secondary: vocabulary, rhythm variations, emotional nuances.

The result must feel like the influencer with the creator's subtle voice markers woven
in: roughly 70% influencer, 30% creator, not an even blend. Keep the influencer's
signature phrases; add the creator's vocabulary as flavour.

--- INFLUENCER STYLE (primary) ---
{influencer}

--- CREATOR STYLE (secondary) ---
{creator}

Return strict JSON with exactly these keys:
{{
  "tone": "...",
  "structure": "...",
  "sentence_pattern": "...",
  "signature_phrases": ["..."],
  "persona": "...",
  "vocabulary_patterns": ["..."],
  "emotional_markers": ["..."],
  "sentence_rhythm": "..."
}}
No markdown, no explanations, JSON only."#
    )
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Profile to treat as the influencer's: the stored style's `merged_profile`, else its
/// `style_profile`, else the most recent entry of `analyses`, else the value itself.
pub fn influencer_core(style: &Value) -> &Value {
    if let Some(core) = ["merged_profile", "style_profile"]
        .iter()
        .find_map(|key| style.get(*key).filter(|v| v.is_object()))
    {
        return core;
    }
    match style.get("analyses").and_then(Value::as_array).and_then(|a| a.last()) {
        Some(last) => last,
        None => style,
    }
}

fn unparsed_analysis(raw: String) -> Value {
    json!({
        "tone": UNPARSED,
        "structure": UNPARSED,
        "sentence_pattern": UNPARSED,
        "signature_phrases": [],
        "persona": UNPARSED,
        "vocabulary_patterns": [],
        "sentence_rhythm": UNPARSED,
        "emotional_markers": [],
        "forbidden_phrases": [],
        "raw_output": raw,
    })
}

/// Builds and blends style profiles. Used by hosts before a run, not as a graph node.
pub struct VoiceCalibrator {
    llm: Arc<dyn LlmClient>,
}

impl VoiceCalibrator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Extracts a style fingerprint from one or more writing samples.
    pub async fn analyze(&self, samples: &[String]) -> Result<Value, AgentError> {
        let samples: Vec<&str> = samples
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if samples.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "voice calibration needs at least one non-empty writing sample".into(),
            ));
        }
        tracing::info!(samples = samples.len(), "analyzing creator style");
        let reply = self
            .llm
            .generate(&analyze_prompt(&samples.join(SAMPLE_BREAK)), TEMPERATURE)
            .await?;
        Ok(match extract_structured(&reply) {
            Extracted::Structured(v @ Value::Object(_)) => v,
            _ => {
                tracing::warn!("creator style reply was not a JSON object");
                unparsed_analysis(reply)
            }
        })
    }

    /// Blends `creator` into `influencer`, influencer-led.
    pub async fn merge(&self, creator: &Value, influencer: &Value) -> Result<Value, AgentError> {
        let mut creator_clean = creator.clone();
        if let Value::Object(map) = &mut creator_clean {
            map.remove("raw_output");
        }
        let influencer_clean = influencer_core(influencer);
        tracing::info!("merging creator style into influencer profile");
        let reply = self
            .llm
            .generate(
                &merge_prompt(&pretty(influencer_clean), &pretty(&creator_clean)),
                TEMPERATURE,
            )
            .await?;

        match extract_structured(&reply) {
            Extracted::Structured(Value::Object(mut merged)) => {
                if !merged.get("signature_phrases").is_some_and(Value::is_array) {
                    merged.insert("signature_phrases".into(), Value::Array(Vec::new()));
                }
                Ok(Value::Object(merged))
            }
            _ => {
                tracing::warn!("merge reply was not a JSON object, keeping influencer style");
                let mut fallback = match influencer_clean {
                    Value::Object(map) => map.clone(),
                    other => {
                        let mut map = Map::new();
                        map.insert("profile".into(), other.clone());
                        map
                    }
                };
                fallback.insert(
                    "merge_note".into(),
                    Value::String("Merge failed, using influencer style only".into()),
                );
                fallback.insert("raw_merge_output".into(), Value::String(reply));
                Ok(Value::Object(fallback))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;

    #[tokio::test]
    async fn analyze_joins_samples_and_parses_profile() {
        let llm = Arc::new(MockLlm::new(r#"{"tone": "wry", "signature_phrases": ["look,"]}"#));
        let cal = VoiceCalibrator::new(llm.clone());
        let profile = cal
            .analyze(&["first sample".into(), "  ".into(), "second sample".into()])
            .await
            .unwrap();
        assert_eq!(profile["tone"], "wry");
        let call = &llm.calls()[0];
        assert_eq!(call.temperature, 0.3);
        assert!(call
            .text()
            .contains("first sample\n\n--- SAMPLE BREAK ---\n\nsecond sample"));
    }

    #[tokio::test]
    async fn analyze_fallback_marks_unparsed() {
        let cal = VoiceCalibrator::new(Arc::new(MockLlm::new("They write casually.")));
        let profile = cal.analyze(&["sample".into()]).await.unwrap();
        assert_eq!(profile["tone"], "unable to parse");
        assert_eq!(profile["raw_output"], "They write casually.");
    }

    #[tokio::test]
    async fn analyze_rejects_empty_samples() {
        let llm = Arc::new(MockLlm::new("{}"));
        let cal = VoiceCalibrator::new(llm.clone());
        assert!(cal.analyze(&[]).await.is_err());
        assert_eq!(llm.call_count(), 0);
    }

    /// **Scenario**: the merged profile always has an array of signature phrases, and the
    /// creator's raw_output never reaches the prompt.
    #[tokio::test]
    async fn merge_forces_signature_phrases_array() {
        let llm = Arc::new(MockLlm::new(r#"{"tone": "bold", "signature_phrases": "let's go"}"#));
        let cal = VoiceCalibrator::new(llm.clone());
        let merged = cal
            .merge(
                &json!({"tone": "wry", "raw_output": "SECRET_RAW"}),
                &json!({"tone": "bold"}),
            )
            .await
            .unwrap();
        assert_eq!(merged["signature_phrases"], json!([]));
        assert!(!llm.calls()[0].text().contains("SECRET_RAW"));
    }

    #[tokio::test]
    async fn merge_fallback_keeps_influencer_core() {
        let cal = VoiceCalibrator::new(Arc::new(MockLlm::new("cannot merge")));
        let influencer = json!({
            "analyses": [{"tone": "old"}, {"tone": "latest"}]
        });
        let merged = cal.merge(&json!({"tone": "wry"}), &influencer).await.unwrap();
        assert_eq!(merged["tone"], "latest");
        assert_eq!(merged["raw_merge_output"], "cannot merge");
        assert!(merged.get("merge_note").is_some());
    }

    #[test]
    fn influencer_core_prefers_merged_profile() {
        let style = json!({"merged_profile": {"tone": "m"}, "analyses": [{"tone": "a"}]});
        assert_eq!(influencer_core(&style), &json!({"tone": "m"}));
        let wrapped = json!({"name": "x", "style_profile": {"tone": "s"}});
        assert_eq!(influencer_core(&wrapped), &json!({"tone": "s"}));
        let plain = json!({"tone": "p"});
        assert_eq!(influencer_core(&plain), &plain);
    }
}
