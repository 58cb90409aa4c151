//! Runtime settings read from the process environment.
//!
//! Call `config::load_and_apply` first so `.env` and `config.toml` values are visible
//! here. Unparseable values fall back to the default with a warning.

use std::str::FromStr;
use std::time::Duration;

use crate::graph::{RetryPolicy, DEFAULT_STEP_LIMIT};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_QUALITY_THRESHOLD: &str = "STUDIO_QUALITY_THRESHOLD";
pub const ENV_MAX_REVISIONS: &str = "STUDIO_MAX_REVISIONS";
pub const ENV_STEP_LIMIT: &str = "STUDIO_STEP_LIMIT";
pub const ENV_LLM_TIMEOUT_SECS: &str = "STUDIO_LLM_TIMEOUT_SECS";
pub const ENV_LLM_MAX_RETRIES: &str = "STUDIO_LLM_MAX_RETRIES";
pub const ENV_LLM_RETRY_BACKOFF_MS: &str = "STUDIO_LLM_RETRY_BACKOFF_MS";
pub const ENV_DISPLAY_MAX_LEN: &str = "STUDIO_DISPLAY_MAX_LEN";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_DISPLAY_MAX_LEN: usize = 160;

/// Quality gate parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPolicy {
    /// A style-match score below this sends the script back for revision.
    pub threshold: f64,
    /// Upper bound on revisions per run.
    pub max_revisions: u32,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            max_revisions: 2,
        }
    }
}

/// Text-generation client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Node-level retries for transient failures.
    pub max_retries: usize,
    pub retry_backoff: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl LlmSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::backoff(self.max_retries, self.retry_backoff)
    }
}

/// Everything the pipeline needs besides the LLM client itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub quality: QualityPolicy,
    pub step_limit: usize,
    pub llm: LlmSettings,
    /// Max chars per field in verbose state dumps.
    pub display_max_len: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            quality: QualityPolicy::default(),
            step_limit: DEFAULT_STEP_LIMIT,
            llm: LlmSettings::default(),
            display_max_len: DEFAULT_DISPLAY_MAX_LEN,
        }
    }
}

impl PipelineSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` (key → value). Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let threshold = parse_or(&get, ENV_QUALITY_THRESHOLD, defaults.quality.threshold);
        let threshold = if (0.0..=1.0).contains(&threshold) {
            threshold
        } else {
            tracing::warn!(
                key = ENV_QUALITY_THRESHOLD,
                value = threshold,
                "threshold outside [0, 1], using default"
            );
            defaults.quality.threshold
        };

        Self {
            quality: QualityPolicy {
                threshold,
                max_revisions: parse_or(&get, ENV_MAX_REVISIONS, defaults.quality.max_revisions),
            },
            step_limit: parse_or(&get, ENV_STEP_LIMIT, defaults.step_limit).max(1),
            llm: LlmSettings {
                api_key: get(ENV_API_KEY),
                base_url: get(ENV_BASE_URL).or_else(|| get(ENV_API_BASE)),
                model: get(ENV_MODEL).unwrap_or(defaults.llm.model),
                timeout: Duration::from_secs(parse_or(
                    &get,
                    ENV_LLM_TIMEOUT_SECS,
                    defaults.llm.timeout.as_secs(),
                )),
                max_retries: parse_or(&get, ENV_LLM_MAX_RETRIES, defaults.llm.max_retries),
                retry_backoff: Duration::from_millis(parse_or(
                    &get,
                    ENV_LLM_RETRY_BACKOFF_MS,
                    defaults.llm.retry_backoff.as_millis() as u64,
                )),
            },
            display_max_len: parse_or(&get, ENV_DISPLAY_MAX_LEN, defaults.display_max_len),
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key = key, value = %raw, "invalid setting, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_env_gives_defaults() {
        let s = PipelineSettings::from_lookup(|_| None);
        assert_eq!(s, PipelineSettings::default());
        assert_eq!(s.quality.threshold, 0.85);
        assert_eq!(s.quality.max_revisions, 2);
        assert_eq!(s.step_limit, 50);
        assert_eq!(s.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn values_are_read_and_base_url_falls_back_to_api_base() {
        let s = PipelineSettings::from_lookup(lookup(&[
            (ENV_QUALITY_THRESHOLD, "0.7"),
            (ENV_MAX_REVISIONS, "4"),
            (ENV_API_BASE, "http://localhost:11434/v1"),
            (ENV_MODEL, "llama3"),
            (ENV_LLM_TIMEOUT_SECS, "30"),
        ]));
        assert_eq!(s.quality.threshold, 0.7);
        assert_eq!(s.quality.max_revisions, 4);
        assert_eq!(s.llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(s.llm.model, "llama3");
        assert_eq!(s.llm.timeout, Duration::from_secs(30));
    }

    /// **Scenario**: garbage and out-of-range values fall back to defaults.
    #[test]
    fn invalid_values_use_defaults() {
        let s = PipelineSettings::from_lookup(lookup(&[
            (ENV_QUALITY_THRESHOLD, "1.5"),
            (ENV_MAX_REVISIONS, "many"),
            (ENV_STEP_LIMIT, "0"),
        ]));
        assert_eq!(s.quality.threshold, 0.85);
        assert_eq!(s.quality.max_revisions, 2);
        assert_eq!(s.step_limit, 1);
    }

    /// **Scenario**: the display cap is read like every other setting, and a bad value
    /// keeps the default.
    #[test]
    fn display_max_len_is_parsed_with_fallback() {
        let s = PipelineSettings::from_lookup(lookup(&[(ENV_DISPLAY_MAX_LEN, "40")]));
        assert_eq!(s.display_max_len, 40);
        for bad in ["wide", "-5", "1.5"] {
            let s = PipelineSettings::from_lookup(lookup(&[(ENV_DISPLAY_MAX_LEN, bad)]));
            assert_eq!(s.display_max_len, DEFAULT_DISPLAY_MAX_LEN, "{}", bad);
        }
    }

    #[test]
    fn zero_retries_disables_retry_policy() {
        let s = PipelineSettings::from_lookup(lookup(&[(ENV_LLM_MAX_RETRIES, "0")]));
        assert_eq!(s.llm.retry_policy(), RetryPolicy::None);
    }
}
