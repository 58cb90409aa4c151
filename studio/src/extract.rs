//! Best-effort structured extraction from free-text LLM replies.
//!
//! Models often wrap JSON in prose or code fences. `extract_structured` tries, in order:
//! the whole (trimmed) reply, the body of a fenced code block, each balanced
//! `{ ... }` substring from left to right, and finally the widest span from the first
//! `{` to the last `}`. Only objects and arrays count as structured; anything else is
//! returned as `Extracted::Fallback` with the original text. Never fails.

use serde_json::Value;

/// Result of reading a reply as structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Structured(Value),
    /// No structured value could be recovered; holds the reply unchanged.
    Fallback(String),
}

impl Extracted {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Extracted::Structured(v) => Some(v),
            Extracted::Fallback(_) => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Extracted::Structured(_))
    }
}

fn parse_structured(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => Some(v),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let end = after.find("```")?;
    Some(&after[..end])
}

/// Every balanced `{ ... }` span as `(start, end)`, ordered by start, found in one
/// pass. Braces inside string literals of an open object are skipped; quotes in prose
/// between objects are not strings. Unclosed braces yield no span.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
}

fn first_balanced_object(text: &str) -> Option<Value> {
    balanced_spans(text)
        .into_iter()
        .find_map(|(start, end)| parse_structured(&text[start..end]))
}

fn widest_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| parse_structured(&text[start..=end])).flatten()
}

/// Reads `text` as JSON if at all possible; otherwise returns it as `Fallback`.
pub fn extract_structured(text: &str) -> Extracted {
    parse_structured(text)
        .or_else(|| fenced_block(text).and_then(parse_structured))
        .or_else(|| first_balanced_object(text))
        .or_else(|| widest_span(text))
        .map(Extracted::Structured)
        .unwrap_or_else(|| Extracted::Fallback(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: JSON surrounded by prose is recovered.
    #[test]
    fn extracts_object_embedded_in_prose() {
        let got = extract_structured("Sure, here you go: {\"a\": 1, \"b\": 2} thanks!");
        assert_eq!(got, Extracted::Structured(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn braceless_text_falls_back_unchanged() {
        let text = "I cannot score this script.";
        assert_eq!(
            extract_structured(text),
            Extracted::Fallback(text.to_string())
        );
    }

    #[test]
    fn valid_json_is_returned_as_is() {
        let got = extract_structured(r#"{"style_match_score": 0.9, "feedback": "ok"}"#);
        assert_eq!(
            got,
            Extracted::Structured(json!({"style_match_score": 0.9, "feedback": "ok"}))
        );
    }

    #[test]
    fn fenced_code_block_is_read() {
        let got = extract_structured("Result:\n```json\n{\"x\": [1, 2]}\n```\nDone.");
        assert_eq!(got, Extracted::Structured(json!({"x": [1, 2]})));
    }

    /// **Scenario**: a brace inside a string literal does not end the object early, and
    /// an unparseable first candidate is skipped in favour of a later one.
    #[test]
    fn braces_inside_strings_and_bad_candidates() {
        let got = extract_structured(r#"note {oops} then {"msg": "a } b", "n": 1} end"#);
        assert_eq!(got, Extracted::Structured(json!({"msg": "a } b", "n": 1})));
    }

    #[test]
    fn scalars_are_not_structured() {
        assert!(!extract_structured("0.9").is_structured());
        assert!(!extract_structured("\"just a string\"").is_structured());
    }

    /// **Scenario**: an object nested after an unclosed brace is still recovered.
    #[test]
    fn object_after_unclosed_brace_is_found() {
        let got = extract_structured(r#"use {braces like {"a": 1} here"#);
        assert_eq!(got, Extracted::Structured(json!({"a": 1})));
    }

    /// **Scenario**: a long run of unclosed braces is scanned once, not once per brace.
    #[test]
    fn many_unclosed_braces_stay_linear() {
        let text = format!("{}{{\"ok\": true}}", "{".repeat(50_000));
        let started = std::time::Instant::now();
        assert_eq!(
            extract_structured(&text),
            Extracted::Structured(json!({"ok": true}))
        );
        let only_open = "{ x".repeat(50_000);
        assert!(!extract_structured(&only_open).is_structured());
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn unbalanced_braces_fall_back() {
        let text = "{ \"a\": 1";
        assert_eq!(extract_structured(text).into_value(), None);
    }
}
