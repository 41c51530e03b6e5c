//! Response parsing: recover flashcards from unreliable model output.
//!
//! The model is asked for a bare JSON array of `{question, answer}` objects,
//! but nothing guarantees it complies. Parsing therefore runs through three
//! tiers, stopping at the first that yields a non-empty, fully valid result:
//!
//! 1. **Strict**: repair the whole response ([`super::repair`]) and parse it
//!    as one JSON array; every element must be a valid card.
//! 2. **Isolated**: take the first minimal `[...]` span of the response and
//!    parse just that, with the same repairs and validation.
//! 3. **Reconstructed**: split the span (or the whole response) on `},`,
//!    patch each fragment back into an object and keep whatever validates,
//!    falling back to label matching for fragments that still are not JSON.
//!
//! No tier ever fails the run: the worst case is an empty `Vec`.

use super::repair::{self, RepairPass, AGGRESSIVE_PASSES, CONSERVATIVE_PASSES, NOISE_PASSES};
use crate::output::Flashcard;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Which fallback tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    Strict,
    Isolated,
    Reconstructed,
}

/// Cards recovered from one response and the tier that recovered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub cards: Vec<Flashcard>,
    /// `None` when nothing could be salvaged.
    pub tier: Option<ParseTier>,
}

/// Parse a raw response into flashcards. Never fails.
pub fn parse_flashcards(raw: &str) -> Vec<Flashcard> {
    parse_response(raw).cards
}

/// Parse a raw response, also reporting the tier that succeeded.
pub fn parse_response(raw: &str) -> ParsedResponse {
    if let Some(cards) = repaired_parse(raw) {
        return ParsedResponse {
            cards,
            tier: Some(ParseTier::Strict),
        };
    }
    debug!("Strict parse failed; isolating first [...] span");

    let span = isolate_array(raw);
    if let Some(cards) = span.and_then(repaired_parse) {
        return ParsedResponse {
            cards,
            tier: Some(ParseTier::Isolated),
        };
    }
    debug!(
        "Isolated parse failed (span found: {}); reconstructing objects",
        span.is_some()
    );

    let cards = reconstruct_objects(span.unwrap_or_else(|| raw.trim()));
    let tier = if cards.is_empty() {
        None
    } else {
        Some(ParseTier::Reconstructed)
    };
    ParsedResponse { cards, tier }
}

// ── Tier 1 / 2 helpers ───────────────────────────────────────────────────────

/// Repair stages, from least to most invasive.
const REPAIR_LADDER: [&[RepairPass]; 3] =
    [NOISE_PASSES, CONSERVATIVE_PASSES, AGGRESSIVE_PASSES];

/// Strictly parse after each repair stage in turn; a stage that leaves the
/// text unchanged is not re-parsed.
fn repaired_parse(text: &str) -> Option<Vec<Flashcard>> {
    let mut previous: Option<String> = None;
    for passes in REPAIR_LADDER {
        let repaired = repair::apply(text, passes);
        if previous.as_deref() == Some(repaired.as_str()) {
            continue;
        }
        if let Some(cards) = strict_parse(&repaired) {
            return Some(cards);
        }
        previous = Some(repaired);
    }
    None
}

/// A non-empty JSON array whose every element is a valid card.
fn strict_parse(text: &str) -> Option<Vec<Flashcard>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(Flashcard::from_value).collect()
}

static RE_FIRST_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*?\]").unwrap());

/// First minimal `[...]` span of the trimmed response.
fn isolate_array(raw: &str) -> Option<&str> {
    RE_FIRST_ARRAY.find(raw.trim()).map(|m| m.as_str())
}

// ── Tier 3 ───────────────────────────────────────────────────────────────────

static RE_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""question"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static RE_ANSWER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""answer"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

fn reconstruct_objects(text: &str) -> Vec<Flashcard> {
    text.split("},")
        .filter_map(|fragment| {
            let card = reconstruct_fragment(fragment);
            if card.is_none() && !fragment.trim().is_empty() {
                debug!("Skipping unrecoverable fragment ({} chars)", fragment.len());
            }
            card
        })
        .collect()
}

fn reconstruct_fragment(fragment: &str) -> Option<Flashcard> {
    let mut obj = fragment.trim();
    obj = obj.strip_prefix('[').unwrap_or(obj).trim_start();
    obj = obj.strip_suffix(']').unwrap_or(obj).trim_end();
    if obj.is_empty() {
        return None;
    }

    let mut patched = String::with_capacity(obj.len() + 2);
    if !obj.starts_with('{') {
        patched.push('{');
    }
    patched.push_str(obj);
    if !obj.ends_with('}') {
        patched.push('}');
    }

    match serde_json::from_str::<Value>(&patched) {
        Ok(value) => Flashcard::from_value(&value),
        Err(_) => match_labels(&patched),
    }
}

/// Last resort: first quoted value after each label.
fn match_labels(text: &str) -> Option<Flashcard> {
    let question = RE_QUESTION.captures(text)?;
    let answer = RE_ANSWER.captures(text)?;
    Flashcard::new(&unescape(&question[1]), &unescape(&answer[1]))
}

/// Decode JSON escapes; keep the raw text if it is not a valid JSON string body.
fn unescape(body: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{body}\"")).unwrap_or_else(|_| body.to_string())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn card(q: &str, a: &str) -> Flashcard {
        Flashcard::new(q, a).unwrap()
    }

    #[test]
    fn strict_clean_array() {
        let parsed = parse_response(r#"[{"question":"Q1","answer":"A1"}]"#);
        assert_eq!(parsed.cards, vec![card("Q1", "A1")]);
        assert_eq!(parsed.tier, Some(ParseTier::Strict));
    }

    #[test]
    fn strict_with_prose_noise() {
        let raw = r#"Here is the result: [{"question":"Q1","answer":"A1"}] Hope this helps!"#;
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1")]);
        assert_eq!(parsed.tier, Some(ParseTier::Strict));
    }

    #[test]
    fn strict_with_markdown_fence_and_trailing_comma() {
        let raw = "```json\n[\n  {\"question\": \" Q1 \", \"answer\": \"A1\"},\n  {\"question\": \"Q2\", \"answer\": \"A2\"},\n]\n```";
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1"), card("Q2", "A2")]);
        assert_eq!(parsed.tier, Some(ParseTier::Strict));
    }

    #[test]
    fn strict_with_doubled_quotes() {
        let raw = r#"[{""question"": ""Q1"", ""answer"": ""A1""}]"#;
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1")]);
        assert_eq!(parsed.tier, Some(ParseTier::Strict));
    }

    #[test]
    fn valid_json_with_comma_bracket_text_is_untouched() {
        let raw = r#"[{"question":"Fix the list [a, b, ]","answer":"Drop the comma, }"}]"#;
        let parsed = parse_response(raw);
        assert_eq!(
            parsed.cards,
            vec![card("Fix the list [a, b, ]", "Drop the comma, }")]
        );
        assert_eq!(parsed.tier, Some(ParseTier::Strict));
    }

    #[test]
    fn escaped_quotes_survive_strict_tier() {
        let raw = r#"[{"question":"Who said \"hi\"?","answer":"Bob"}]"#;
        let cards = parse_flashcards(raw);
        assert_eq!(cards, vec![card("Who said \"hi\"?", "Bob")]);
    }

    #[test]
    fn isolated_when_two_arrays_present() {
        let raw = r#"First: [{"question":"Q1","answer":"A1"}] and also [1, 2] done"#;
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1")]);
        assert_eq!(parsed.tier, Some(ParseTier::Isolated));
    }

    #[test]
    fn reconstructed_from_malformed_objects() {
        let raw = r#"{"question":"Q1","answer":"A1"},{"question":"Q2" "answer":"A2""#;
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1"), card("Q2", "A2")]);
        assert_eq!(parsed.tier, Some(ParseTier::Reconstructed));
    }

    #[test]
    fn reconstructed_skips_invalid_elements() {
        let raw = r#"[{"question":"Q1","answer":"A1"},{"question":"","answer":"A2"}]"#;
        let parsed = parse_response(raw);
        assert_eq!(parsed.cards, vec![card("Q1", "A1")]);
        assert_eq!(parsed.tier, Some(ParseTier::Reconstructed));
    }

    #[test]
    fn truncated_response_keeps_complete_objects() {
        let raw = r#"[{"question":"Q1","answer":"A1"},{"question":"Q2","ans"#;
        let cards = parse_flashcards(raw);
        assert_eq!(cards, vec![card("Q1", "A1")]);
    }

    #[test]
    fn label_fallback_decodes_escapes() {
        let raw = r#"{"question": "Line\nbreak?" "answer": "Tab\there"}"#;
        let cards = parse_flashcards(raw);
        assert_eq!(cards, vec![card("Line\nbreak?", "Tab\there")]);
    }

    #[test]
    fn non_string_fields_rejected() {
        let raw = r#"[{"question": 42, "answer": "A"}]"#;
        assert!(parse_flashcards(raw).is_empty());
    }

    #[test]
    fn degenerate_inputs_yield_empty() {
        for raw in ["no json here", "", "   ", "[]", "[null]", "{}", "}},{{"] {
            let parsed = parse_response(raw);
            assert!(parsed.cards.is_empty(), "expected no cards for {raw:?}");
            assert_eq!(parsed.tier, None);
        }
    }

    #[test]
    fn fields_are_trimmed_at_every_tier() {
        let raw = r#"{"question":"  Q1  ","answer":"\tA1\n"},{"question":"  Q2 " "answer":" A2 ""#;
        let cards = parse_flashcards(raw);
        assert_eq!(cards, vec![card("Q1", "A1"), card("Q2", "A2")]);
    }
}
