//! Repair passes: deterministic cleanup of model output before a strict parse.
//!
//! Even when asked for "only a JSON array", generative models wrap their
//! answer in prose ("Here are your flashcards: …"), leave trailing commas, or
//! double up quote characters. Each quirk is fixed by one small pass.
//!
//! Every pass is a pure `&str → String` function and idempotent
//! (`p(p(x)) == p(x)`), so passes can be re-ordered, re-run, or tested alone.
//! They are pattern-based text repair, not a JSON grammar: they can damage
//! text that merely looks like the quirk they target.
//!
//! ## Pass Order
//!
//! Noise stripping runs first so comma removal only sees the JSON body.
//! The parser escalates through three pass lists and stops at the first that
//! parses: [`NOISE_PASSES`], then [`CONSERVATIVE_PASSES`], then
//! [`AGGRESSIVE_PASSES`]. Comma removal can rewrite string contents that
//! happen to contain `, ]` or `, }`, and quote collapsing can corrupt an empty
//! `""` value, so neither touches a response that already parses.

use once_cell::sync::Lazy;
use regex::Regex;

/// A single repair pass.
pub type RepairPass = fn(&str) -> String;

/// Passes applied before the first strict parse; they only remove text
/// outside the outermost brackets.
pub const NOISE_PASSES: &[RepairPass] =
    &[trim_whitespace, strip_leading_noise, strip_trailing_noise];

/// Noise passes followed by trailing-comma removal.
pub const CONSERVATIVE_PASSES: &[RepairPass] = &[
    trim_whitespace,
    strip_leading_noise,
    strip_trailing_noise,
    remove_trailing_commas,
];

/// Conservative passes followed by quote collapsing.
pub const AGGRESSIVE_PASSES: &[RepairPass] = &[
    trim_whitespace,
    strip_leading_noise,
    strip_trailing_noise,
    remove_trailing_commas,
    collapse_quote_runs,
];

/// Run `passes` over `input` in order.
pub fn apply(input: &str, passes: &[RepairPass]) -> String {
    passes
        .iter()
        .fold(input.to_string(), |text, pass| pass(&text))
}

// ── Pass 1: Trim ─────────────────────────────────────────────────────────────

pub fn trim_whitespace(input: &str) -> String {
    input.trim().to_string()
}

// ── Pass 2: Strip leading prose ──────────────────────────────────────────────

/// Drop everything before the first `[`.
///
/// Text with no `[` at all has no array to recover and becomes empty.
pub fn strip_leading_noise(input: &str) -> String {
    match input.find('[') {
        Some(idx) => input[idx..].to_string(),
        None => String::new(),
    }
}

// ── Pass 3: Strip trailing prose ─────────────────────────────────────────────

/// Drop everything after the last `]` or `}`.
pub fn strip_trailing_noise(input: &str) -> String {
    match input.rfind([']', '}']) {
        Some(idx) => input[..=idx].to_string(),
        None => String::new(),
    }
}

// ── Pass 4: Remove trailing commas ───────────────────────────────────────────

static RE_TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(?:\s*,)*\s*([\]}])").unwrap());

/// `[{…},]` → `[{…}]`, `{"a": 1,}` → `{"a": 1}`.
pub fn remove_trailing_commas(input: &str) -> String {
    RE_TRAILING_COMMA.replace_all(input, "$1").into_owned()
}

// ── Pass 5: Collapse quote runs ──────────────────────────────────────────────

static RE_QUOTE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""{2,}"#).unwrap());

/// `""question""` → `"question"`.
pub fn collapse_quote_runs(input: &str) -> String {
    RE_QUOTE_RUN.replace_all(input, "\"").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(pass: RepairPass, input: &str) {
        let once = pass(input);
        assert_eq!(pass(&once), once, "pass not idempotent for {input:?}");
    }

    #[test]
    fn test_strip_leading_noise() {
        assert_eq!(strip_leading_noise("Sure! [1, 2]"), "[1, 2]");
        assert_eq!(strip_leading_noise("[1]"), "[1]");
        assert_eq!(strip_leading_noise("no array here"), "");
    }

    #[test]
    fn test_strip_trailing_noise() {
        assert_eq!(strip_trailing_noise("[1, 2] Hope this helps!"), "[1, 2]");
        assert_eq!(strip_trailing_noise(r#"[{"a": 1}"#), r#"[{"a": 1}"#);
        assert_eq!(strip_trailing_noise("[ unterminated"), "");
    }

    #[test]
    fn test_remove_trailing_commas() {
        assert_eq!(remove_trailing_commas(r#"[{"a": 1,}, ]"#), r#"[{"a": 1}]"#);
        assert_eq!(remove_trailing_commas("[1, 2,\n  ]"), "[1, 2]");
        assert_eq!(remove_trailing_commas("[1,,]"), "[1]");
        assert_eq!(remove_trailing_commas("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn test_collapse_quote_runs() {
        assert_eq!(
            collapse_quote_runs(r#"[{""question"": """Q"""}]"#),
            r#"[{"question": "Q"}]"#
        );
        // Known damage: an empty string value loses its closing quote.
        assert_eq!(collapse_quote_runs(r#"{"answer": ""}"#), r#"{"answer": "}"#);
    }

    #[test]
    fn every_pass_is_idempotent() {
        let samples = [
            "",
            "prose only",
            r#"Here you go: [{"question": "Q", "answer": "A",},] Enjoy"#,
            r#"[{""question"": ""Q"", ""answer"": ""A""}]"#,
            "[1,, ,]",
            "]]}}",
        ];
        for s in samples {
            for pass in AGGRESSIVE_PASSES {
                assert_idempotent(*pass, s);
            }
        }
    }

    #[test]
    fn test_apply_conservative() {
        let raw = "  Here is the result: [{\"question\":\"Q1\",\"answer\":\"A1\",}] Hope this helps!  ";
        assert_eq!(
            apply(raw, CONSERVATIVE_PASSES),
            r#"[{"question":"Q1","answer":"A1"}]"#
        );
    }

    #[test]
    fn noise_passes_leave_commas_inside_strings() {
        let raw = r#"Result: [{"question":"Fix [a, b, ]","answer":"ok"}]"#;
        assert_eq!(
            apply(raw, NOISE_PASSES),
            r#"[{"question":"Fix [a, b, ]","answer":"ok"}]"#
        );
        assert_ne!(apply(raw, CONSERVATIVE_PASSES), apply(raw, NOISE_PASSES));
    }

    #[test]
    fn conservative_passes_leave_quote_runs() {
        let raw = r#"[{"question": "Q", "answer": ""}]"#;
        assert_eq!(apply(raw, CONSERVATIVE_PASSES), raw);
        assert_ne!(apply(raw, AGGRESSIVE_PASSES), raw);
    }
}
