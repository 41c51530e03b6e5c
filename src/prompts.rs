//! Generation prompts and the response schema sent to Gemini.
//!
//! Every prompt is built here so wording changes happen in one place and can
//! be checked by unit tests without a network call.

use crate::config::Difficulty;
use serde_json::{json, Value};

/// Inline example of the expected output, quoted inside every prompt.
pub const JSON_EXAMPLE: &str =
    r#"[{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}]"#;

/// The difficulty qualifier placed before "question-and-answer flashcards".
fn qualifier(difficulty: Difficulty) -> (&'static str, &'static str) {
    match difficulty {
        Difficulty::Easy => ("simple ", ""),
        Difficulty::Normal => ("", " requiring a slightly deeper understanding"),
        Difficulty::Hard => (
            "challenging ",
            " encouraging critical thinking or synthesis",
        ),
    }
}

/// Build the generation instruction for one chunk.
///
/// The chunk is embedded verbatim after the `Text:` label.
pub fn build_prompt(chunk: &str, difficulty: Difficulty) -> String {
    let (prefix, suffix) = qualifier(difficulty);
    format!(
        "Generate 3-5 {prefix}question-and-answer flashcards{suffix} based on the following text. \
Return only a JSON array in this format: {JSON_EXAMPLE}. \
Do not include any additional text, explanations, or comments outside the JSON array.\n\n\
Text: {chunk}"
    )
}

/// Response schema requested from the model (`responseSchema`).
///
/// The model is not guaranteed to honour it; the parser does not rely on it.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "answer": { "type": "STRING" }
            },
            "required": ["question", "answer"]
        }
    })
}
