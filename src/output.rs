//! Result types produced by a generation run.

use crate::error::ChunkError;
use crate::pipeline::parse::ParseTier;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown when a run finishes without a single usable card.
pub const NO_FLASHCARDS_MESSAGE: &str = "No flashcards could be generated from the provided text. \
Please ensure the text is clear and contains information suitable for Q&A.";

/// A validated question/answer pair.
///
/// Both fields are trimmed and non-empty; there is no way to build or
/// deserialize a card that breaks this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFlashcard")]
pub struct Flashcard {
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct RawFlashcard {
    question: String,
    answer: String,
}

impl TryFrom<RawFlashcard> for Flashcard {
    type Error = &'static str;

    fn try_from(raw: RawFlashcard) -> Result<Self, Self::Error> {
        Flashcard::new(&raw.question, &raw.answer)
            .ok_or("flashcard question and answer must be non-empty")
    }
}

impl Flashcard {
    /// Trim both fields; `None` if either ends up empty.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    /// Apply the validation predicate to an arbitrary JSON value.
    ///
    /// Accepts only a non-null object whose `question` and `answer` are
    /// strings that are non-empty after trimming.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let question = obj.get("question")?.as_str()?;
        let answer = obj.get("answer")?.as_str()?;
        Self::new(question, answer)
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Outcome of one chunk's request + parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// 1-indexed position of the chunk in the source text.
    pub chunk_num: usize,
    /// Chunk length in characters.
    pub char_count: usize,
    /// Cards parsed from this chunk's response, before deduplication.
    pub cards: Vec<Flashcard>,
    /// Parser tier that produced `cards`, if any did.
    pub tier: Option<ParseTier>,
    /// Wall-clock time spent on the request and parse.
    pub duration_ms: u64,
    /// Set when the request itself failed.
    pub error: Option<ChunkError>,
}

impl ChunkResult {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Characters of source text after trimming.
    pub source_chars: usize,
    pub total_chunks: usize,
    /// Chunks whose request succeeded (even if no card could be parsed).
    pub succeeded_chunks: usize,
    pub failed_chunks: usize,
    /// Cards across all chunks before deduplication.
    pub raw_cards: usize,
    pub unique_cards: usize,
    pub duplicates_removed: usize,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// Final deduplicated deck, in first-seen order.
    pub cards: Vec<Flashcard>,
    /// Per-chunk details, in chunk order.
    pub chunks: Vec<ChunkResult>,
    pub stats: GenerationStats,
}

impl GenerationOutput {
    /// True when no card survived. This is an outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// One-line user-facing summary of the run.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            NO_FLASHCARDS_MESSAGE.to_string()
        } else {
            format!(
                "Generated {} flashcards. Flip a card to reveal the answer!",
                self.cards.len()
            )
        }
    }

    /// Iterate over the chunk errors, with their chunk numbers.
    pub fn chunk_errors(&self) -> impl Iterator<Item = (usize, &ChunkError)> {
        self.chunks
            .iter()
            .filter_map(|c| c.error.as_ref().map(|e| (c.chunk_num, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flashcard_trims_fields() {
        let card = Flashcard::new("  What is Rust?\n", "\tA language ").unwrap();
        assert_eq!(card.question(), "What is Rust?");
        assert_eq!(card.answer(), "A language");
    }

    #[test]
    fn flashcard_rejects_blank_fields() {
        assert!(Flashcard::new("   ", "a").is_none());
        assert!(Flashcard::new("q", "").is_none());
    }

    #[test]
    fn from_value_validation_predicate() {
        assert!(Flashcard::from_value(&json!({"question": "Q", "answer": "A"})).is_some());
        assert!(Flashcard::from_value(&json!(null)).is_none());
        assert!(Flashcard::from_value(&json!(["Q", "A"])).is_none());
        assert!(Flashcard::from_value(&json!({"question": 1, "answer": "A"})).is_none());
        assert!(Flashcard::from_value(&json!({"question": "Q"})).is_none());
        assert!(Flashcard::from_value(&json!({"question": "Q", "answer": "  "})).is_none());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Flashcard, _> =
            serde_json::from_str(r#"{"question": " Q ", "answer": "A"}"#);
        assert_eq!(ok.unwrap().question(), "Q");

        let bad: Result<Flashcard, _> = serde_json::from_str(r#"{"question": "", "answer": "A"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn empty_output_summary_is_informational() {
        let out = GenerationOutput {
            cards: vec![],
            chunks: vec![],
            stats: GenerationStats::default(),
        };
        assert!(out.is_empty());
        assert_eq!(out.summary(), NO_FLASHCARDS_MESSAGE);
    }

    #[test]
    fn chunk_errors_lists_failed_chunks() {
        let ok = ChunkResult {
            chunk_num: 1,
            char_count: 10,
            cards: vec![Flashcard::new("Q", "A").unwrap()],
            tier: Some(ParseTier::Strict),
            duration_ms: 5,
            error: None,
        };
        let failed = ChunkResult {
            chunk_num: 2,
            char_count: 10,
            cards: vec![],
            tier: None,
            duration_ms: 5,
            error: Some(ChunkError::EmptyContent),
        };
        let out = GenerationOutput {
            cards: ok.cards.clone(),
            chunks: vec![ok, failed],
            stats: GenerationStats::default(),
        };
        let errors: Vec<_> = out.chunk_errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 2);
        assert!(out.summary().contains("Generated 1 flashcards"));
    }
}
