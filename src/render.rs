//! Presenting a finished deck: interactive flip state and file formats.
//!
//! Nothing here feeds back into the pipeline; it only reads the cards in a
//! [`crate::output::GenerationOutput`].

use crate::error::FlashcardError;
use crate::output::{Flashcard, NO_FLASHCARDS_MESSAGE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Placeholder printed in place of an answer that has not been revealed.
pub const HIDDEN_ANSWER: &str = "(hidden, flip to reveal)";

/// A deck of cards with a per-card "answer revealed" flag.
///
/// Cards start face down. Indices are 0-based; out-of-range indices are
/// ignored rather than panicking.
#[derive(Debug, Clone)]
pub struct CardDeck {
    cards: Vec<Flashcard>,
    revealed: Vec<bool>,
}

impl CardDeck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        let revealed = vec![false; cards.len()];
        Self { cards, revealed }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Flip one card. Returns the new state, or `None` for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let flag = self.revealed.get_mut(index)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn reveal_all(&mut self) {
        self.revealed.iter_mut().for_each(|r| *r = true);
    }

    pub fn hide_all(&mut self) {
        self.revealed.iter_mut().for_each(|r| *r = false);
    }

    /// Render one card for display, showing its answer only when revealed.
    pub fn render_card(&self, index: usize) -> Option<String> {
        let card = self.cards.get(index)?;
        let answer = if self.is_revealed(index) {
            card.answer()
        } else {
            HIDDEN_ANSWER
        };
        Some(format!(
            "[{}/{}] Q: {}\n      A: {}",
            index + 1,
            self.cards.len(),
            card.question(),
            answer
        ))
    }
}

/// File/stdout format for a whole deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckFormat {
    /// `Q:` / `A:` lines, one blank line between cards.
    #[default]
    Text,
    /// One `##` section per card.
    Markdown,
    /// Pretty-printed JSON array of `{question, answer}` objects.
    Json,
}

impl DeckFormat {
    /// The format named by a file's extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// Render every card, answers included.
    ///
    /// An empty deck renders as the no-flashcards message (or `[]` for JSON).
    pub fn render(&self, cards: &[Flashcard]) -> Result<String, FlashcardError> {
        if cards.is_empty() && *self != DeckFormat::Json {
            return Ok(format!("{NO_FLASHCARDS_MESSAGE}\n"));
        }
        let out = match self {
            DeckFormat::Text => cards
                .iter()
                .map(|c| format!("Q: {}\nA: {}\n", c.question(), c.answer()))
                .collect::<Vec<_>>()
                .join("\n"),
            DeckFormat::Markdown => cards
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    format!(
                        "## Card {}\n\n**Q:** {}\n\n**A:** {}\n",
                        i + 1,
                        c.question(),
                        c.answer()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            DeckFormat::Json => {
                let mut json = serde_json::to_string_pretty(cards)
                    .map_err(|e| FlashcardError::Internal(format!("deck serialization: {e}")))?;
                json.push('\n');
                json
            }
        };
        Ok(out)
    }
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeckFormat::Text => "text",
            DeckFormat::Markdown => "markdown",
            DeckFormat::Json => "json",
        })
    }
}

impl FromStr for DeckFormat {
    type Err = FlashcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(DeckFormat::Text),
            "markdown" | "md" => Ok(DeckFormat::Markdown),
            "json" => Ok(DeckFormat::Json),
            other => Err(FlashcardError::InvalidConfig(format!(
                "Unknown deck format '{other}' (expected text, markdown or json)"
            ))),
        }
    }
}
