//! Case-insensitive deduplication of flashcards across chunks.

use crate::output::Flashcard;
use std::collections::HashSet;

/// Joins question and answer in the dedupe key; cannot occur in normal text.
const KEY_SEPARATOR: char = '\u{1F}';

fn dedupe_key(card: &Flashcard) -> String {
    format!(
        "{}{KEY_SEPARATOR}{}",
        card.question().trim().to_lowercase(),
        card.answer().trim().to_lowercase()
    )
}

/// Keep the first occurrence of each (question, answer) pair, ignoring case.
///
/// Input order is preserved.
pub fn dedupe(cards: Vec<Flashcard>) -> Vec<Flashcard> {
    let mut seen = HashSet::with_capacity(cards.len());
    cards
        .into_iter()
        .filter(|card| seen.insert(dedupe_key(card)))
        .collect()
}
