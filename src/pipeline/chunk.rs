//! Paragraph-aware chunking of source text.
//!
//! Text is split on blank lines and the paragraphs are packed greedily into
//! chunks of at most `max_chars` characters, so each generation request sees
//! whole paragraphs. A paragraph longer than `max_chars` is never cut; it
//! becomes a chunk of its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Separator placed between paragraphs inside a chunk.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

static RE_BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Trimmed, non-empty paragraphs of `text`, in order.
pub fn paragraphs(text: &str) -> Vec<&str> {
    RE_BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// The paragraph-normalised form of `text`.
///
/// `chunk_text(text, n).join("\n\n")` equals this for every `n`.
pub fn normalize_paragraphs(text: &str) -> String {
    paragraphs(text).join(PARAGRAPH_SEPARATOR)
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Lengths are counted in `char`s. Chunks keep source order and are never
/// empty.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let sep_len = PARAGRAPH_SEPARATOR.chars().count();
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in paragraphs(text) {
        let para_len = para.chars().count();

        if current.is_empty() {
            current.push_str(para);
            current_len = para_len;
            continue;
        }

        if current_len + sep_len + para_len <= max_chars {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(para);
            current_len += sep_len + para_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(para);
            current_len = para_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
