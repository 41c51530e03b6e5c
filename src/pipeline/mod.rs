//! Pipeline stages for text-to-flashcard generation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the orchestrator in [`crate::generate`] stays thin.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ chunk ──▶ llm ──▶ parse ──▶ dedupe
//! (path/URL)  (pdf text)  (paragraphs) (Gemini) (3 tiers)  (ignore case)
//!                                            │
//!                                          repair
//! ```
//!
//! 1. [`input`]   load a local path or download a URL, check the `%PDF` magic
//! 2. [`extract`] pull page text on the blocking pool; pages joined by a blank line
//! 3. [`chunk`]   greedy paragraph packing up to `max_chunk_chars`
//! 4. [`llm`]     one generation request per chunk; the only stage with network I/O
//! 5. [`parse`]   strict, isolated-array and per-object recovery of the reply
//! 6. [`repair`]  ordered text passes that fix common malformed-JSON damage
//! 7. [`dedupe`]  drop repeated (question, answer) pairs, keeping the first

pub mod chunk;
pub mod dedupe;
pub mod extract;
pub mod input;
pub mod llm;
pub mod parse;
pub mod repair;
