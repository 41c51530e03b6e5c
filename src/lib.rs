//! # edgequake-flashcards
//!
//! Turn study material (a PDF or pasted text) into question-and-answer
//! flashcards using Google Gemini.
//!
//! ## Why this crate?
//!
//! Models asked for JSON do not always return valid JSON. This crate keeps
//! every request small (paragraph-aligned chunks of about 2000 characters),
//! constrains the reply with a response schema, and still recovers cards from
//! malformed replies through a three-tier parser. One bad chunk never costs
//! the rest of the deck.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / text
//!  │
//!  ├─ 1. Input    load local file or download from URL (PDF only)
//!  ├─ 2. Extract  per-page text via pdf-extract (spawn_blocking)
//!  ├─ 3. Chunk    greedy paragraph packing up to max_chunk_chars
//!  ├─ 4. Request  one Gemini generateContent call per chunk, no retries
//!  ├─ 5. Parse    strict → isolated array → per-object recovery
//!  ├─ 6. Dedupe   case-insensitive on (question, answer)
//!  └─ 7. Output   cards + per-chunk results + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_flashcards::{generate_from_text, Credential, Difficulty, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GenerationConfig::builder()
//!         .credential(Credential::new(std::env::var("GEMINI_API_KEY")?)?)
//!         .difficulty(Difficulty::Hard)
//!         .build()?;
//!     let notes = std::fs::read_to_string("notes.txt")?;
//!     let output = generate_from_text(notes, &config).await?;
//!     println!("{}", output.summary());
//!     for card in &output.cards {
//!         println!("Q: {}\nA: {}\n", card.question(), card.answer());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2cards` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-flashcards = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credential;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Difficulty, GenerationConfig, GenerationConfigBuilder};
pub use credential::{Credential, CredentialStore, SessionCredentials};
pub use error::{ChunkError, FlashcardError};
pub use generate::{
    generate, generate_from_bytes, generate_from_pdf, generate_from_text, generate_sync,
    generate_to_file, Document, GenerationInput,
};
pub use output::{ChunkResult, Flashcard, GenerationOutput, GenerationStats, NO_FLASHCARDS_MESSAGE};
pub use pipeline::chunk::chunk_text;
pub use pipeline::dedupe::dedupe;
pub use pipeline::extract::extract_pdf_text;
pub use pipeline::llm::{CardGenerator, GeminiClient, GenerationRequest};
pub use pipeline::parse::{parse_flashcards, parse_response, ParseTier, ParsedResponse};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::build_prompt;
pub use render::{CardDeck, DeckFormat};
