//! Error types for the edgequake-flashcards library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlashcardError`]: **Fatal**: the run cannot proceed at all (no input,
//!   text too short, missing credential, unreadable PDF). Returned as
//!   `Err(FlashcardError)` from the top-level `generate*` functions before any
//!   generation request is issued.
//!
//! * [`ChunkError`]: **Non-fatal**: a single chunk's request failed (bad key,
//!   rate limit, blocked content, …) but every other chunk is still attempted.
//!   Stored inside [`crate::output::ChunkResult`]; the chunk contributes zero
//!   flashcards.
//!
//! A response that cannot be parsed is neither: the parser degrades to an
//! empty card list instead of failing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-flashcards library.
///
/// Chunk-level failures use [`ChunkError`] and are stored in
/// [`crate::output::ChunkResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FlashcardError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// Neither a document nor pasted text was supplied.
    #[error("No input: upload a PDF file or paste text to generate flashcards.")]
    NoInput,

    /// The (extracted or pasted) text is too short to be worth a request.
    #[error(
        "Text is too short ({chars} characters).\n\
Provide at least {min} characters to generate meaningful flashcards."
    )]
    TextTooShort { chars: usize, min: usize },

    /// No credential was configured for the Gemini API.
    #[error("Gemini API key not found.\nSet GEMINI_API_KEY or pass --api-key <KEY>.")]
    MissingCredential,

    /// The supplied credential is empty after trimming.
    #[error("Please enter a valid Gemini API key (got an empty value).")]
    InvalidCredential,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("Input '{origin}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { origin: String, magic: Vec<u8> },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be decoded.
    #[error(
        "Failed to extract text from PDF: {detail}\n\
Please try a different file or paste the text directly."
    )]
    ExtractionFailed { detail: String },

    /// The PDF decoded fine but contains no text (image-only or empty).
    #[error(
        "Could not extract any text from the PDF. It might be an image-only PDF or corrupted.\n\
Please try pasting the text instead."
    )]
    EmptyDocument,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output deck file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single chunk's generation request.
///
/// Every variant is recovered the same way (the chunk contributes no cards and
/// the pipeline moves on); they differ only in the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ChunkError {
    /// HTTP 400/401/403: the key is wrong, expired, or lacks model access.
    #[error(
        "API error ({status}): please check your Gemini API key and ensure it's valid \
and has access to the model. Details: {detail}"
    )]
    Auth { status: u16, detail: String },

    /// HTTP 429.
    #[error(
        "Rate limit exceeded ({status}): too many requests were sent. \
Please wait a moment and try again."
    )]
    RateLimited { status: u16 },

    /// Any other non-success HTTP status.
    #[error("Server error ({status}): an unexpected error occurred. Details: {detail}")]
    Server { status: u16, detail: String },

    /// The prompt or the response was blocked by the safety filter.
    #[error(
        "Content blocked: the prompt or response was blocked for safety reasons \
(reason: {reason}). Please try different text."
    )]
    Blocked { reason: String },

    /// The API answered successfully but returned no candidate text.
    #[error(
        "Gemini did not return any content. The text chunk may be too short or unsuitable, \
or the model had an internal issue."
    )]
    EmptyContent,

    /// The request never produced a usable HTTP response.
    #[error("An error occurred during the API call: {detail}")]
    Transport { detail: String },
}

impl ChunkError {
    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ChunkError::Auth { .. } => "auth",
            ChunkError::RateLimited { .. } => "rate_limited",
            ChunkError::Server { .. } => "server",
            ChunkError::Blocked { .. } => "blocked",
            ChunkError::EmptyContent => "empty_content",
            ChunkError::Transport { .. } => "transport",
        }
    }
}
