//! Flashcard generation entry points.
//!
//! [`generate`] drives the whole pipeline: check preconditions, pick the
//! generator, extract, chunk, one request per chunk, parse, dedupe. The
//! `generate_from_*` helpers build the [`GenerationInput`] for the common
//! cases, and [`generate_to_file`] writes the deck in a [`DeckFormat`].

use crate::config::GenerationConfig;
use crate::error::FlashcardError;
use crate::output::{ChunkResult, Flashcard, GenerationOutput, GenerationStats};
use crate::pipeline::llm::{self, CardGenerator, GeminiClient};
use crate::pipeline::{chunk, dedupe, extract, input};
use crate::render::DeckFormat;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A PDF to take the text from.
#[derive(Debug, Clone)]
pub enum Document {
    /// Local file path or HTTP/HTTPS URL.
    Location(String),
    /// PDF bytes already in memory.
    Bytes(Vec<u8>),
}

/// What a run works on: pasted text, a document, or both.
///
/// When both are present the document wins and the text is ignored.
#[derive(Debug, Clone, Default)]
pub struct GenerationInput {
    pub text: Option<String>,
    pub document: Option<Document>,
}

impl GenerationInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            document: None,
        }
    }

    pub fn from_pdf(location: impl Into<String>) -> Self {
        Self {
            text: None,
            document: Some(Document::Location(location.into())),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            text: None,
            document: Some(Document::Bytes(bytes)),
        }
    }

    fn is_present(&self) -> bool {
        self.document.is_some()
            || self
                .text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Generate flashcards from pasted text and/or a PDF.
///
/// # Returns
/// `Ok(GenerationOutput)` whenever every chunk was attempted, even if some
/// chunk requests failed (see `output.stats.failed_chunks`) or no card could
/// be parsed at all (`output.is_empty()`).
///
/// # Errors
/// Returns `Err(FlashcardError)` only before any request is issued:
/// - no input, or the text is shorter than `config.min_text_chars`
/// - no credential and no injected generator
/// - the document cannot be read or yields no text
pub async fn generate(
    input: GenerationInput,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    let total_start = Instant::now();

    // ── Step 1: Preconditions ────────────────────────────────────────────
    if !input.is_present() {
        return Err(FlashcardError::NoInput);
    }

    // ── Step 2: Resolve generator ────────────────────────────────────────
    let generator = resolve_generator(config)?;

    // ── Step 3: Source text ──────────────────────────────────────────────
    let extract_start = Instant::now();
    let text = match input.document {
        Some(document) => {
            if input.text.is_some() {
                debug!("Both a document and pasted text were supplied; using the document");
            }
            document_text(document, config).await?
        }
        None => input.text.unwrap_or_default(),
    };
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Step 4: Length gate ──────────────────────────────────────────────
    let text = text.trim();
    let source_chars = text.chars().count();
    if source_chars < config.min_text_chars {
        return Err(FlashcardError::TextTooShort {
            chars: source_chars,
            min: config.min_text_chars,
        });
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_text_ready(source_chars);
    }

    // ── Step 5: Chunk ────────────────────────────────────────────────────
    let chunks = chunk::chunk_text(text, config.max_chunk_chars);
    info!(
        "Generating flashcards: {} chars in {} chunks ({} difficulty)",
        source_chars,
        chunks.len(),
        config.difficulty
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(chunks.len());
    }

    // ── Step 6: One request per chunk ────────────────────────────────────
    let llm_start = Instant::now();
    let results = if config.concurrency <= 1 {
        process_sequential(&generator, &chunks, config).await
    } else {
        process_concurrent(&generator, &chunks, config).await
    };
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 7: Dedupe ───────────────────────────────────────────────────
    let raw_cards: Vec<Flashcard> = results.iter().flat_map(|r| r.cards.clone()).collect();
    let raw_count = raw_cards.len();
    let cards = dedupe::dedupe(raw_cards);

    // ── Step 8: Stats ────────────────────────────────────────────────────
    let failed = results.iter().filter(|r| r.is_failed()).count();
    let stats = GenerationStats {
        source_chars,
        total_chunks: results.len(),
        succeeded_chunks: results.len() - failed,
        failed_chunks: failed,
        raw_cards: raw_count,
        unique_cards: cards.len(),
        duplicates_removed: raw_count - cards.len(),
        extract_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if cards.is_empty() {
        warn!("No flashcards could be generated from {} chunks", stats.total_chunks);
    }
    info!(
        "Generation complete: {} unique cards ({} duplicates removed), {}/{} chunks ok, {}ms total",
        stats.unique_cards,
        stats.duplicates_removed,
        stats.succeeded_chunks,
        stats.total_chunks,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(stats.total_chunks, stats.unique_cards);
    }

    Ok(GenerationOutput {
        cards,
        chunks: results,
        stats,
    })
}

/// Generate flashcards from pasted text.
pub async fn generate_from_text(
    text: impl Into<String>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    generate(GenerationInput::from_text(text), config).await
}

/// Generate flashcards from a PDF file path or HTTP/HTTPS URL.
///
/// # Example
/// ```rust,no_run
/// use edgequake_flashcards::{generate_from_pdf, Credential, GenerationConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GenerationConfig::builder()
///     .credential(Credential::new(std::env::var("GEMINI_API_KEY")?)?)
///     .build()?;
/// let output = generate_from_pdf("lecture.pdf", &config).await?;
/// for card in &output.cards {
///     println!("Q: {}\nA: {}\n", card.question(), card.answer());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate_from_pdf(
    location: impl Into<String>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    generate(GenerationInput::from_pdf(location), config).await
}

/// Generate flashcards from PDF bytes already in memory.
pub async fn generate_from_bytes(
    bytes: Vec<u8>,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    generate(GenerationInput::from_bytes(bytes), config).await
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input: GenerationInput,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlashcardError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input, config))
}

/// Generate a deck and write it to `output_path` in `format`.
///
/// Uses atomic write (temp file + rename) to prevent partial files. An empty
/// deck is still written.
pub async fn generate_to_file(
    input: GenerationInput,
    output_path: impl AsRef<Path>,
    format: DeckFormat,
    config: &GenerationConfig,
) -> Result<GenerationOutput, FlashcardError> {
    let output = generate(input, config).await?;
    let rendered = format.render(&output.cards)?;
    write_atomic(output_path.as_ref(), &rendered).await?;
    Ok(output)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Pick the generator: an injected one first, else Gemini with the credential.
fn resolve_generator(config: &GenerationConfig) -> Result<Arc<dyn CardGenerator>, FlashcardError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }
    let credential = config
        .credential
        .clone()
        .ok_or(FlashcardError::MissingCredential)?;
    let client = GeminiClient::from_config(config, credential)?;
    debug!("Using Gemini endpoint {}", client.endpoint());
    Ok(Arc::new(client))
}

async fn document_text(
    document: Document,
    config: &GenerationConfig,
) -> Result<String, FlashcardError> {
    let bytes = match document {
        Document::Location(location) => {
            input::load_document(&location, config.download_timeout_secs)
                .await?
                .bytes
        }
        Document::Bytes(bytes) => bytes,
    };
    let text = extract::extract_pdf_text(bytes).await?;
    info!("Extracted {} chars of text from PDF", text.chars().count());
    Ok(text)
}

fn report(config: &GenerationConfig, result: &ChunkResult, total_chunks: usize) {
    if let Some(ref cb) = config.progress_callback {
        match &result.error {
            None => cb.on_chunk_complete(result.chunk_num, total_chunks, result.cards.len()),
            Some(e) => cb.on_chunk_error(result.chunk_num, total_chunks, &e.to_string()),
        }
    }
}

/// Process chunks one at a time, in order (concurrency = 1).
async fn process_sequential(
    generator: &Arc<dyn CardGenerator>,
    chunks: &[String],
    config: &GenerationConfig,
) -> Vec<ChunkResult> {
    let total_chunks = chunks.len();
    let mut results = Vec::with_capacity(total_chunks);

    for (idx, chunk) in chunks.iter().enumerate() {
        let chunk_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_chunk_start(chunk_num, total_chunks);
        }
        let result = llm::process_chunk(generator, chunk_num, chunk, config).await;
        report(config, &result, total_chunks);
        results.push(result);
    }

    results
}

/// Process up to `config.concurrency` chunks at once.
///
/// `buffered` yields results in input order, so the card order seen by
/// dedupe is the same as in sequential mode.
async fn process_concurrent(
    generator: &Arc<dyn CardGenerator>,
    chunks: &[String],
    config: &GenerationConfig,
) -> Vec<ChunkResult> {
    let total_chunks = chunks.len();
    stream::iter(chunks.iter().enumerate().map(|(idx, chunk)| {
        let generator = Arc::clone(generator);
        let chunk_num = idx + 1;
        async move {
            if let Some(ref cb) = config.progress_callback {
                cb.on_chunk_start(chunk_num, total_chunks);
            }
            let result = llm::process_chunk(&generator, chunk_num, chunk, config).await;
            report(config, &result, total_chunks);
            result
        }
    }))
    .buffered(config.concurrency)
    .collect()
    .await
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), FlashcardError> {
    let write_err = |e| FlashcardError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, contents).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            warn!("Could not remove {}: {}", tmp.display(), cleanup);
        }
        return Err(write_err(e));
    }
    debug!("Wrote deck to {}", path.display());
    Ok(())
}
