//! Progress-callback trait for per-chunk generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through each chunk.
//!
//! Callbacks only observe the run. Final cards are still delivered once, in
//! [`crate::output::GenerationOutput`], after every chunk has finished.
//!
//! # Example
//!
//! ```rust
//! use edgequake_flashcards::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     cards: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for CountingCallback {
//!     fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize, card_count: usize) {
//!         let total = self.cards.fetch_add(card_count, Ordering::SeqCst) + card_count;
//!         eprintln!("Chunk {chunk_num}/{total_chunks}: {total} cards so far");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { cards: AtomicUsize::new(0) });
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each chunk.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the chunk
/// events may fire from several tasks at once. All methods default to no-ops.
pub trait GenerationProgressCallback: Send + Sync {
    /// Text has been extracted; about to report its size.
    fn on_text_ready(&self, char_count: usize) {
        let _ = char_count;
    }

    /// Called once after chunking, before the first request.
    fn on_generation_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before the request for a chunk is sent (1-indexed).
    fn on_chunk_start(&self, chunk_num: usize, total_chunks: usize) {
        let _ = (chunk_num, total_chunks);
    }

    /// Called when a chunk's response has been parsed.
    ///
    /// `card_count` may be zero when the response could not be salvaged.
    fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize, card_count: usize) {
        let _ = (chunk_num, total_chunks, card_count);
    }

    /// Called when a chunk's request failed; the chunk contributes no cards.
    fn on_chunk_error(&self, chunk_num: usize, total_chunks: usize, error: &str) {
        let _ = (chunk_num, total_chunks, error);
    }

    /// Called once after every chunk was attempted and cards were deduplicated.
    fn on_generation_complete(&self, total_chunks: usize, unique_cards: usize) {
        let _ = (total_chunks, unique_cards);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
