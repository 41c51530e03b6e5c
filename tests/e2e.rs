//! End-to-end tests against the live Gemini API.
//!
//! They are gated behind the `E2E_ENABLED` environment variable (and need
//! `GEMINI_API_KEY`) so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 GEMINI_API_KEY=... cargo test --test e2e -- --nocapture
//!
//! PDF tests additionally look for sample files in `./test_cases/` and skip
//! when they are missing.

use edgequake_flashcards::{
    generate_from_pdf, generate_from_text, generate_sync, Credential, Difficulty,
    GenerationConfig, GenerationInput, GenerationProgressCallback, NoopProgressCallback,
    ProgressCallback,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

const PHOTOSYNTHESIS: &str = "Photosynthesis is the process by which green plants, algae and \
some bacteria convert light energy into chemical energy. It takes place mainly in the \
chloroplasts of leaf cells, which contain the pigment chlorophyll.

During the light-dependent reactions, water molecules are split, releasing oxygen as a \
by-product and producing ATP and NADPH. The Calvin cycle then uses ATP and NADPH to fix \
carbon dioxide into glucose.";

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_ENABLED and GEMINI_API_KEY are both set.
macro_rules! e2e_credential_or_skip {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match std::env::var("GEMINI_API_KEY")
            .ok()
            .and_then(|k| Credential::new(k).ok())
        {
            Some(c) => c,
            None => {
                println!("SKIP — GEMINI_API_KEY is not set");
                return;
            }
        }
    }};
}

fn live_config(credential: Credential, difficulty: Difficulty) -> GenerationConfig {
    GenerationConfig::builder()
        .credential(credential)
        .difficulty(difficulty)
        .build()
        .unwrap()
}

// ── Callback type checks (no network) ───────────────────────────────────────

#[test]
fn test_noop_callback_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoopProgressCallback>();
    assert_send_sync::<GenerationConfig>();

    let cb: ProgressCallback = Arc::new(NoopProgressCallback);
    cb.on_generation_start(3);
    cb.on_chunk_complete(1, 3, 4);
}

#[tokio::test]
async fn test_callback_send_in_tokio_spawn() {
    struct Counter(AtomicUsize);
    impl GenerationProgressCallback for Counter {
        fn on_chunk_start(&self, _chunk_num: usize, _total: usize) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let cb: ProgressCallback = counter.clone();
    tokio::spawn(async move { cb.on_chunk_start(1, 1) })
        .await
        .unwrap();
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

// ── Live generation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_from_text_live() {
    let credential = e2e_credential_or_skip!();
    let output = generate_from_text(PHOTOSYNTHESIS, &live_config(credential, Difficulty::Normal))
        .await
        .expect("generation should succeed");

    println!("{}", output.summary());
    for (n, e) in output.chunk_errors() {
        println!("  chunk {n} failed: {e}");
    }
    assert_eq!(output.stats.failed_chunks, 0);
    assert!(!output.is_empty(), "expected at least one flashcard");
    for card in &output.cards {
        assert!(!card.question().is_empty());
        assert!(!card.answer().is_empty());
        println!("Q: {}\nA: {}\n", card.question(), card.answer());
    }
}

#[tokio::test]
async fn test_generate_hard_difficulty_live() {
    let credential = e2e_credential_or_skip!();
    let output = generate_from_text(PHOTOSYNTHESIS, &live_config(credential, Difficulty::Hard))
        .await
        .expect("generation should succeed");
    assert!(output.stats.total_chunks >= 1);
    println!("hard: {} cards", output.cards.len());
}

#[tokio::test]
async fn test_generate_from_pdf_live() {
    let credential = e2e_credential_or_skip!();
    let path = test_cases_dir().join("sample.pdf");
    if !path.exists() {
        println!("SKIP — test file not found: {}", path.display());
        return;
    }

    let output = generate_from_pdf(
        path.to_string_lossy(),
        &live_config(credential, Difficulty::Easy),
    )
    .await
    .expect("generation should succeed");
    println!(
        "{} chars → {} chunks → {} cards",
        output.stats.source_chars, output.stats.total_chunks, output.stats.unique_cards
    );
    assert!(output.stats.source_chars > 0);
}

#[test]
fn test_generate_sync_live() {
    let credential = e2e_credential_or_skip!();
    let output = generate_sync(
        GenerationInput::from_text(PHOTOSYNTHESIS),
        &live_config(credential, Difficulty::Normal),
    )
    .expect("generation should succeed");
    assert!(output.stats.total_chunks >= 1);
}
