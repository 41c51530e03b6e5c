//! PDF text extraction.
//!
//! Uses [`pdf_extract`] to pull text page by page. The decoder is synchronous
//! and can panic on malformed input rather than returning an error, so it runs
//! on the blocking pool behind [`std::panic::catch_unwind`].

use crate::error::FlashcardError;
use crate::pipeline::input::check_pdf_magic;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Separator placed between pages; a blank line, so pages never share a paragraph.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the text of every page and join the pages with a blank line.
///
/// # Errors
/// * [`FlashcardError::NotAPdf`]: the bytes do not start with `%PDF`.
/// * [`FlashcardError::ExtractionFailed`]: the PDF could not be decoded.
/// * [`FlashcardError::EmptyDocument`]: it decoded but holds no text
///   (image-only scans, empty documents).
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, FlashcardError> {
    check_pdf_magic("<memory>", &bytes)?;
    let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
        .await
        .map_err(|e| FlashcardError::Internal(format!("extraction task failed: {e}")))??;

    debug!("Extracted {} pages", pages.len());
    let text = join_pages(&pages);
    if text.is_empty() {
        return Err(FlashcardError::EmptyDocument);
    }
    Ok(text)
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, FlashcardError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(FlashcardError::ExtractionFailed {
            detail: e.to_string(),
        }),
        Err(_) => {
            warn!("pdf-extract panicked on malformed input");
            Err(FlashcardError::ExtractionFailed {
                detail: "the document is malformed".into(),
            })
        }
    }
}

/// Clean every page and join the non-empty ones with [`PAGE_SEPARATOR`].
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| clean_page(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// Trim line ends, drop NULs and BOMs, keep at most one blank line in a row.
fn clean_page(raw: &str) -> String {
    let raw = raw.replace(['\u{0}', '\u{FEFF}'], "");
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0usize;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }
    out.trim().to_string()
}
