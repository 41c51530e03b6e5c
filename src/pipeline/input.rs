//! Input resolution: load a user-supplied PDF path or URL into memory.
//!
//! The extractor works on bytes, so both sources end up as a
//! [`LoadedDocument`]. The `%PDF` magic is checked here so callers get a
//! clear error instead of an opaque decoder failure.

use crate::error::FlashcardError;
use std::path::PathBuf;
use tracing::{debug, info};

/// A PDF payload together with a human-readable origin for error messages.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// File path or URL the bytes came from.
    pub origin: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a local path or HTTP/HTTPS URL.
pub async fn load_document(input: &str, timeout_secs: u64) -> Result<LoadedDocument, FlashcardError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FlashcardError::InvalidInput {
            input: input.to_string(),
        });
    }
    let doc = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    check_pdf_magic(&doc.origin, &doc.bytes)?;
    Ok(doc)
}

/// Reject payloads that do not start with `%PDF`.
pub fn check_pdf_magic(origin: &str, bytes: &[u8]) -> Result<(), FlashcardError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(FlashcardError::NotAPdf {
            origin: origin.to_string(),
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

async fn read_local(path_str: &str) -> Result<LoadedDocument, FlashcardError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(FlashcardError::PermissionDenied { path });
        }
        Err(_) => return Err(FlashcardError::FileNotFound { path }),
    };

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(LoadedDocument {
        origin: path.display().to_string(),
        bytes,
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<LoadedDocument, FlashcardError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FlashcardError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            FlashcardError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FlashcardError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(LoadedDocument {
        origin: url.to_string(),
        bytes: bytes.to_vec(),
    })
}
