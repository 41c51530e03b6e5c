//! Configuration types for flashcard generation.
//!
//! All run behaviour is controlled through [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. The credential travels inside the config
//! rather than living in a global, so two runs with different keys can share
//! a process (and a test binary) without seeing each other's state.

use crate::credential::{Credential, CredentialStore};
use crate::error::FlashcardError;
use crate::pipeline::llm::CardGenerator;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default upper bound on chunk size, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 2000;

/// Texts shorter than this (after trimming) are rejected before any request.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini API root.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for a flashcard generation run.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_flashcards::{Credential, Difficulty, GenerationConfig};
///
/// let config = GenerationConfig::builder()
///     .difficulty(Difficulty::Hard)
///     .credential(Credential::new("my-key").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chunk_chars, 2000);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Target maximum chunk size in characters. Default: 2000.
    ///
    /// A single paragraph longer than this is still sent whole.
    pub max_chunk_chars: usize,

    /// Minimum trimmed text length accepted by the pipeline. Default: 50.
    pub min_text_chars: usize,

    /// Question difficulty. Default: [`Difficulty::Normal`].
    pub difficulty: Difficulty,

    /// Gemini model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// API root, without a trailing slash. Overridable for proxies and tests.
    pub api_base_url: String,

    /// Session credential used by the built-in Gemini client.
    pub credential: Option<Credential>,

    /// Pre-constructed generator. Takes precedence over `credential`.
    pub generator: Option<Arc<dyn CardGenerator>>,

    /// Chunk requests in flight at once. Default: 1 (strictly sequential).
    ///
    /// Results are always collected in chunk order regardless of this value.
    pub concurrency: usize,

    /// Sampling temperature forwarded to the model, if set.
    pub temperature: Option<f32>,

    /// HTTP timeout for a single generation request, in seconds. Default: 120.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback, invoked once per chunk.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            difficulty: Difficulty::default(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credential: None,
            generator: None,
            concurrency: 1,
            temperature: None,
            request_timeout_secs: 120,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("max_chunk_chars", &self.max_chunk_chars)
            .field("min_text_chars", &self.min_text_chars)
            .field("difficulty", &self.difficulty)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("credential", &self.credential)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn CardGenerator>"))
            .field("concurrency", &self.concurrency)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn max_chunk_chars(mut self, n: usize) -> Self {
        self.config.max_chunk_chars = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.config.difficulty = difficulty;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.config.credential = Some(credential);
        self
    }

    /// Copy whatever credential the session store currently holds.
    pub fn credential_store(mut self, store: &dyn CredentialStore) -> Self {
        self.config.credential = store.get();
        self
    }

    pub fn generator(mut self, generator: Arc<dyn CardGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, FlashcardError> {
        let c = &self.config;
        if c.max_chunk_chars == 0 {
            return Err(FlashcardError::InvalidConfig(
                "max_chunk_chars must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(FlashcardError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(FlashcardError::InvalidConfig("Model must not be empty".into()));
        }
        if !c.api_base_url.starts_with("http://") && !c.api_base_url.starts_with("https://") {
            return Err(FlashcardError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How demanding the generated questions should be.
///
/// Only the wording of the generation instruction changes; chunking and
/// parsing are identical for every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Simple recall questions.
    Easy,
    /// Questions requiring a slightly deeper understanding. (default)
    #[default]
    Normal,
    /// Critical-thinking and synthesis questions.
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = FlashcardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(FlashcardError::InvalidConfig(format!(
                "Unknown difficulty '{other}' (expected easy, normal or hard)"
            ))),
        }
    }
}
