//! Model interaction: send one chunk's prompt and turn the reply into cards.
//!
//! The remote call sits behind the [`CardGenerator`] trait so the orchestrator
//! can be driven by the built-in [`GeminiClient`], a proxy, or a scripted
//! generator in tests. Prompt wording lives in [`crate::prompts`].
//!
//! ## Failure classes
//!
//! A non-success reply is classified into a [`ChunkError`] (auth, rate limit,
//! server, blocked, empty, transport). Requests are not retried: the chunk
//! simply contributes no cards and the run continues.

use crate::config::GenerationConfig;
use crate::credential::Credential;
use crate::error::{ChunkError, FlashcardError};
use crate::output::ChunkResult;
use crate::pipeline::parse::parse_response;
use crate::prompts::{build_prompt, response_schema};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest slice of an error body echoed back to the user.
const ERROR_DETAIL_CHARS: usize = 200;

/// One generation request: the prompt plus the schema the reply should follow.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Value,
}

/// Anything that can turn a prompt into raw model text.
///
/// Implementations return the model's text verbatim; parsing happens in
/// [`crate::pipeline::parse`].
pub trait CardGenerator: Send + Sync {
    fn generate<'a>(&'a self, request: &'a GenerationRequest)
        -> BoxFuture<'a, Result<String, ChunkError>>;
}

/// Process a single chunk: build the prompt, call the generator, parse.
///
/// Always returns a `ChunkResult`; a failed request is recorded in
/// `result.error` and yields no cards.
pub async fn process_chunk(
    generator: &Arc<dyn CardGenerator>,
    chunk_num: usize,
    chunk: &str,
    config: &GenerationConfig,
) -> ChunkResult {
    let start = Instant::now();
    let char_count = chunk.chars().count();
    let request = GenerationRequest {
        prompt: build_prompt(chunk, config.difficulty),
        schema: response_schema(),
    };
    debug!(
        "Chunk {}: {} chars, {} difficulty",
        chunk_num, char_count, config.difficulty
    );

    match generator.generate(&request).await {
        Ok(raw) => {
            let parsed = parse_response(&raw);
            if parsed.cards.is_empty() {
                warn!(
                    "Chunk {}: no flashcards could be parsed from a {}-char response",
                    chunk_num,
                    raw.len()
                );
            } else {
                debug!(
                    "Chunk {}: {} cards via {:?} tier",
                    chunk_num,
                    parsed.cards.len(),
                    parsed.tier
                );
            }
            ChunkResult {
                chunk_num,
                char_count,
                cards: parsed.cards,
                tier: parsed.tier,
                duration_ms: start.elapsed().as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            warn!("Chunk {}: request failed ({}): {}", chunk_num, e.kind(), e);
            ChunkResult {
                chunk_num,
                char_count,
                cards: Vec::new(),
                tier: None,
                duration_ms: start.elapsed().as_millis() as u64,
                error: Some(e),
            }
        }
    }
}

// ── Gemini client ────────────────────────────────────────────────────────

/// `generateContent` client for the Google Gemini API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Credential,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// Build a client from the run configuration.
    pub fn from_config(
        config: &GenerationConfig,
        credential: Credential,
    ) -> Result<Self, FlashcardError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FlashcardError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.api_base_url, config.model
            ),
            credential,
            temperature: config.temperature,
        })
    }

    /// The full `generateContent` URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn payload(&self, request: &GenerationRequest) -> Value {
        let mut generation_config = json!({
            "responseMimeType": "application/json",
            "responseSchema": request.schema,
        });
        if let Some(t) = self.temperature {
            generation_config["temperature"] = json!(t);
        }
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": generation_config,
        })
    }

    async fn call(&self, request: &GenerationRequest) -> Result<String, ChunkError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", self.credential.expose())
            .json(&self.payload(request))
            .send()
            .await
            .map_err(|e| ChunkError::Transport {
                detail: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        debug!("Gemini responded with HTTP {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(|e| ChunkError::Transport {
                detail: format!("undecodable response body: {e}"),
            })?;
        extract_candidate_text(body)
    }
}

impl CardGenerator for GeminiClient {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> BoxFuture<'a, Result<String, ChunkError>> {
        Box::pin(self.call(request))
    }
}

/// Map a non-success HTTP status to its failure class.
pub fn classify_status(status: u16, body: &str) -> ChunkError {
    let detail = truncate_detail(body);
    match status {
        400 | 401 | 403 => ChunkError::Auth { status, detail },
        429 => ChunkError::RateLimited { status },
        _ => ChunkError::Server { status, detail },
    }
}

fn truncate_detail(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= ERROR_DETAIL_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(ERROR_DETAIL_CHARS).collect();
        format!("{cut}…")
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

/// The parts of a `generateContent` reply the pipeline reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Pull the first candidate's first text part, or classify why there is none.
pub fn extract_candidate_text(response: GenerateContentResponse) -> Result<String, ChunkError> {
    let first = response.candidates.into_iter().next();
    let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());

    let text = first
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text);
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChunkError::Blocked { reason });
    }
    match finish_reason.as_deref() {
        Some(reason @ ("SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII")) => {
            Err(ChunkError::Blocked {
                reason: reason.to_string(),
            })
        }
        _ => Err(ChunkError::EmptyContent),
    }
}
