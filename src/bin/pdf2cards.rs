//! CLI binary for edgequake-flashcards.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints the deck.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_flashcards::{
    generate, generate_to_file, CardDeck, Credential, CredentialStore, DeckFormat, Difficulty,
    GenerationConfig, GenerationInput, GenerationOutput, GenerationProgressCallback,
    ProgressCallback, SessionCredentials,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per chunk.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Per-chunk wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    cards: AtomicUsize,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner only until `on_generation_start` tells us the chunk count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER_TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            cards: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER_TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Generating");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, chunk_num: usize) -> f64 {
        self.start_times
            .lock()
            .map(|mut times| times.remove(&chunk_num))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_text_ready(&self, char_count: usize) {
        self.bar.set_message(format!("{char_count} characters of text"));
    }

    fn on_generation_start(&self, total_chunks: usize) {
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating flashcards from {total_chunks} chunks…"))
        ));
    }

    fn on_chunk_start(&self, chunk_num: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(chunk_num, Instant::now());
        }
        self.bar.set_message(format!("chunk {chunk_num}"));
    }

    fn on_chunk_complete(&self, chunk_num: usize, total: usize, card_count: usize) {
        let secs = self.elapsed_secs(chunk_num);
        self.cards.fetch_add(card_count, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            chunk_num,
            total,
            dim(&format!("{card_count:>2} cards")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_error(&self, chunk_num: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(chunk_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            red("✗"),
            chunk_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_chunks: usize, unique_cards: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        let raw = self.cards.load(Ordering::SeqCst);

        if failed == 0 {
            eprintln!(
                "{} {} unique flashcards from {} chunks ({} before dedupe)",
                green("✔"),
                bold(&unique_cards.to_string()),
                total_chunks,
                raw
            );
        } else {
            eprintln!(
                "{} {} unique flashcards  ({}/{} chunks failed)",
                if failed == total_chunks {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&unique_cards.to_string()),
                red(&failed.to_string()),
                total_chunks,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Flashcards from a PDF (stdout)
  pdf2cards lecture.pdf

  # Harder questions, written to a Markdown file
  pdf2cards --difficulty hard lecture.pdf -o lecture-cards.md

  # From pasted text on stdin
  pbpaste | pdf2cards --text-file -

  # From a URL, as JSON
  pdf2cards https://arxiv.org/pdf/1706.03762 --format json

  # Study the deck in the terminal
  pdf2cards notes.pdf --interactive

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  PDF2CARDS_MODEL         Override model ID (default gemini-2.0-flash)
  PDF2CARDS_DIFFICULTY    easy, normal or hard
  RUST_LOG                Override log filter (e.g. edgequake_flashcards=debug)

SETUP:
  1. Get a key at https://aistudio.google.com/app/apikey
  2. export GEMINI_API_KEY=...
  3. pdf2cards document.pdf

  Without GEMINI_API_KEY or --api-key, the key is asked for once on the
  terminal and kept for this session only.
"#;

/// Generate study flashcards from PDFs and text using Google Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2cards",
    version,
    about = "Generate study flashcards from PDFs and text using Google Gemini",
    long_about = "Generate question-and-answer flashcards from a PDF (local file or URL) or from \
plain text. The text is split into paragraph-aligned chunks, each chunk is sent to Gemini, and \
the replies are parsed, repaired when malformed, and deduplicated into one deck.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "text_file")]
    input: Option<String>,

    /// Read plain text from this file instead of a PDF ('-' for stdin).
    #[arg(long, short = 't')]
    text_file: Option<PathBuf>,

    /// Write the deck to this file instead of stdout.
    #[arg(short, long, env = "PDF2CARDS_OUTPUT")]
    output: Option<PathBuf>,

    /// Deck format: text, markdown, json. Defaults from the output extension.
    #[arg(short, long, env = "PDF2CARDS_FORMAT")]
    format: Option<DeckFormat>,

    /// Question difficulty: easy, normal, hard.
    #[arg(short, long, env = "PDF2CARDS_DIFFICULTY", default_value = "normal")]
    difficulty: Difficulty,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "PDF2CARDS_MODEL", default_value = "gemini-2.0-flash")]
    model: String,

    /// Gemini API root (for proxies).
    #[arg(long, env = "PDF2CARDS_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Maximum characters per chunk.
    #[arg(long, env = "PDF2CARDS_MAX_CHUNK_CHARS", default_value_t = 2000)]
    max_chunk_chars: usize,

    /// Number of chunk requests in flight at once.
    #[arg(short, long, env = "PDF2CARDS_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDF2CARDS_TEMPERATURE")]
    temperature: Option<f32>,

    /// Print the full run (cards, per-chunk results, stats) as JSON to stdout.
    #[arg(long, env = "PDF2CARDS_JSON", conflicts_with_all = ["output", "format"])]
    json: bool,

    /// Flip through the deck in the terminal after generation.
    #[arg(short, long)]
    interactive: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2CARDS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2CARDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2CARDS_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2CARDS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-chunk Gemini request timeout in seconds.
    #[arg(long, env = "PDF2CARDS_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Credential ───────────────────────────────────────────────────────
    let session = SessionCredentials::new();
    match cli.api_key.as_deref() {
        Some(key) => session.set(Credential::new(key).context("Invalid --api-key")?),
        None => {
            if let Some(key) = prompt_for_key()? {
                session.set(key);
            }
        }
    }

    // ── Input ────────────────────────────────────────────────────────────
    let input = match (&cli.input, &cli.text_file) {
        (Some(location), _) => GenerationInput::from_pdf(location.clone()),
        (None, Some(path)) => GenerationInput::from_text(read_text(path)?),
        (None, None) => GenerationInput::default(),
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &session, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = if let Some(ref output_path) = cli.output {
        let format = cli
            .format
            .or_else(|| DeckFormat::from_path(output_path))
            .unwrap_or_default();
        let output = generate_to_file(input, output_path, format, &config)
            .await
            .context("Flashcard generation failed")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} cards  {}ms  →  {}",
                if output.stats.failed_chunks == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                output.stats.unique_cards,
                output.stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        output
    } else {
        let output = generate(input, &config)
            .await
            .context("Flashcard generation failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else if !cli.interactive {
            let rendered = cli.format.unwrap_or_default().render(&output.cards)?;
            io::stdout()
                .lock()
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
        }
        output
    };

    if !cli.quiet && !cli.json {
        print_summary(&output, show_progress);
    }

    if cli.interactive && !output.is_empty() {
        study(CardDeck::new(output.cards)).context("Interactive session failed")?;
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(
    cli: &Cli,
    session: &dyn CredentialStore,
    progress: Option<ProgressCallback>,
) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .difficulty(cli.difficulty)
        .model(cli.model.clone())
        .max_chunk_chars(cli.max_chunk_chars)
        .concurrency(cli.concurrency)
        .credential_store(session)
        .download_timeout_secs(cli.download_timeout)
        .request_timeout_secs(cli.api_timeout);

    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Ask for the key on the terminal. `None` when stdin is not interactive.
fn prompt_for_key() -> Result<Option<Credential>> {
    if !io::stdin().is_terminal() {
        return Ok(None);
    }
    eprint!("{} ", bold("Enter your Gemini API key:"));
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key")?;
    Ok(Some(Credential::new(&line).context("Invalid API key")?))
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read text from {:?}", path))
    }
}

fn print_summary(output: &GenerationOutput, show_progress: bool) {
    if output.is_empty() {
        eprintln!("{}", cyan(&output.summary()));
    } else if !show_progress {
        eprintln!(
            "{}  {}",
            output.summary(),
            dim(&format!(
                "{} chunks, {} duplicates removed, {}ms",
                output.stats.total_chunks,
                output.stats.duplicates_removed,
                output.stats.total_duration_ms
            ))
        );
    }
    if !show_progress {
        for (chunk_num, error) in output.chunk_errors() {
            eprintln!("  {} chunk {}: {}", red("✗"), chunk_num, error);
        }
    }
}

/// Flip-card loop on the terminal.
fn study(mut deck: CardDeck) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprintln!();
        for i in 0..deck.len() {
            if let Some(card) = deck.render_card(i) {
                eprintln!("{card}");
            }
        }
        eprint!(
            "\n{} ",
            dim("[number] flip  [a] reveal all  [h] hide all  [q] quit >")
        );
        io::stderr().flush().ok();

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("Failed to read command")?;
        match line.trim() {
            "q" | "quit" => return Ok(()),
            "a" => deck.reveal_all(),
            "h" => deck.hide_all(),
            other => {
                let flipped = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| deck.toggle(idx));
                if flipped.is_none() {
                    eprintln!("{}", red(&format!("Unknown command '{other}'")));
                }
            }
        }
    }
}
