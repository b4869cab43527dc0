//! CLI binary for doc2struct.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractConfig`, turns local files into encoded document references,
//! and prints results as JSON.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use doc2struct::{
    analyze_backlog, analyze_news, extract_clauses, extract_events, summarize, BacklogItem,
    DocumentReference, ExtractConfig, ExtractionProgressCallback, NewsCorpus, RetryPolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-item log
/// lines. Works correctly when items settle out of order (fan-out mode).
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<String, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:36.green/238}] {pos:>3}/{len} items  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_items: usize) {
        self.bar.set_length(total_items as u64);
    }

    fn on_item_start(&self, id: &str, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(id.to_string(), Instant::now());
        self.bar.set_message(id.to_string());
    }

    fn on_item_complete(&self, id: &str, _total: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(id)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        self.bar.println(format!(
            "  {} {:<12} {}",
            green("✓"),
            id,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, id: &str, _total: usize, error: &str) {
        self.start_times.lock().unwrap().remove(id);
        let msg = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<12} {}", red("✗"), id, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_items.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} items extracted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} items extracted  ({} fell back to placeholders)",
                red("⚠"),
                bold(&success_count.to_string()),
                total_items,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a PDF
  doc2struct summarize report.pdf

  # Extract contract clauses from a scan
  doc2struct clauses lease.png

  # Build a timeline from a plain-text document
  doc2struct events minutes.txt

  # Analyze a backlog exported as JSON ([{"id","title","description"}, ...])
  doc2struct backlog sprint.json

  # Score the built-in news corpus for a topic
  doc2struct news --topic "Meridian Robotics"

ENVIRONMENT VARIABLES:
  GENAI_API_KEY        API key for the remote inference engine
  DOC2STRUCT_MODEL     Override the engine model id
  DOC2STRUCT_ENDPOINT  Override the engine base URL (gateways, mocks)

SETUP:
  1. Set API key:  export GENAI_API_KEY=...
  2. Extract:      doc2struct summarize document.pdf
"#;

/// Extract structured data from documents using generative inference.
#[derive(Parser, Debug)]
#[command(
    name = "doc2struct",
    version,
    about = "Extract structured data from PDF, image, and text documents",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Engine model id.
    #[arg(long, global = true, env = "DOC2STRUCT_MODEL")]
    model: Option<String>,

    /// Engine base URL (self-hosted gateways, tests).
    #[arg(long, global = true, env = "DOC2STRUCT_ENDPOINT")]
    endpoint: Option<String>,

    /// Concurrent engine calls in fan-out flows.
    #[arg(short, long, global = true, env = "DOC2STRUCT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, global = true, env = "DOC2STRUCT_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max engine output tokens per call.
    #[arg(long, global = true, env = "DOC2STRUCT_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retry attempts for batch flows.
    #[arg(long, global = true, env = "DOC2STRUCT_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Per-engine-call timeout in seconds.
    #[arg(long, global = true, env = "DOC2STRUCT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "DOC2STRUCT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC2STRUCT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "DOC2STRUCT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a document (title, abstract, key points).
    Summarize { file: PathBuf },
    /// Extract notable contract clauses with risk levels.
    Clauses { file: PathBuf },
    /// Extract dated events into a chronological timeline.
    Events { file: PathBuf },
    /// Analyze a backlog (JSON array of {id, title, description}).
    Backlog { file: PathBuf },
    /// Score the built-in simulated news corpus for a topic.
    News {
        /// Topic the sentiment is judged against.
        #[arg(long, default_value = "Meridian Robotics")]
        topic: String,
    },
}

/// MIME type from the file extension; unknown extensions map to types the
/// decoder will reject with its remediation message.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("txt") | Some("text") | Some("md") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// Read a local file into an encoded document reference.
fn reference_from_file(path: &Path) -> Result<DocumentReference> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let mime = mime_for(path);
    let reference =
        DocumentReference::encoded(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)));
    Ok(match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => reference.with_file_name(name),
        None => reference,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active; the
    // bar provides all the feedback that matters interactively.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Config ───────────────────────────────────────────────────────────
    let mut builder = ExtractConfig::builder()
        .concurrency(cli.concurrency)
        .temperature(cli.temperature)
        .max_output_tokens(cli.max_tokens)
        .batch_retry(RetryPolicy {
            max_attempts: cli.max_attempts.max(1),
            base_delay_ms: RetryPolicy::batch().base_delay_ms,
        })
        .api_timeout_secs(cli.api_timeout);
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if show_progress && matches!(cli.command, Command::Backlog { .. } | Command::News { .. }) {
        builder = builder.progress_callback(CliProgressCallback::new());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Dispatch ─────────────────────────────────────────────────────────
    match cli.command {
        Command::Summarize { file } => {
            let reference = reference_from_file(&file)?;
            print_json(&summarize(&reference, &config).await?)?;
        }
        Command::Clauses { file } => {
            let reference = reference_from_file(&file)?;
            print_json(&extract_clauses(&reference, &config).await?)?;
        }
        Command::Events { file } => {
            let reference = reference_from_file(&file)?;
            print_json(&extract_events(&reference, &config).await?)?;
        }
        Command::Backlog { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            let items: Vec<BacklogItem> = serde_json::from_str(&raw)
                .context("Backlog file must be a JSON array of {id, title, description}")?;
            print_json(&analyze_backlog(&items, &config).await?)?;
        }
        Command::News { topic } => {
            let corpus = NewsCorpus::simulated();
            print_json(&analyze_news(&topic, &corpus, &config).await?)?;
        }
    }

    Ok(())
}
