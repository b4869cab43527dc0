//! # doc2struct
//!
//! Extract structured, schema-conformant data from heterogeneous documents
//! (PDF, image, plain text) using a generative inference engine.
//!
//! ## Why this crate?
//!
//! Any single extraction task is easy to prompt for. What every task shares —
//! and where things actually break — is the orchestration around an
//! inherently unreliable remote call: normalizing arbitrary input encodings,
//! enforcing the output schema, riding out transient backend failures, and
//! guaranteeing that a batch of N items always produces N results. This
//! crate is that orchestration layer; the engine itself stays behind one
//! trait.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document reference
//!  │
//!  ├─ 1. Decode     data-URI → media passthrough or decoded text
//!  ├─ 2. Shape      one content carrier + task fields → wire payload
//!  ├─ 3. Retry      bounded attempts, exponential backoff, no jitter
//!  ├─ 4. Client     one engine call, output-schema enforcement
//!  └─ 5. Batch      reconcile (one call, N results) or fan-out (N calls)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2struct::{summarize, DocumentReference, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Engine resolved from GENAI_API_KEY unless one is injected.
//!     let config = ExtractConfig::default();
//!     let reference = DocumentReference::text("The lease runs from 2026-01-01 …");
//!     let summary = summarize(&reference, &config).await?;
//!     println!("{}", summary.title);
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! * Input errors (malformed reference, unsupported format) are raised
//!   before any engine call — no retry budget is ever spent on them.
//! * Batch flows return exactly one result per submitted id, with flagged
//!   placeholders for anything the engine dropped.
//! * Fan-out flows isolate per-item failure: one bad article can never
//!   abort its siblings.
//! * Raw engine diagnostics never reach end users; exhausted retries
//!   surface as one stable overload message.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2struct` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod flows;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod remote;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder};
pub use corpus::{Article, NewsCorpus};
pub use engine::{EngineError, EngineErrorKind, InferenceEngine, PromptTemplate};
pub use error::{ExtractError, ItemError};
pub use flows::backlog::{analyze_backlog, BacklogFinding, BacklogItem};
pub use flows::clauses::{extract_clauses, Clause, ClauseReport, RiskLevel};
pub use flows::events::{extract_events, DatedEvent, Timeline};
pub use flows::news::{analyze_news, score_articles, NewsReport, NewsSignal, Sentiment};
pub use flows::summary::{summarize, DocumentSummary};
pub use pipeline::decode::{decode_document, ContentClass, DocumentContent, DocumentReference};
pub use pipeline::reconcile::{reconcile, Keyed};
pub use pipeline::retry::RetryPolicy;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use remote::RemoteEngine;
pub use stream::{news_stream, SignalStream};
