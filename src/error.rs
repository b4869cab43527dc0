//! Error types for the doc2struct library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (malformed document reference, unsupported format, engine exhausted).
//!   Returned as `Err(ExtractError)` from the top-level flow functions.
//!
//! * [`ItemError`] — **Non-fatal**: a single batch item failed (engine
//!   dropped it, or its individual call errored) but all sibling items are
//!   fine. Stored inside per-item results so callers can inspect partial
//!   success rather than losing the whole batch to one bad item.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! item failure, log and continue, or collect all errors for a post-run report.

use crate::engine::EngineError;
use thiserror::Error;

/// All fatal errors returned by the doc2struct library.
///
/// Per-item failures use [`ItemError`] and are stored in batch results
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The encoded document reference does not match `data:<type>;base64,<payload>`.
    #[error("Malformed document reference: {detail}\nExpected the form data:<content-type>;base64,<payload>.")]
    MalformedInput { detail: String },

    /// The declared content type is outside the supported sets.
    #[error("Unsupported file format '{mime}'.\n{hint}")]
    UnsupportedFormat { mime: String, hint: String },

    /// The base64 payload declared as text/plain did not decode to UTF-8.
    #[error("Document payload could not be decoded as UTF-8 text: {detail}")]
    UndecodableText { detail: String },

    /// A document-bearing flow received neither an encoded payload nor raw text.
    #[error("No document supplied.\nProvide either an encoded payload or raw text.")]
    MissingDocument,

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The engine ran but returned nothing conforming to the output schema.
    #[error("The engine returned no usable output: {detail}")]
    EngineNoOutput { detail: String },

    /// Transient failures persisted through every retry attempt.
    ///
    /// The raw engine diagnostics are deliberately not included here —
    /// callers get one stable message they can show to an end user.
    #[error("The analysis service is temporarily overloaded. Please try again in a few moments.")]
    ServiceOverloaded { attempts: u32 },

    /// A terminal engine failure, re-raised unchanged by the retry controller.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// No engine was configured and none could be resolved from the environment.
    #[error("No inference engine configured.\nSet GENAI_API_KEY or supply a pre-built engine via ExtractConfig::builder().engine(..).")]
    EngineNotConfigured,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Remediation hint for the legacy word-processor formats users most
    /// often upload. Everything else gets the generic conversion hint.
    pub(crate) fn unsupported(mime: &str) -> Self {
        const WORD_MIMES: [&str; 2] = [
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ];
        let hint = if WORD_MIMES.contains(&mime) {
            "Word documents (.doc/.docx) are not supported.\n\
             Convert the file to PDF or plain text and upload it again."
                .to_string()
        } else {
            "Supply a TXT, PDF, or image file (PNG, JPEG, WEBP, HEIC, HEIF).".to_string()
        };
        ExtractError::UnsupportedFormat {
            mime: mime.to_string(),
            hint,
        }
    }
}

/// A non-fatal error for a single batch item.
///
/// Stored alongside the item's result when extraction for that item fails.
/// The overall batch continues regardless.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ItemError {
    /// The engine's individual call for this item failed after its retries.
    #[error("Item '{id}': extraction failed: {detail}")]
    ExtractionFailed { id: String, detail: String },

    /// The engine's batch response did not contain this item's id.
    #[error("Item '{id}': engine did not return this item")]
    NotReturned { id: String },
}

impl ItemError {
    /// The id of the item this error belongs to.
    pub fn id(&self) -> &str {
        match self {
            ItemError::ExtractionFailed { id, .. } => id,
            ItemError::NotReturned { id } => id,
        }
    }
}
