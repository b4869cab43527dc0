//! The inference-engine boundary: the single non-deterministic external
//! dependency of the whole crate.
//!
//! Everything above this boundary works with the enumerated
//! [`EngineErrorKind`] — the substring sniffing that classifies a raw
//! provider message as transient lives in [`classify_transport_message`]
//! and is used only by the adapter that talks to the literal remote API
//! ([`crate::remote::RemoteEngine`]). Stringly-typed error logic must never
//! leak past this module.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Identifies the prompt template an engine call runs against.
///
/// Templates themselves live in [`crate::prompts`]; the engine only needs a
/// stable id so adapters can log and route calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTemplate {
    /// Document summary (title, abstract, key points).
    Summary,
    /// Contract clause extraction.
    Clauses,
    /// Dated-event / timeline extraction.
    Events,
    /// Whole-batch backlog analysis.
    Backlog,
    /// Single-article news sentiment.
    NewsSignal,
}

impl PromptTemplate {
    /// Stable string id used in logs and by remote adapters.
    pub fn id(&self) -> &'static str {
        match self {
            PromptTemplate::Summary => "summarize-document",
            PromptTemplate::Clauses => "extract-clauses",
            PromptTemplate::Events => "extract-events",
            PromptTemplate::Backlog => "analyze-backlog",
            PromptTemplate::NewsSignal => "score-news-item",
        }
    }

    /// The system prompt text for this template.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptTemplate::Summary => crate::prompts::SUMMARY_PROMPT,
            PromptTemplate::Clauses => crate::prompts::CLAUSES_PROMPT,
            PromptTemplate::Events => crate::prompts::EVENTS_PROMPT,
            PromptTemplate::Backlog => crate::prompts::BACKLOG_PROMPT,
            PromptTemplate::NewsSignal => crate::prompts::NEWS_SIGNAL_PROMPT,
        }
    }
}

/// Why an engine call failed, as an enumerated kind.
///
/// The retry controller decides retryability from this kind alone — see
/// [`EngineErrorKind::is_transient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EngineErrorKind {
    /// Backend unavailable or overloaded (HTTP 503, "overloaded", "try again later").
    Unavailable,
    /// Rate limit hit (HTTP 429, "rate limit").
    RateLimited,
    /// Quota or resource exhaustion ("resource has been exhausted").
    ResourceExhausted,
    /// The call outlived the backend's deadline ("deadline exceeded").
    DeadlineExceeded,
    /// The engine responded but produced no candidate value.
    NoOutput,
    /// The request itself was rejected (bad schema, oversized payload, auth).
    InvalidRequest,
    /// Anything else.
    Other,
}

impl EngineErrorKind {
    /// Whether the retry controller should spend an attempt on this kind.
    ///
    /// Matches the fixed transient-condition set: availability, rate, quota,
    /// and deadline failures. Everything else is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineErrorKind::Unavailable
                | EngineErrorKind::RateLimited
                | EngineErrorKind::ResourceExhausted
                | EngineErrorKind::DeadlineExceeded
        )
    }
}

/// A failure raised by an [`InferenceEngine`].
#[derive(Debug, Clone, Error)]
#[error("Engine failure ({kind:?}): {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Classify a raw transport/provider message into an [`EngineErrorKind`].
///
/// Case-insensitive substring match against the transient-condition
/// indicators remote generative APIs actually emit. This is the only place
/// in the crate where error *text* drives logic — adapters call it once at
/// the boundary and everything upstream sees the enumerated kind.
pub fn classify_transport_message(message: &str) -> EngineErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("rate limit") {
        EngineErrorKind::RateLimited
    } else if lower.contains("resource has been exhausted") {
        EngineErrorKind::ResourceExhausted
    } else if lower.contains("deadline exceeded") {
        EngineErrorKind::DeadlineExceeded
    } else if lower.contains("503")
        || lower.contains("overloaded")
        || lower.contains("try again later")
        || lower.contains("service unavailable")
    {
        EngineErrorKind::Unavailable
    } else {
        EngineErrorKind::Other
    }
}

/// The generative inference engine, seen from this crate.
///
/// One call per invocation: the engine receives a prompt template id, a JSON
/// input payload, and the JSON schema the response must conform to. It
/// returns `Ok(Some(value))` with a candidate value, `Ok(None)` when it ran
/// but produced nothing, or `Err` on failure. Schema *enforcement* is the
/// caller's job ([`crate::pipeline::client::ExtractionClient`]); adapters
/// forward the schema so backends that support constrained decoding can use
/// it.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn generate(
        &self,
        template: PromptTemplate,
        payload: &Value,
        output_schema: &Value,
    ) -> Result<Option<Value>, EngineError>;
}
