//! Extraction flows: the public entry points composing the pipeline stages.
//!
//! Single-document flows ([`summary`], [`clauses`], [`events`]) decode and
//! shape one document, then run a single engine call under the interactive
//! retry policy. [`backlog`] asks the engine to process a whole batch in one
//! call and reconciles the response to completeness. [`news`] fans out one
//! call per corpus article with per-item failure isolation.

use crate::config::ExtractConfig;
use crate::engine::InferenceEngine;
use crate::error::ExtractError;
use crate::remote::RemoteEngine;
use std::sync::Arc;

pub mod backlog;
pub mod clauses;
pub mod events;
pub mod news;
pub mod summary;

/// Resolve the inference engine, from most-specific to least-specific.
///
/// 1. **Pre-built engine** (`config.engine`) — the caller constructed and
///    configured the engine entirely; we use it as-is. Useful in tests or
///    when the caller needs custom middleware (caching, rate-limiting).
///
/// 2. **Remote engine from the environment** — `GENAI_API_KEY` plus the
///    config's model/endpoint settings. Convenient for CLI use with no
///    other configuration.
pub(crate) fn resolve_engine(config: &ExtractConfig) -> Result<Arc<dyn InferenceEngine>, ExtractError> {
    if let Some(ref engine) = config.engine {
        return Ok(Arc::clone(engine));
    }
    Ok(Arc::new(RemoteEngine::from_env(config)?))
}
