//! Configuration types for extraction flows.
//!
//! All flow behaviour is controlled through [`ExtractConfig`], built via its
//! [`ExtractConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across flows, serialise the scalar parts for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::engine::InferenceEngine;
use crate::error::ExtractError;
use crate::pipeline::retry::RetryPolicy;
use crate::progress::ExtractionProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for extraction flows.
///
/// Built via [`ExtractConfig::builder()`] or [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2struct::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .concurrency(8)
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Number of concurrent engine calls in fan-out flows. Default: 4.
    ///
    /// Engine APIs are network-bound, not CPU-bound; a modest fan-out cuts
    /// wall-clock time substantially. If you hit rate-limit errors, lower
    /// this before raising retry budgets.
    pub concurrency: usize,

    /// Retry policy for interactive flows (a user is waiting). Default:
    /// 2 attempts, 1000 ms base delay.
    pub interactive_retry: RetryPolicy,

    /// Retry policy for batch document flows. Default: 3 attempts, 1500 ms
    /// base delay.
    pub batch_retry: RetryPolicy,

    /// Sampling temperature forwarded to the engine. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to the document — exactly
    /// what you want for extraction. Higher values introduce creativity
    /// that degrades schema adherence.
    pub temperature: f32,

    /// Maximum tokens the engine may generate per call. Default: 2048.
    ///
    /// Dense batch responses (many findings) can exceed 1000 output tokens.
    /// Too low a cap silently truncates the JSON mid-object, which then
    /// surfaces as an engine-no-output failure.
    pub max_output_tokens: usize,

    /// Engine model identifier. Default: "gemini-2.0-flash".
    pub model: String,

    /// Override the remote engine's base URL (self-hosted gateways, tests).
    pub endpoint: Option<String>,

    /// Pre-constructed engine. Takes precedence over any remote settings.
    pub engine: Option<Arc<dyn InferenceEngine>>,

    /// Per-engine-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Optional per-item progress events for batch and fan-out flows.
    pub progress_callback: Option<Arc<dyn ExtractionProgressCallback>>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            interactive_retry: RetryPolicy::interactive(),
            batch_retry: RetryPolicy::batch(),
            temperature: 0.1,
            max_output_tokens: 2048,
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            engine: None,
            api_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("concurrency", &self.concurrency)
            .field("interactive_retry", &self.interactive_retry)
            .field("batch_retry", &self.batch_retry)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine.as_ref().map(|_| "<dyn InferenceEngine>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn interactive_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.interactive_retry = policy;
        self
    }

    pub fn batch_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.batch_retry = policy;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExtractionProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig("Concurrency must be >= 1".into()));
        }
        if c.interactive_retry.max_attempts == 0 || c.batch_retry.max_attempts == 0 {
            return Err(ExtractError::InvalidConfig(
                "Retry policies need at least one attempt".into(),
            ));
        }
        if c.model.is_empty() {
            return Err(ExtractError::InvalidConfig("Model must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_flow_policies() {
        let config = ExtractConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.interactive_retry, RetryPolicy::interactive());
        assert_eq!(config.batch_retry, RetryPolicy::batch());
        assert_eq!(config.temperature, 0.1);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let config = ExtractConfig::builder()
            .concurrency(0)
            .temperature(9.0)
            .build()
            .unwrap();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn empty_model_is_rejected() {
        let result = ExtractConfig::builder().model("").build();
        assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn zero_attempt_policy_is_rejected() {
        let result = ExtractConfig::builder()
            .batch_retry(RetryPolicy {
                max_attempts: 0,
                base_delay_ms: 1000,
            })
            .build();
        assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
    }

    #[test]
    fn debug_hides_engine_internals() {
        let rendered = format!("{:?}", ExtractConfig::default());
        assert!(rendered.contains("ExtractConfig"));
        assert!(rendered.contains("engine"));
    }
}
