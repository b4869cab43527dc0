//! HTTP adapter to the literal remote generative API.
//!
//! This is the only module that sees raw provider errors; everything it
//! returns upstream is an [`EngineError`] with an enumerated kind. Status
//! codes are classified first (they are unambiguous), and only then does the
//! body text go through [`classify_transport_message`] — the one sanctioned
//! use of substring sniffing in the crate.
//!
//! Media documents are forwarded as inline binary parts (the base64 body of
//! the original data-URI), text payloads as a JSON text part; both alongside
//! the template's system instruction and the declared response schema so the
//! backend's constrained decoding can do its part.

use crate::config::ExtractConfig;
use crate::engine::{
    classify_transport_message, EngineError, EngineErrorKind, InferenceEngine, PromptTemplate,
};
use crate::error::ExtractError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Engine adapter speaking the remote generateContent protocol.
pub struct RemoteEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl RemoteEngine {
    /// Build from config plus the `GENAI_API_KEY` environment variable.
    pub fn from_env(config: &ExtractConfig) -> Result<Self, ExtractError> {
        let api_key = std::env::var("GENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(ExtractError::EngineNotConfigured)?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ExtractConfig, api_key: impl Into<String>) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| ExtractError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Assemble the request body for one call.
    fn request_body(&self, template: PromptTemplate, payload: &Value, schema: &Value) -> Value {
        let mut parts = vec![json!({ "text": payload.to_string() })];

        // Media documents additionally travel as an inline binary part so the
        // backend reads the bytes, not the data-URI string.
        if let Some(document) = payload.get("document") {
            if document.get("kind").and_then(Value::as_str) == Some("media") {
                if let (Some(mime), Some(data_uri)) = (
                    document.get("mime").and_then(Value::as_str),
                    document.get("dataUri").and_then(Value::as_str),
                ) {
                    if let Some((_, body)) = data_uri.split_once(";base64,") {
                        parts.push(json!({
                            "inlineData": { "mimeType": mime, "data": body }
                        }));
                    }
                }
            }
        }

        json!({
            "systemInstruction": { "parts": [{ "text": template.system_prompt() }] },
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        })
    }
}

/// Classify a non-success HTTP response.
///
/// Status codes take precedence; otherwise the body text decides.
fn classify_http_failure(status: reqwest::StatusCode, body: &str) -> EngineErrorKind {
    match status.as_u16() {
        429 => EngineErrorKind::RateLimited,
        503 => EngineErrorKind::Unavailable,
        400 | 401 | 403 | 404 => EngineErrorKind::InvalidRequest,
        _ => classify_transport_message(body),
    }
}

#[async_trait]
impl InferenceEngine for RemoteEngine {
    async fn generate(
        &self,
        template: PromptTemplate,
        payload: &Value,
        output_schema: &Value,
    ) -> Result<Option<Value>, EngineError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = self.request_body(template, payload, output_schema);

        debug!("POST {} (template '{}')", url, template.id());
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    EngineErrorKind::DeadlineExceeded
                } else {
                    classify_transport_message(&e.to_string())
                };
                EngineError::new(kind, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let kind = classify_http_failure(status, &body_text);
            warn!("Engine call failed: HTTP {} ({:?})", status, kind);
            return Err(EngineError::new(
                kind,
                format!("HTTP {}: {}", status, truncate(&body_text, 200)),
            ));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| EngineError::new(EngineErrorKind::Other, format!("bad envelope: {e}")))?;

        // An empty candidate list or missing text is the engine running but
        // producing nothing; the client maps Ok(None) to its no-output error.
        let text = envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str);
        let Some(text) = text else {
            return Ok(None);
        };

        match serde_json::from_str(text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Engine returned non-JSON text ({e}); treating as no output");
                Ok(None)
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}
