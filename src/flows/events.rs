//! Dated-event (timeline) extraction flow.

use crate::config::ExtractConfig;
use crate::engine::PromptTemplate;
use crate::error::ExtractError;
use crate::flows::resolve_engine;
use crate::pipeline::client::ExtractionClient;
use crate::pipeline::decode::{decode_document, DocumentReference};
use crate::pipeline::retry;
use crate::pipeline::shape::ShapedRequest;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One event with an explicit calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatedEvent {
    /// ISO 8601 date (YYYY-MM-DD).
    pub date: String,
    pub title: String,
    /// One sentence of context from the document.
    pub description: String,
}

/// Chronological timeline extracted from one document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub events: Vec<DatedEvent>,
}

/// Extract every dated event from a document, chronologically ordered.
pub async fn extract_events(
    reference: &DocumentReference,
    config: &ExtractConfig,
) -> Result<Timeline, ExtractError> {
    let content = decode_document(reference)?;
    let payload = ShapedRequest::from_content(content)
        .with_file_name(reference.file_name.clone())
        .to_payload();

    let client = ExtractionClient::new(resolve_engine(config)?);
    retry::run(&config.interactive_retry, || {
        let client = client.clone();
        let payload = payload.clone();
        async move { client.invoke(PromptTemplate::Events, &payload).await }
    })
    .await
}
