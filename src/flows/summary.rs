//! Document summary flow.

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

/// Structured summary of one document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Short descriptive title the engine assigned.
    pub title: String,
    /// Faithful summary, at most five sentences.
    pub summary: String,
    /// The document's most important points, one sentence each.
    pub key_points: Vec<String>,
}

/// Summarize a document.
///
/// Input errors (malformed reference, unsupported format) are raised before
/// any engine call. Transient engine failures are retried under the
/// interactive policy; exhaustion surfaces as
/// [`ExtractError::ServiceOverloaded`].
pub async fn summarize(
    reference: &DocumentReference,
    config: &ExtractConfig,
) -> Result<DocumentSummary, ExtractError> {
    let content = decode_document(reference)?;
    let payload = ShapedRequest::from_content(content)
        .with_file_name(reference.file_name.clone())
        .to_payload();

    let client = ExtractionClient::new(resolve_engine(config)?);
    retry::run(&config.interactive_retry, || {
        let client = client.clone();
        let payload = payload.clone();
        async move { client.invoke(PromptTemplate::Summary, &payload).await }
    })
    .await
}
