//! Contract clause extraction flow.

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

/// Risk level of a clause from the counterparty's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One extracted contract clause.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// Category, e.g. "payment terms", "termination", "liability".
    pub clause_type: String,
    /// Verbatim contract text, trimmed to the essential sentences.
    pub excerpt: String,
    pub risk_level: RiskLevel,
    /// One sentence explaining the risk level.
    pub rationale: String,
}

/// The full clause report for one contract.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClauseReport {
    pub clauses: Vec<Clause>,
}

/// Extract notable clauses from a contract document.
pub async fn extract_clauses(
    reference: &DocumentReference,
    config: &ExtractConfig,
) -> Result<ClauseReport, ExtractError> {
    let content = decode_document(reference)?;
    let payload = ShapedRequest::from_content(content)
        .with_file_name(reference.file_name.clone())
        .to_payload();

    let client = ExtractionClient::new(resolve_engine(config)?);
    retry::run(&config.interactive_retry, || {
        let client = client.clone();
        let payload = payload.clone();
        async move { client.invoke(PromptTemplate::Clauses, &payload).await }
    })
    .await
}
