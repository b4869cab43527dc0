//! Backlog analysis flow: one engine call for the whole batch, reconciled
//! to completeness.
//!
//! The engine is asked to return one finding per submitted item, but batch
//! responses routinely drop items. After the retry controller has resolved
//! transient failures for the call as a whole, the reconciler restores the
//! contract: every input id appears exactly once in the output, with
//! synthesized flagged placeholders for anything the engine dropped.

use crate::config::ExtractConfig;
use crate::engine::PromptTemplate;
use crate::error::ExtractError;
use crate::flows::resolve_engine;
use crate::pipeline::client::ExtractionClient;
use crate::pipeline::reconcile::{reconcile, Keyed};
use crate::pipeline::retry;
use crate::pipeline::shape::ShapedRequest;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// One backlog entry submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// The engine's finding for one backlog item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BacklogFinding {
    /// Id of the item this finding belongs to, echoed from the input.
    pub id: String,
    /// Concrete problems found; empty when the item is ready.
    #[serde(default)]
    pub issues: Vec<String>,
    /// One actionable improvement, or a confirmation the item is ready.
    #[serde(default)]
    pub suggestion: String,
    /// True when this finding was synthesized because the engine did not
    /// return the item — distinguishes "not processed" from "no issues".
    #[serde(default)]
    pub flagged: bool,
    /// Present only on synthesized placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Keyed for BacklogFinding {
    fn item_id(&self) -> &str {
        &self.id
    }
}

/// Wire shape of the engine's batch response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct BacklogAnalysis {
    findings: Vec<BacklogFinding>,
}

fn placeholder(id: &str) -> BacklogFinding {
    BacklogFinding {
        id: id.to_string(),
        issues: Vec::new(),
        suggestion: String::new(),
        flagged: true,
        note: Some("engine did not return this item".to_string()),
    }
}

/// Analyze a backlog: exactly one finding per input item, in input order.
///
/// Runs a single engine call for the whole batch under the batch retry
/// policy, then reconciles. An empty batch returns an empty result without
/// touching the engine.
pub async fn analyze_backlog(
    items: &[BacklogItem],
    config: &ExtractConfig,
) -> Result<Vec<BacklogFinding>, ExtractError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(items.len());
    }

    let payload = ShapedRequest::without_document()
        .with_field("items", json!(items))
        .to_payload();

    let client = ExtractionClient::new(resolve_engine(config)?);
    let analysis: BacklogAnalysis = retry::run(&config.batch_retry, || {
        let client = client.clone();
        let payload = payload.clone();
        async move { client.invoke(PromptTemplate::Backlog, &payload).await }
    })
    .await?;

    let input_ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
    let returned = analysis.findings.len();
    let findings = reconcile(&input_ids, analysis.findings, placeholder);

    let synthesized = findings.iter().filter(|f| f.flagged).count();
    info!(
        "Backlog analysis: {} items, {} returned by engine, {} placeholders",
        items.len(),
        returned,
        synthesized
    );

    if let Some(ref cb) = config.progress_callback {
        for finding in &findings {
            match &finding.note {
                Some(note) => cb.on_item_error(&finding.id, findings.len(), note),
                None => cb.on_item_complete(&finding.id, findings.len()),
            }
        }
        cb.on_batch_complete(findings.len(), findings.len() - synthesized);
    }

    Ok(findings)
}
