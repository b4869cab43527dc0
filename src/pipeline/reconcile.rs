//! Completeness reconciliation: guarantee one result per submitted item.
//!
//! Engines asked to process a whole batch in one call routinely drop, reorder,
//! or invent items. The reconciler restores the contract: for every input id,
//! exactly one output, in input order. A dropped id gets a synthesized
//! placeholder the caller can tell apart from "processed, nothing found".
//! Orphan results — ids the engine returned that were never submitted — are
//! logged and dropped; keeping them would break the cardinality guarantee.

use std::collections::HashMap;
use tracing::warn;

/// Implemented by batch results that carry their item's id.
pub trait Keyed {
    fn item_id(&self) -> &str;
}

/// Reconcile engine `results` against the original ordered `input_ids`.
///
/// For each input id, the engine's result is used verbatim when present;
/// otherwise `placeholder(id)` synthesizes a flagged stand-in. Runs once per
/// successful engine call — transient failures were already resolved by the
/// retry controller before this point.
pub fn reconcile<R, F>(input_ids: &[String], results: Vec<R>, placeholder: F) -> Vec<R>
where
    R: Keyed,
    F: Fn(&str) -> R,
{
    let mut by_id: HashMap<String, R> = HashMap::with_capacity(results.len());
    for result in results {
        let id = result.item_id().to_string();
        if !input_ids.iter().any(|i| *i == id) {
            warn!("Engine returned orphan result for unknown id '{}'; dropping", id);
            continue;
        }
        if by_id.insert(id.clone(), result).is_some() {
            warn!("Engine returned duplicate result for id '{}'; keeping the last", id);
        }
    }

    input_ids
        .iter()
        .map(|id| by_id.remove(id).unwrap_or_else(|| placeholder(id)))
        .collect()
}
