//! Concurrent per-item fan-out with isolated failure.
//!
//! Used where batch items are independent enough to warrant one engine call
//! each. All calls are issued up front and settle in any order
//! (`buffer_unordered`); association is by item id, never by position. A
//! failing item is converted locally into a fallback stub so it can never
//! abort its siblings — the caller always gets one result per item.

use crate::error::{ExtractError, ItemError};
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run `op` for every item, at most `concurrency` in flight.
///
/// `fallback` turns a per-item failure into that item's stub result. The
/// returned vector holds one entry per input item, in completion order.
pub async fn fan_out<I, R, Op, Fut, Fb>(
    items: Vec<I>,
    concurrency: usize,
    op: Op,
    fallback: Fb,
) -> Vec<R>
where
    I: ItemRef,
    Op: Fn(I) -> Fut,
    Fut: Future<Output = Result<R, ExtractError>>,
    Fb: Fn(ItemError) -> R,
{
    let concurrency = concurrency.max(1);
    stream::iter(items.into_iter().map(|item| {
        let id = item.item_id().to_string();
        let future = op(item);
        let fallback = &fallback;
        async move {
            match future.await {
                Ok(result) => result,
                Err(error) => {
                    tracing::warn!("Item '{}' failed: {}; substituting fallback", id, error);
                    fallback(ItemError::ExtractionFailed {
                        id,
                        detail: error.to_string(),
                    })
                }
            }
        }
    }))
    .buffer_unordered(concurrency)
    .collect()
    .await
}

/// Implemented by fan-out inputs so failures can be attributed to an id.
pub trait ItemRef {
    fn item_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, EngineErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Item {
        id: String,
        fail: bool,
    }

    impl ItemRef for Item {
        fn item_id(&self) -> &str {
            &self.id
        }
    }

    #[derive(Debug, PartialEq)]
    struct Outcome {
        id: String,
        ok: bool,
    }

    fn items(specs: &[(&str, bool)]) -> Vec<Item> {
        specs
            .iter()
            .map(|(id, fail)| Item {
                id: id.to_string(),
                fail: *fail,
            })
            .collect()
    }

    async fn score(item: Item) -> Result<Outcome, ExtractError> {
        if item.fail {
            Err(ExtractError::Engine(EngineError::new(
                EngineErrorKind::Other,
                "synthetic failure",
            )))
        } else {
            Ok(Outcome {
                id: item.id,
                ok: true,
            })
        }
    }

    fn stub(error: ItemError) -> Outcome {
        Outcome {
            id: error.id().to_string(),
            ok: false,
        }
    }

    #[tokio::test]
    async fn one_result_per_item() {
        let results = fan_out(items(&[("a", false), ("b", false), ("c", false)]), 2, score, stub).await;
        assert_eq!(results.len(), 3);
        let mut ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failures_become_stubs_without_aborting_siblings() {
        let results = fan_out(items(&[("a", false), ("bad", true), ("c", false)]), 3, score, stub).await;
        assert_eq!(results.len(), 3);
        let failed: Vec<&Outcome> = results.iter().filter(|r| !r.ok).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, "bad");
        assert_eq!(results.iter().filter(|r| r.ok).count(), 2);
    }

    #[tokio::test]
    async fn all_calls_are_issued_concurrently() {
        // With concurrency >= len and every call parked on the same barrier,
        // the batch can only finish if all futures were in flight at once.
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let in_flight_op = in_flight.clone();
        let peak_op = peak.clone();

        let results = fan_out(
            items(&[("a", false), ("b", false), ("c", false), ("d", false)]),
            8,
            move |item: Item| {
                let in_flight = in_flight_op.clone();
                let peak = peak_op.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(Outcome { id: item.id, ok: true })
                }
            },
            stub,
        )
        .await;

        assert_eq!(results.len(), 4);
        assert!(
            peak.load(Ordering::SeqCst) > 1,
            "expected overlapping in-flight calls, peak was 1"
        );
    }

    #[tokio::test]
    async fn zero_concurrency_is_clamped() {
        let results = fan_out(items(&[("a", false)]), 0, score, stub).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_empty() {
        let results = fan_out(Vec::<Item>::new(), 4, score, stub).await;
        assert!(results.is_empty());
    }
}
