//! Progress-callback trait for per-item extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! real-time events as batch and fan-out flows work through their items.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a database record,
//! or a terminal progress bar — without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` because
//! fan-out flows fire events from concurrently settling calls.

use std::sync::Arc;

/// Called by batch and fan-out flows as items are processed.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// `on_item_start`, `on_item_complete`, and `on_item_error` may be called
/// concurrently from different tasks during fan-out. Implementations must
/// protect shared mutable state with appropriate synchronisation.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any item is submitted to the engine.
    fn on_batch_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called just before an item's engine call is issued.
    fn on_item_start(&self, id: &str, total_items: usize) {
        let _ = (id, total_items);
    }

    /// Called when an item's result arrived without error.
    fn on_item_complete(&self, id: &str, total_items: usize) {
        let _ = (id, total_items);
    }

    /// Called when an item failed (after its own retries, if any) and was
    /// replaced by a fallback or placeholder result.
    fn on_item_error(&self, id: &str, total_items: usize, error: &str) {
        let _ = (id, total_items, error);
    }

    /// Called once after every item has settled.
    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        let _ = (total_items, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
