//! Streaming news analysis: emit per-article signals as they settle.
//!
//! ## Why stream?
//!
//! A fan-out over a large corpus takes a while. A streams-based API lets
//! callers display partial results immediately, wire up progress bars, or
//! forward signals over a WebSocket instead of buffering the whole batch.
//!
//! Unlike the eager [`crate::flows::news::analyze_news`] which returns only
//! after every article settles, [`news_stream`] yields one [`NewsSignal`]
//! per article as each call completes. Signals arrive in completion order,
//! unfiltered — apply the relevance filter downstream if you need it.

use crate::config::ExtractConfig;
use crate::corpus::NewsCorpus;
use crate::error::ExtractError;
use crate::flows::news::{fallback_signal, score_article, NewsSignal};
use crate::flows::resolve_engine;
use crate::error::ItemError;
use crate::pipeline::client::ExtractionClient;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of per-article signals.
pub type SignalStream = Pin<Box<dyn Stream<Item = NewsSignal> + Send>>;

/// Score every corpus article for `topic`, streaming signals as they settle.
///
/// Per-item failure isolation matches the eager flow: a failing article
/// yields its neutral stub in the stream rather than ending it.
///
/// # Returns
/// - `Ok(SignalStream)` — one signal per article, completion order
/// - `Err(ExtractError)` — fatal setup error (no engine configured)
pub fn news_stream(
    topic: &str,
    corpus: &NewsCorpus,
    config: &ExtractConfig,
) -> Result<SignalStream, ExtractError> {
    info!(
        "Starting streaming news analysis for '{}' over {} articles",
        topic,
        corpus.len()
    );

    let client = ExtractionClient::new(resolve_engine(config)?);
    let topic = topic.to_string();
    let policy = config.interactive_retry;
    let articles = corpus.articles().to_vec();
    let concurrency = config.concurrency.max(1);

    let s = stream::iter(articles.into_iter().map(move |article| {
        let client = client.clone();
        let topic = topic.clone();
        async move {
            let id = article.id.clone();
            match score_article(client, topic, article, policy).await {
                Ok(signal) => signal,
                Err(error) => {
                    warn!("Article '{}' failed: {}; yielding stub", id, error);
                    fallback_signal(ItemError::ExtractionFailed {
                        id,
                        detail: error.to_string(),
                    })
                }
            }
        }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}
