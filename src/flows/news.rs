//! News sentiment flow: concurrent per-article fan-out over an injected
//! read-only corpus.
//!
//! Each article is independent, so it gets its own engine call under its own
//! minimal retry. A failing article yields a neutral, not-relevant stub
//! instead of aborting its siblings. Relevance filtering is a flow-level
//! policy layered on top of the raw per-item results — [`score_articles`]
//! returns everything, [`analyze_news`] keeps only relevant signals.

use crate::config::ExtractConfig;
use crate::corpus::{Article, NewsCorpus};
use crate::engine::PromptTemplate;
use crate::error::{ExtractError, ItemError};
use crate::flows::resolve_engine;
use crate::pipeline::client::ExtractionClient;
use crate::pipeline::fanout::{fan_out, ItemRef};
use crate::pipeline::retry::{self, RetryPolicy};
use crate::pipeline::shape::ShapedRequest;
use schemars::JsonSchema;
use serde_json::json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Sentiment of an article towards the analyzed topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// The engine's judgement of one article.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsSignal {
    /// Article id, echoed from the input.
    pub id: String,
    /// Whether the article materially concerns the topic.
    pub relevant: bool,
    pub sentiment: Sentiment,
    /// One sentence justifying the sentiment.
    pub rationale: String,
}

/// Aggregate result of a news analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsReport {
    /// Signals for relevant articles only, strongest filter the flow applies.
    pub signals: Vec<NewsSignal>,
    /// How many articles were scanned in total.
    pub scanned: usize,
    /// How many articles fell back to a stub after their call failed.
    pub failed: usize,
}

impl ItemRef for Article {
    fn item_id(&self) -> &str {
        &self.id
    }
}

/// Neutral, not-relevant stand-in for an article whose call failed.
pub(crate) fn fallback_signal(error: ItemError) -> NewsSignal {
    NewsSignal {
        id: error.id().to_string(),
        relevant: false,
        sentiment: Sentiment::Neutral,
        rationale: "extraction failed for this article; defaulted to neutral".to_string(),
    }
}

/// Score one article under its own retry budget.
pub(crate) async fn score_article(
    client: ExtractionClient,
    topic: String,
    article: Article,
    policy: RetryPolicy,
) -> Result<NewsSignal, ExtractError> {
    let payload = ShapedRequest::without_document()
        .with_field("article", json!(&article))
        .with_field("topic", json!(&topic))
        .to_payload();

    let mut signal: NewsSignal = retry::run(&policy, || {
        let client = client.clone();
        let payload = payload.clone();
        async move { client.invoke(PromptTemplate::NewsSignal, &payload).await }
    })
    .await?;

    // Association is by input id; an engine that echoes a wrong id does not
    // get to corrupt it.
    if signal.id != article.id {
        warn!(
            "Engine echoed id '{}' for article '{}'; correcting",
            signal.id, article.id
        );
        signal.id = article.id;
    }
    Ok(signal)
}

/// Score every article in the corpus, one engine call per article.
///
/// Returns one signal per article (stubs included), in completion order.
pub async fn score_articles(
    topic: &str,
    corpus: &NewsCorpus,
    config: &ExtractConfig,
) -> Result<Vec<NewsSignal>, ExtractError> {
    let client = ExtractionClient::new(resolve_engine(config)?);
    let articles: Vec<Article> = corpus.articles().to_vec();
    let total = articles.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let topic = topic.to_string();
    let policy = config.interactive_retry;
    let progress = config.progress_callback.clone();

    let signals = fan_out(
        articles,
        config.concurrency,
        |article: Article| {
            let client = client.clone();
            let topic = topic.clone();
            let progress = progress.clone();
            async move {
                let id = article.id.clone();
                if let Some(ref cb) = progress {
                    cb.on_item_start(&id, total);
                }
                let outcome = score_article(client, topic, article, policy).await;
                if let Some(ref cb) = progress {
                    match &outcome {
                        Ok(_) => cb.on_item_complete(&id, total),
                        Err(e) => cb.on_item_error(&id, total, &e.to_string()),
                    }
                }
                outcome
            }
        },
        fallback_signal,
    )
    .await;

    if let Some(ref cb) = config.progress_callback {
        let failed = signals
            .iter()
            .filter(|s| s.rationale.starts_with("extraction failed"))
            .count();
        cb.on_batch_complete(total, total - failed);
    }

    Ok(signals)
}

/// Analyze the corpus for a topic, keeping only relevant signals.
pub async fn analyze_news(
    topic: &str,
    corpus: &NewsCorpus,
    config: &ExtractConfig,
) -> Result<NewsReport, ExtractError> {
    let scanned = corpus.len();
    let all = score_articles(topic, corpus, config).await?;
    let failed = all
        .iter()
        .filter(|s| s.rationale.starts_with("extraction failed"))
        .count();
    let signals: Vec<NewsSignal> = all.into_iter().filter(|s| s.relevant).collect();

    info!(
        "News analysis for '{}': {} scanned, {} relevant, {} failed",
        topic,
        scanned,
        signals.len(),
        failed
    );

    Ok(NewsReport {
        signals,
        scanned,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_neutral_and_not_relevant() {
        let stub = fallback_signal(ItemError::ExtractionFailed {
            id: "n-3".into(),
            detail: "503".into(),
        });
        assert_eq!(stub.id, "n-3");
        assert!(!stub.relevant);
        assert_eq!(stub.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Sentiment::Negative).unwrap(), "negative");
    }
}
