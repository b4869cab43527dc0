//! The simulated news corpus used by the news-sentiment flow.
//!
//! The corpus is constructed explicitly and injected into the flow — never
//! reached for as ambient module state. It is immutable after construction
//! (`Arc<[Article]>`), so concurrent fan-out readers need no locking.

use std::sync::Arc;

/// One news article. Request-scoped flows only ever borrow these.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub headline: String,
    pub body: String,
    /// ISO 8601 date the article ran.
    pub published_at: String,
}

/// A read-only collection of articles.
#[derive(Debug, Clone)]
pub struct NewsCorpus {
    articles: Arc<[Article]>,
}

impl NewsCorpus {
    /// Build a corpus from explicit articles.
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: articles.into(),
        }
    }

    /// The built-in simulated corpus: a small, fixed set of articles spanning
    /// clearly positive, negative, and off-topic stories so demo runs
    /// exercise the relevance filter and every sentiment value.
    pub fn simulated() -> Self {
        let articles = vec![
            Article {
                id: "n-001".into(),
                headline: "Meridian Robotics beats quarterly forecasts on warehouse automation demand".into(),
                body: "Meridian Robotics reported revenue of $412M for the quarter, up 31% \
                       year over year, driven by record orders for its warehouse automation \
                       line. Management raised full-year guidance and announced two new \
                       fulfilment-centre partnerships in Europe."
                    .into(),
                published_at: "2026-08-24".into(),
            },
            Article {
                id: "n-002".into(),
                headline: "Regulators open safety probe into Meridian's latest picker arm".into(),
                body: "The industrial safety agency said it is investigating three incident \
                       reports involving Meridian Robotics' M7 picker arm. The company said \
                       it is cooperating fully; shipments of the M7 continue while the review \
                       is under way."
                    .into(),
                published_at: "2026-08-26".into(),
            },
            Article {
                id: "n-003".into(),
                headline: "Coastal storms disrupt container traffic across northern ports".into(),
                body: "A week of severe weather has delayed container handling at several \
                       northern ports, with carriers warning of knock-on effects for \
                       just-in-time manufacturers through the end of the month."
                    .into(),
                published_at: "2026-08-27".into(),
            },
            Article {
                id: "n-004".into(),
                headline: "City council approves new bicycle lanes downtown".into(),
                body: "After months of consultation the council voted 9-2 to add protected \
                       bicycle lanes along the riverfront, with construction beginning in \
                       the spring."
                    .into(),
                published_at: "2026-08-28".into(),
            },
            Article {
                id: "n-005".into(),
                headline: "Meridian Robotics loses appeal in patent dispute with Atlas Automation".into(),
                body: "An appeals court upheld the ruling that Meridian's gripper design \
                       infringes two Atlas Automation patents, exposing the company to \
                       licensing fees analysts estimate at $40M annually."
                    .into(),
                published_at: "2026-08-29".into(),
            },
        ];
        Self::new(articles)
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
