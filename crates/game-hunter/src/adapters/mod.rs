//! Source adapters: per-site search strategies and page extractors.
//!
//! Each adapter implements [`SourceAdapter`] (search for a page, then
//! extract a record from it). The orchestrator only sees the object-safe
//! [`Hunter`] trait, which every adapter gets through a blanket impl, so
//! tests can substitute stub hunters.

pub mod aggregator;
pub mod encyclopedia;
pub mod search_engine;
pub mod storefront;

use crate::browser::BrowserLauncher;
use crate::fetch::FetchClient;
use crate::matcher::TitleMatcher;
use crate::types::{Source, SourceRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use aggregator::AggregatorAdapter;
pub use encyclopedia::EncyclopediaAdapter;
pub use storefront::StorefrontAdapter;

/// Search then extract, for one source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// What a successful search hands to extraction.
    type Target: Send;

    fn source(&self) -> Source;

    /// Locate the page for `title`, or `None` when no candidate matched.
    async fn search(&self, title: &str) -> Option<Self::Target>;

    /// Build the record for a located page. Title gating happens here,
    /// before any field is copied.
    async fn extract(&self, target: Self::Target, title: &str) -> SourceRecord;
}

/// Object-safe view of an adapter used by the orchestrator.
#[async_trait]
pub trait Hunter: Send + Sync {
    fn source(&self) -> Source;

    /// Produce the record for `title`; never fails, a miss is `found = false`.
    async fn hunt(&self, title: &str) -> SourceRecord;
}

#[async_trait]
impl<A: SourceAdapter> Hunter for A {
    fn source(&self) -> Source {
        SourceAdapter::source(self)
    }

    async fn hunt(&self, title: &str) -> SourceRecord {
        let source = SourceAdapter::source(self);
        match self.search(title).await {
            Some(target) => self.extract(target, title).await,
            None => {
                info!("{}: no matching page for '{title}'", source.site());
                SourceRecord::not_found(source)
            }
        }
    }
}

/// Base URLs of every site the adapters talk to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub storefront: String,
    pub search_engine: String,
    pub aggregator: String,
    pub encyclopedia: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            storefront: "https://store.steampowered.com".to_string(),
            search_engine: "https://duckduckgo.com".to_string(),
            aggregator: "https://opencritic.com".to_string(),
            encyclopedia: "https://en.wikipedia.org".to_string(),
        }
    }
}

/// Shared primitives handed to every adapter.
#[derive(Clone)]
pub struct HuntContext {
    pub fetch: FetchClient,
    pub browser: Arc<dyn BrowserLauncher>,
    pub matcher: TitleMatcher,
    /// Navigation timeout for browser pages.
    pub nav_timeout: Duration,
    /// Bound on waiting for an element to appear.
    pub element_timeout: Duration,
    /// Pause before a search-engine query and after client-side renders.
    pub settle: Duration,
}

impl HuntContext {
    pub fn new(fetch: FetchClient, browser: Arc<dyn BrowserLauncher>) -> Self {
        let timeout = fetch.timeout();
        Self {
            fetch,
            browser,
            matcher: TitleMatcher::default(),
            nav_timeout: timeout,
            element_timeout: timeout,
            settle: Duration::from_secs(1),
        }
    }
}

/// Build the hunters for the enabled sources, in the order given.
pub fn build_hunters(
    sources: &[Source],
    ctx: &HuntContext,
    endpoints: &Endpoints,
) -> Vec<Arc<dyn Hunter>> {
    sources
        .iter()
        .map(|source| -> Arc<dyn Hunter> {
            match source {
                Source::Storefront => Arc::new(StorefrontAdapter::new(
                    ctx.clone(),
                    &endpoints.storefront,
                    &endpoints.search_engine,
                )),
                Source::Aggregator => {
                    Arc::new(AggregatorAdapter::new(ctx.clone(), &endpoints.aggregator))
                }
                Source::Encyclopedia => {
                    Arc::new(EncyclopediaAdapter::new(ctx.clone(), &endpoints.encyclopedia))
                }
            }
        })
        .collect()
}
