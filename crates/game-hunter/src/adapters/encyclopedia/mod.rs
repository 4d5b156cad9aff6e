//! Encyclopedia adapter (Wikipedia).
//!
//! Search fetches the internal search URL and classifies where it landed:
//!
//! ```text
//! Searching ─┬─ DirectHit ──────────────────────────────┐
//!            ├─ SeriesIndex ── timeline entry ──────────┤
//!            ├─ DisambiguationList ── series page ──────┤
//!            └─ NotFound                                 └─ Extracting
//! ```
//!
//! There are no retries; a failed step ends in `found = false`.

pub mod classify;
pub mod infobox;
pub mod reception;

use super::{HuntContext, SourceAdapter};
use crate::fetch::{encode_query, FetchedPage};
use crate::html::{absolutize, sel, text_of};
use crate::types::{EncyclopediaRecord, InfoField, Source, SourceRecord};
use async_trait::async_trait;
use classify::PageKind;
use scraper::Html;
use tracing::{debug, info};

/// An article page, already fetched during search.
#[derive(Debug, Clone)]
pub struct ArticleTarget {
    pub url: String,
    pub html: String,
}

impl From<FetchedPage> for ArticleTarget {
    fn from(page: FetchedPage) -> Self {
        Self {
            url: page.final_url,
            html: page.body,
        }
    }
}

pub struct EncyclopediaAdapter {
    ctx: HuntContext,
    base: String,
}

impl EncyclopediaAdapter {
    pub fn new(ctx: HuntContext, base: &str) -> Self {
        Self {
            ctx,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, title: &str) -> String {
        format!(
            "{}/w/index.php?search={}&title=Special:Search&ns0=1",
            self.base,
            encode_query(title)
        )
    }

    /// Follow a timeline entry on a series page to its article.
    async fn follow_series(&self, series_html: &str, title: &str) -> Option<ArticleTarget> {
        let Some(href) = classify::series_entry_link(series_html, title, &self.ctx.matcher) else {
            info!("Wikipedia: no series entry matches '{title}'");
            return None;
        };
        let url = absolutize(&href, &self.base);
        self.ctx.fetch.get_page(&url).await.map(ArticleTarget::from)
    }
}

#[async_trait]
impl SourceAdapter for EncyclopediaAdapter {
    type Target = ArticleTarget;

    fn source(&self) -> Source {
        Source::Encyclopedia
    }

    async fn search(&self, title: &str) -> Option<ArticleTarget> {
        let page = self.ctx.fetch.get_page(&self.search_url(title)).await?;
        let kind = classify::classify(&page.body);
        debug!("Wikipedia: search for '{title}' landed on {kind:?}");

        match kind {
            PageKind::DirectHit => Some(page.into()),
            PageKind::SeriesIndex => self.follow_series(&page.body, title).await,
            PageKind::DisambiguationList => {
                let href = classify::disambiguation_series_link(&page.body)?;
                let series = self.ctx.fetch.get(&absolutize(&href, &self.base)).await?;
                self.follow_series(&series, title).await
            }
            PageKind::NotFound => None,
        }
    }

    async fn extract(&self, target: ArticleTarget, title: &str) -> SourceRecord {
        let record = build_record(&target, title, &self.ctx, &self.base);
        if record.found {
            info!("Wikipedia: found '{}' at {}", record.title, record.url);
        } else {
            info!("Wikipedia: no usable article for '{title}'");
        }
        SourceRecord::Encyclopedia(record)
    }
}

/// Parse an article and apply the title gate before copying any field.
fn build_record(target: &ArticleTarget, title: &str, ctx: &HuntContext, base: &str) -> EncyclopediaRecord {
    let doc = Html::parse_document(&target.html);
    let heading = doc
        .select(&sel("#firstHeading"))
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty());
    let infobox = infobox::parse_infobox(&doc);
    let reception = reception::parse_reception(&doc);

    if infobox.is_empty() && reception.is_empty() {
        return EncyclopediaRecord::default();
    }

    let shown = [infobox.title.clone(), heading]
        .into_iter()
        .flatten()
        .find(|candidate| ctx.matcher.matches(candidate, title).accepted);
    let Some(shown) = shown else {
        debug!("Wikipedia: article at {} rejected for '{title}'", target.url);
        return EncyclopediaRecord::default();
    };

    let mut record = EncyclopediaRecord {
        url: target.url.clone(),
        title: shown,
        found: true,
        image_url: infobox.image.as_deref().map(|src| absolutize(src, base)),
        aggregator_scores: reception.aggregators,
        critic_reviews: reception.reviews,
        ..Default::default()
    };
    for (label, value) in infobox.rows {
        match InfoField::from_label(&label) {
            Some(field) => {
                record.fields.entry(field).or_insert(value);
            }
            None => {
                record.extra.insert(label, value);
            }
        }
    }
    record
}
