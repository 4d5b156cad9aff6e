//! Review aggregator adapter (OpenCritic).
//!
//! The aggregator's search is a client-rendered widget, so search runs in a
//! browser session which is released before the game page is fetched over
//! plain HTTP.

use super::{HuntContext, SourceAdapter};
use crate::browser::BrowserSession;
use crate::html::{absolutize, sel, text_of};
use crate::types::{AggregatorRecord, Source, SourceRecord};
use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, info, warn};

const SEARCH_INPUT: &str = "input.ng-valid";
const RESULTS: &str = "div.results-container";

/// A located game page.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorTarget {
    pub url: String,
    pub listed_title: String,
}

/// Scores parsed from a game page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBlock {
    pub rating: String,
    pub top_critic_average: u32,
    pub critics_recommend: u32,
}

pub struct AggregatorAdapter {
    ctx: HuntContext,
    base: String,
}

impl AggregatorAdapter {
    pub fn new(ctx: HuntContext, base: &str) -> Self {
        Self {
            ctx,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    async fn results_html(&self, session: &mut BrowserSession, title: &str) -> Option<String> {
        let url = format!("{}/search", self.base);
        if let Err(e) = session.navigate(&url).await {
            debug!("OpenCritic: search page failed to load: {e}");
            return None;
        }
        if !session.wait_for(SEARCH_INPUT, self.ctx.element_timeout).await {
            debug!("OpenCritic: search box never appeared");
            return None;
        }
        if let Err(e) = session.fill_and_submit(SEARCH_INPUT, title).await {
            debug!("OpenCritic: search submit failed: {e}");
            return None;
        }
        if !session.wait_for(RESULTS, self.ctx.element_timeout).await {
            return None;
        }
        // Result rows keep rendering after the container appears.
        tokio::time::sleep(self.ctx.settle).await;
        session.html().await.ok()
    }
}

#[async_trait]
impl SourceAdapter for AggregatorAdapter {
    type Target = AggregatorTarget;

    fn source(&self) -> Source {
        Source::Aggregator
    }

    async fn search(&self, title: &str) -> Option<AggregatorTarget> {
        let mut session = match BrowserSession::open(self.ctx.browser.as_ref(), self.ctx.nav_timeout).await {
            Ok(s) => s,
            Err(e) => {
                warn!("OpenCritic: browser unavailable: {e}");
                return None;
            }
        };
        let html = self.results_html(&mut session, title).await;
        session.release().await;
        find_search_result(&html?, title, &self.base, &self.ctx)
    }

    async fn extract(&self, target: AggregatorTarget, title: &str) -> SourceRecord {
        let Some(body) = self.ctx.fetch.get(&target.url).await else {
            info!("OpenCritic: could not fetch {}", target.url);
            return SourceRecord::not_found(Source::Aggregator);
        };
        let (page_title, scores) = parse_game_page(&body);
        let shown = page_title.unwrap_or(target.listed_title);

        let record = match scores {
            Some(scores) if self.ctx.matcher.matches(&shown, title).accepted => AggregatorRecord {
                url: target.url,
                title: shown,
                found: true,
                rating: scores.rating,
                top_critic_average: scores.top_critic_average,
                critics_recommend: scores.critics_recommend,
            },
            Some(_) => {
                debug!("OpenCritic: '{shown}' rejected for '{title}'");
                AggregatorRecord::default()
            }
            None => {
                info!("OpenCritic: score block missing on {}", target.url);
                AggregatorRecord::default()
            }
        };
        if record.found {
            info!("OpenCritic: found '{}' at {}", record.title, record.url);
        }
        SourceRecord::Aggregator(record)
    }
}

fn find_search_result(html: &str, title: &str, base: &str, ctx: &HuntContext) -> Option<AggregatorTarget> {
    let doc = Html::parse_document(html);
    let name_sel = sel("div.col-9");
    let link_sel = sel(&format!("{RESULTS} a[href]"));
    let mut results: Vec<(String, &str)> = doc
        .select(&link_sel)
        .filter_map(|link| {
            let name = link.select(&name_sel).next().map(text_of)?;
            Some((name, link.value().attr("href").unwrap_or_default().trim()))
        })
        .collect();

    let index = ctx.matcher.first_match(results.iter().map(|(name, _)| name), title)?;
    let (name, href) = results.swap_remove(index);
    Some(AggregatorTarget {
        url: absolutize(href, base),
        listed_title: name,
    })
}

/// Page title and score block of a game page.
///
/// The score block is `None` when the tier badge is missing or either
/// score orb does not parse.
pub fn parse_game_page(html: &str) -> (Option<String>, Option<ScoreBlock>) {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&sel("h1.my-2"))
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty());
    (title, parse_scores(&doc))
}

fn parse_scores(doc: &Html) -> Option<ScoreBlock> {
    let rating = doc
        .select(&sel("app-tier-display.mighty-score img"))
        .next()?
        .value()
        .attr("alt")?
        .trim()
        .to_string();

    let orb = sel("div.inner-orb");
    let columns: Vec<_> = doc
        .select(&sel("app-game-scores-display div.col-4"))
        .collect();
    let average = text_of(columns.first()?.select(&orb).next()?);
    let recommend = text_of(columns.get(1)?.select(&orb).next()?);

    Some(ScoreBlock {
        rating,
        top_critic_average: average.parse().ok()?,
        critics_recommend: parse_recommend(&recommend)?,
    })
}

/// "89%" → 89, "?" → 0.
fn parse_recommend(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.contains('?') {
        return Some(0);
    }
    text.trim_end_matches('%').trim().parse().ok()
}
