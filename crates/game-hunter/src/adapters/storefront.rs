//! Storefront adapter (Steam).
//!
//! Search goes through the store's own search page, then falls back to a
//! site-scoped web search. Product pages are parsed from a plain fetch; when
//! that yields nothing or no release date (usually an age gate), the page is
//! loaded in a browser, the gate is passed, and the live DOM is re-parsed.

use super::{search_engine, HuntContext, SourceAdapter};
use crate::browser::BrowserSession;
use crate::fetch::encode_query;
use crate::html::{collapse_ws, sel, text_of};
use crate::types::{ReviewTier, Source, SourceRecord, StorefrontRecord, NO_IMAGE_URL};
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

const RECENT_MARKER: &str = "last 30 days";
const ALL_LANGUAGES_MARKER: &str = "Total reviews in all languages:";
const ADULT_BIRTH_YEAR: &str = "1980";

/// A located product page.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontTarget {
    pub url: String,
    /// Title shown on the search result that led here, if any.
    pub listed_title: Option<String>,
}

/// Everything parsed from one product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorePage {
    pub title: Option<String>,
    pub all_reviews: ReviewTier,
    pub recent_reviews: ReviewTier,
    pub release_date: String,
    pub image_url: Option<String>,
}

impl StorePage {
    pub fn has_reviews(&self) -> bool {
        self.all_reviews.has_data() || self.recent_reviews.has_data()
    }

    /// At least one of reviews, release date or image was found.
    pub fn has_any(&self) -> bool {
        self.has_reviews() || !self.release_date.trim().is_empty() || self.image_url.is_some()
    }
}

pub struct StorefrontAdapter {
    ctx: HuntContext,
    base: String,
    search_engine_base: String,
    domain: String,
}

impl StorefrontAdapter {
    pub fn new(ctx: HuntContext, base: &str, search_engine_base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        let domain = base
            .split("://")
            .nth(1)
            .unwrap_or(base.as_str())
            .to_string();
        Self {
            ctx,
            base,
            search_engine_base: search_engine_base.to_string(),
            domain,
        }
    }

    fn search_url(&self, title: &str) -> String {
        format!("{}/search/?term={}", self.base, encode_query(title))
    }

    /// Load the page in a browser, pass the age gate and parse the live DOM.
    async fn extract_live(&self, url: &str) -> Option<StorePage> {
        let mut session = match BrowserSession::open(self.ctx.browser.as_ref(), self.ctx.nav_timeout).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Steam: browser unavailable for {url}: {e}");
                return None;
            }
        };
        let html = self.live_html(&mut session, url).await;
        session.release().await;
        html.map(|h| parse_store_page(&h))
    }

    async fn live_html(&self, session: &mut BrowserSession, url: &str) -> Option<String> {
        if let Err(e) = session.navigate(url).await {
            debug!("Steam: browser navigation to {url} failed: {e}");
            return None;
        }
        if session.exists("#error_box").await {
            info!("Steam: store page reports an error for {url}");
            return None;
        }
        if session.exists(".agegate_birthday_desc").await {
            debug!("Steam: passing age gate on {url}");
            if let Err(e) = session.select_option("#ageYear", ADULT_BIRTH_YEAR).await {
                debug!("Steam: age gate year select failed: {e}");
            }
            if let Err(e) = session.click("#view_product_page_btn").await {
                debug!("Steam: age gate submit failed: {e}");
                return None;
            }
            session.wait_for("#appHubAppName", self.ctx.element_timeout).await;
        }
        session.html().await.ok()
    }
}

#[async_trait]
impl SourceAdapter for StorefrontAdapter {
    type Target = StorefrontTarget;

    fn source(&self) -> Source {
        Source::Storefront
    }

    async fn search(&self, title: &str) -> Option<StorefrontTarget> {
        if let Some(body) = self.ctx.fetch.get(&self.search_url(title)).await {
            if let Some(target) = find_search_result(&body, title, &self.ctx) {
                return Some(target);
            }
        }

        debug!("Steam: store search missed '{title}', trying web search");
        tokio::time::sleep(self.ctx.settle).await;
        let marker = format!("{}/app", self.domain);
        let url = search_engine::find_link(
            &self.ctx,
            &self.search_engine_base,
            &self.domain,
            title,
            &marker,
        )
        .await?;
        Some(StorefrontTarget {
            url,
            listed_title: None,
        })
    }

    async fn extract(&self, target: StorefrontTarget, title: &str) -> SourceRecord {
        let fetched = self.ctx.fetch.get(&target.url).await;
        let mut page = fetched.as_deref().map(parse_store_page).unwrap_or_default();

        if fetched.is_none() || page.release_date.trim().is_empty() || !page.has_any() {
            info!("Steam: rechecking {} in a browser", target.url);
            if let Some(live) = self.extract_live(&target.url).await {
                if live.has_any() {
                    page = live;
                }
            }
        }

        let record = build_record(page, &target, title, &self.ctx);
        if record.found {
            info!("Steam: found '{}' at {}", record.title, record.url);
        } else {
            info!("Steam: no usable page for '{title}'");
        }
        SourceRecord::Storefront(record)
    }
}

/// Apply the title gate and turn a parsed page into a record.
fn build_record(page: StorePage, target: &StorefrontTarget, title: &str, ctx: &HuntContext) -> StorefrontRecord {
    let shown = page
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| target.listed_title.clone());
    let Some(shown) = shown else {
        return StorefrontRecord::default();
    };
    if !page.has_any() || !ctx.matcher.matches(&shown, title).accepted {
        debug!("Steam: '{shown}' rejected for '{title}'");
        return StorefrontRecord::default();
    }

    StorefrontRecord {
        url: target.url.clone(),
        title: shown,
        found: true,
        all_reviews: page.all_reviews,
        recent_reviews: page.recent_reviews,
        release_date: page.release_date,
        image_url: page.image_url.unwrap_or_else(|| NO_IMAGE_URL.to_string()),
    }
}

/// First search row whose title matches, with the tracking suffix removed.
fn find_search_result(html: &str, title: &str, ctx: &HuntContext) -> Option<StorefrontTarget> {
    let doc = Html::parse_document(html);
    let title_sel = sel("span.title");
    let mut rows: Vec<(String, &str)> = Vec::new();
    for row in doc.select(&sel("#search_results a.search_result_row")) {
        let Some(href) = row.value().attr("href") else {
            continue;
        };
        rows.extend(row.select(&title_sel).map(|span| (text_of(span), href)));
    }

    let index = ctx.matcher.first_match(rows.iter().map(|(listed, _)| listed), title)?;
    let (listed, href) = rows.swap_remove(index);
    let url = href.split("?snr=").next().unwrap_or(href).to_string();
    Some(StorefrontTarget {
        url,
        listed_title: Some(listed),
    })
}

/// Parse a product page, static or live.
pub fn parse_store_page(html: &str) -> StorePage {
    let doc = Html::parse_document(html);
    let mut page = StorePage {
        title: doc
            .select(&sel("#appHubAppName"))
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty()),
        ..Default::default()
    };

    for span in doc.select(&sel("span.game_review_summary")) {
        let Some(tooltip) = span.value().attr("data-tooltip-html") else {
            continue;
        };
        if tooltip.contains(RECENT_MARKER) {
            page.recent_reviews.text = text_of(span);
        } else {
            page.all_reviews.text = text_of(span);
        }
    }

    for span in doc.select(&sel("span.responsive_reviewdesc")) {
        let detail = text_of(span);
        let detail = detail.trim_start_matches('-').trim().to_string();
        if detail.is_empty() {
            continue;
        }
        if detail.contains(RECENT_MARKER) {
            page.recent_reviews.detail = detail;
        } else {
            page.all_reviews.detail = detail;
        }
    }

    // Summary rows carry the detail line in their tooltip on the live page.
    for row in doc.select(&sel("#userReviews a.user_reviews_summary_row")) {
        let Some(tooltip) = row.value().attr("data-tooltip-html") else {
            continue;
        };
        let label = text_of(row).to_uppercase();
        let tooltip = collapse_ws(tooltip);
        if label.contains("RECENT REVIEWS:") && !page.recent_reviews.has_detail() {
            page.recent_reviews.detail = tooltip;
        } else if label.contains("ALL REVIEWS:") && !page.all_reviews.has_detail() {
            page.all_reviews.detail = tooltip;
        }
    }

    let summary_sel = sel(".game_review_summary");
    for block in doc.select(&sel("div.outlier_totals")) {
        if !text_of(block).contains(ALL_LANGUAGES_MARKER) {
            continue;
        }
        if let Some(span) = block.select(&summary_sel).next() {
            page.all_reviews.text = text_of(span);
            if let Some(tooltip) = span.value().attr("data-tooltip-html") {
                page.all_reviews.detail = collapse_ws(tooltip);
            }
        }
    }

    for tier in [&mut page.all_reviews, &mut page.recent_reviews] {
        if tier.has_detail() {
            tier.score = score_from_review_text(&tier.detail);
        }
    }

    page.release_date = doc
        .select(&sel("div.date"))
        .next()
        .map(text_of)
        .unwrap_or_default();
    page.image_url = doc
        .select(&sel("img.game_header_image_full"))
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    page
}

/// Numeric score from a review detail line.
///
/// "Need more user reviews" scores 1, "No user reviews" scores 0, otherwise
/// the first percentage in the text (0 if there is none).
pub fn score_from_review_text(text: &str) -> u8 {
    static PERCENT: OnceLock<Regex> = OnceLock::new();
    if text.contains("Need more user reviews") {
        return 1;
    }
    if text.contains("No user reviews") {
        return 0;
    }
    let re = PERCENT.get_or_init(|| Regex::new(r"(\d{1,3})%").expect("percent regex is valid"));
    re.captures(text)
        .and_then(|c| c[1].parse::<u16>().ok())
        .map(|n| n.min(100) as u8)
        .unwrap_or(0)
}
