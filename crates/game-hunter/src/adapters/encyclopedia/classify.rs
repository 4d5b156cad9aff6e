//! Search-result page classification.

use crate::html::{sel, text_of};
use crate::matcher::TitleMatcher;
use scraper::Html;

/// What the internal search landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// An article with a video game infobox.
    DirectHit,
    /// A franchise page with a release timeline.
    SeriesIndex,
    /// A results list; the series entry must be followed.
    DisambiguationList,
    NotFound,
}

/// Classify a page. Checks run in a fixed order; the first hit wins.
pub fn classify(html: &str) -> PageKind {
    let doc = Html::parse_document(html);
    let has = |css: &str| doc.select(&sel(css)).next().is_some();

    if has("table.release-timeline") && has("table.hproduct") {
        return PageKind::SeriesIndex;
    }
    if has("h2#Most_commonly") {
        return PageKind::DisambiguationList;
    }
    if let Some(p) = doc.select(&sel("p.mw-search-createlink")).next() {
        if text_of(p).contains("does not exist") {
            return PageKind::NotFound;
        }
    }
    if has("table.ib-video-game") {
        return PageKind::DirectHit;
    }
    PageKind::NotFound
}

/// Link of the first timeline entry whose title matches.
pub fn series_entry_link(html: &str, title: &str, matcher: &TitleMatcher) -> Option<String> {
    let doc = Html::parse_document(html);
    let table = doc.select(&sel("table.release-timeline")).next()?;
    let td_sel = sel("td");
    let link_sel = sel("a[href]");

    let entries: Vec<(String, Option<String>)> = table
        .select(&sel("tr"))
        .filter_map(|row| row.select(&td_sel).next())
        .map(|cell| {
            let href = cell
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);
            (text_of(cell), href)
        })
        .collect();

    let index = matcher.first_match(entries.iter().map(|(name, _)| name), title)?;
    entries.into_iter().nth(index).and_then(|(_, href)| href)
}

/// Link of the first list item describing a video game series.
pub fn disambiguation_series_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let link_sel = sel("a[href]");
    let link = doc
        .select(&sel("li"))
        .find(|li| text_of(*li).contains("video game series"))
        .and_then(|li| li.select(&link_sel).next())
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);
    link
}
