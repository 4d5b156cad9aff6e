//! Site-scoped web search used when a site's own search comes up empty.
//!
//! The search engine page is rendered in a browser session; only the top
//! three organic results are considered, in order.

use crate::browser::BrowserSession;
use crate::fetch::encode_query;
use crate::html::{sel, text_of};
use crate::matcher::TitleMatcher;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::HuntContext;

const RESULT_ITEM: &str = r#"li[data-layout="organic"]"#;
const TOP_RESULTS: usize = 3;

/// Search-engine URL for `site:<domain> <title>`.
pub fn search_url(base: &str, domain: &str, title: &str) -> String {
    format!(
        "{}/?t=ffab&q=site%3A{}+{}&ia=web",
        base.trim_end_matches('/'),
        domain,
        encode_query(title)
    )
}

/// Run the query in a fresh browser session and return the first result
/// link containing `url_marker` whose block mentions `title`.
pub async fn find_link(
    ctx: &HuntContext,
    base: &str,
    domain: &str,
    title: &str,
    url_marker: &str,
) -> Option<String> {
    let mut session = match BrowserSession::open(ctx.browser.as_ref(), ctx.nav_timeout).await {
        Ok(s) => s,
        Err(e) => {
            warn!("search engine fallback unavailable: {e}");
            return None;
        }
    };
    let html = results_html(&mut session, ctx, &search_url(base, domain, title)).await;
    session.release().await;

    let link = pick_result(&html?, title, url_marker, &ctx.matcher)?;
    fix_app_url(&link)
}

async fn results_html(session: &mut BrowserSession, ctx: &HuntContext, url: &str) -> Option<String> {
    if let Err(e) = session.navigate(url).await {
        debug!("search engine navigation failed: {e}");
        return None;
    }
    if !session.wait_for(RESULT_ITEM, ctx.element_timeout).await {
        return None;
    }
    session.html().await.ok()
}

/// Pick the first of the top results whose text mentions `title` and that
/// links to a URL containing `url_marker`.
pub fn pick_result(html: &str, title: &str, url_marker: &str, matcher: &TitleMatcher) -> Option<String> {
    let doc = Html::parse_document(html);
    let span_sel = sel("span");
    let link_sel = sel("a[href]");

    for item in doc.select(&sel(RESULT_ITEM)).take(TOP_RESULTS) {
        let mentioned = item
            .select(&span_sel)
            .any(|span| matcher.matches_snippet(&text_of(span), title).accepted);
        if !mentioned {
            continue;
        }
        let link = item
            .select(&link_sel)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.contains(url_marker));
        if let Some(href) = link {
            return Some(href.to_string());
        }
    }
    None
}

/// Reduce a product link to `scheme://host/app/<id>/<slug>`, or
/// `scheme://host/app/<id>/` when the link carries no slug.
pub fn fix_app_url(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let host = parsed.host_str()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let kind = segments.next()?;
    let id = segments.next()?;
    let base = format!("{}://{host}/{kind}/{id}", parsed.scheme());
    Some(match segments.next() {
        Some(slug) => format!("{base}/{slug}"),
        None => format!("{base}/"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, href: &str) -> String {
        format!(
            r#"<li data-layout="organic"><article><h2><a href="{href}"><span>{text}</span></a></h2><div><span>Some description.</span></div></article></li>"#
        )
    }

    #[test]
    fn test_search_url() {
        assert_eq!(
            search_url("https://duckduckgo.com/", "store.steampowered.com", "Hollow Knight"),
            "https://duckduckgo.com/?t=ffab&q=site%3Astore.steampowered.com+Hollow+Knight&ia=web"
        );
    }

    #[test]
    fn test_pick_result_skips_unrelated_and_stops_at_three() {
        let html = format!(
            "<ul>{}{}{}{}</ul>",
            result("Doom Eternal on Steam", "https://store.steampowered.com/app/782330/DOOM_Eternal/"),
            result("Hollow Knight news", "https://example.com/hollow"),
            result("Hollow Knight on Steam", "https://store.steampowered.com/app/367520/Hollow_Knight/?l=en"),
            result("Hollow Knight Silksong", "https://store.steampowered.com/app/1030300/Silksong/"),
        );
        let link = pick_result(&html, "Hollow Knight", "store.steampowered.com/app", &TitleMatcher::default());
        assert_eq!(
            link.as_deref(),
            Some("https://store.steampowered.com/app/367520/Hollow_Knight/?l=en")
        );
    }

    #[test]
    fn test_pick_result_ignores_fourth_result() {
        let html = format!(
            "<ul>{}{}{}{}</ul>",
            result("Tetris", "https://example.com/a"),
            result("Tetris", "https://example.com/b"),
            result("Tetris", "https://example.com/c"),
            result("Celeste on Steam", "https://store.steampowered.com/app/504230/Celeste/"),
        );
        assert!(pick_result(&html, "Celeste", "store.steampowered.com/app", &TitleMatcher::default()).is_none());
    }

    #[test]
    fn test_fix_app_url() {
        assert_eq!(
            fix_app_url("https://store.steampowered.com/app/367520/Hollow_Knight/?l=en").as_deref(),
            Some("https://store.steampowered.com/app/367520/Hollow_Knight")
        );
        assert_eq!(fix_app_url("https://store.steampowered.com/app"), None);
        assert_eq!(fix_app_url("https://store.steampowered.com/app/"), None);
        assert_eq!(fix_app_url("not a url"), None);
    }

    #[test]
    fn test_fix_app_url_without_slug() {
        assert_eq!(
            fix_app_url("https://store.steampowered.com/app/367520/").as_deref(),
            Some("https://store.steampowered.com/app/367520/")
        );
        assert_eq!(
            fix_app_url("https://store.steampowered.com/app/367520").as_deref(),
            Some("https://store.steampowered.com/app/367520/")
        );
    }

    #[test]
    fn test_slugless_result_survives_cleanup() {
        let html = format!(
            "<ul>{}</ul>",
            result("Hollow Knight on Steam", "https://store.steampowered.com/app/367520/")
        );
        let link = pick_result(&html, "Hollow Knight", "store.steampowered.com/app", &TitleMatcher::default())
            .and_then(|l| fix_app_url(&l));
        assert_eq!(link.as_deref(), Some("https://store.steampowered.com/app/367520/"));
    }

    #[test]
    fn test_pick_result_accepts_snippet_sentence() {
        let html = format!(
            "<ul>{}</ul>",
            result("Save 50% now. Hollow Knigt. Buy today", "https://store.steampowered.com/app/367520/Hollow_Knight/")
        );
        assert!(pick_result(&html, "Hollow Knight", "store.steampowered.com/app", &TitleMatcher::default()).is_some());
    }
}
