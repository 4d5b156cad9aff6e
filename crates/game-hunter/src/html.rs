//! Small scraper helpers shared by the page extractors.

use scraper::{ElementRef, Node, Selector};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static SELECTORS: RefCell<HashMap<String, Selector>> = RefCell::new(HashMap::new());
}

/// Parse a selector written in source code, cached per thread.
///
/// Only used with literal selectors, which are known to be valid.
pub(crate) fn sel(css: &str) -> Selector {
    SELECTORS.with(|cache| {
        if let Some(selector) = cache.borrow().get(css) {
            return selector.clone();
        }
        let parsed = Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"));
        cache.borrow_mut().insert(css.to_string(), parsed.clone());
        parsed
    })
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a trailing citation marker such as `[3]` or `[a]`.
pub fn strip_citation(s: &str) -> String {
    s.split('[').next().unwrap_or_default().trim().to_string()
}

/// The first non-blank text node that is a direct child of `el`.
pub(crate) fn first_direct_text(el: ElementRef<'_>) -> Option<String> {
    el.children().find_map(|child| match child.value() {
        Node::Text(t) if !t.trim().is_empty() => Some(collapse_ws(t)),
        _ => None,
    })
}

/// Text of `el`, skipping the contents of any descendant named in `skip`.
pub(crate) fn text_excluding(el: ElementRef<'_>, skip: &[&str]) -> String {
    let mut parts = Vec::new();
    collect_text(el, skip, &mut parts);
    collapse_ws(&parts.join(" "))
}

fn collect_text(el: ElementRef<'_>, skip: &[&str], out: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push(String::from(&**t)),
            Node::Element(e) if skip.contains(&e.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, skip, out);
                }
            }
            _ => {}
        }
    }
}

/// Make a protocol-relative or root-relative URL absolute.
pub(crate) fn absolutize(href: &str, origin: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{}{href}", origin.trim_end_matches('/'))
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_sel_is_cached() {
        let first = sel("div.plainlist li");
        let second = sel("div.plainlist li");
        let doc = Html::parse_fragment(r#"<div class="plainlist"><ul><li>PC</li></ul></div>"#);
        assert_eq!(doc.select(&first).count(), 1);
        assert_eq!(doc.select(&second).count(), 1);
        SELECTORS.with(|cache| assert!(cache.borrow().contains_key("div.plainlist li")));
    }

    #[test]
    fn test_strip_citation() {
        assert_eq!(strip_citation("Nintendo[1]"), "Nintendo");
        assert_eq!(strip_citation("  9/10 [a][b]"), "9/10");
        assert_eq!(strip_citation("plain"), "plain");
    }

    #[test]
    fn test_text_excluding() {
        let doc = Html::parse_fragment("<table><tr><td>8.5/10<sup>[4]</sup><br>PC</td></tr></table>");
        let td = doc.select(&sel("td")).next().unwrap();
        assert_eq!(text_excluding(td, &["sup", "br"]), "8.5/10 PC");
    }

    #[test]
    fn test_first_direct_text() {
        let doc = Html::parse_fragment("<table><tr><td><b>PC:</b> 88/100<sup>[2]</sup></td></tr></table>");
        let td = doc.select(&sel("td")).next().unwrap();
        assert_eq!(first_direct_text(td).as_deref(), Some("88/100"));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize("//upload.example.org/a.png", "https://x.org"), "https://upload.example.org/a.png");
        assert_eq!(absolutize("/wiki/Halo", "https://en.wikipedia.org/"), "https://en.wikipedia.org/wiki/Halo");
        assert_eq!(absolutize("https://a.b/c", "https://x.org"), "https://a.b/c");
    }
}
