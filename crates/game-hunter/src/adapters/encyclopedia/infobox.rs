//! Infobox parsing: category rows and the release date layouts.
//!
//! Release cells come in several layouts. They are tried in a fixed order
//! and the first parser that recognizes the cell wins:
//!
//! 1. bold platform names paired with their own `div.plainlist` date lists
//! 2. alternating `li` items, platform then date
//! 3. a flat list of dates
//! 4. plain text

use crate::html::{sel, strip_citation, text_of};
use crate::types::{InfoField, InfoValue, PlatformRelease, ReleaseInfo};
use scraper::{ElementRef, Html, Node, Selector};

/// Parsed contents of the first video game infobox on a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Infobox {
    /// Text of the first infobox row.
    pub title: Option<String>,
    /// Category rows in page order, keyed by their label.
    pub rows: Vec<(String, InfoValue)>,
    pub image: Option<String>,
}

impl Infobox {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.image.is_none()
    }
}

pub fn parse_infobox(doc: &Html) -> Infobox {
    let mut infobox = Infobox::default();
    let tr_sel = sel("tr");
    let th_sel = sel("th");
    let td_sel = sel("td");
    let img_sel = sel("img.mw-file-element");

    for table in doc.select(&sel("table.ib-video-game")) {
        if infobox.title.is_none() {
            infobox.title = table
                .select(&tr_sel)
                .next()
                .map(text_of)
                .filter(|t| !t.is_empty());
        }

        for row in table.select(&tr_sel) {
            if infobox.image.is_none() {
                infobox.image = row
                    .select(&img_sel)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .map(str::to_string);
            }

            let (Some(th), Some(td)) = (row.select(&th_sel).next(), row.select(&td_sel).next()) else {
                continue;
            };
            let label = text_of(th);
            if label.is_empty() {
                continue;
            }
            let value = if InfoField::from_label(&label) == Some(InfoField::Release) {
                InfoValue::Release(parse_release(td))
            } else {
                parse_value(td)
            };
            infobox.rows.push((label, value));
        }
    }
    infobox
}

/// A category cell: `ul` items, `br`-separated lines, or plain text.
fn parse_value(td: ElementRef<'_>) -> InfoValue {
    if td.select(&sel("ul")).next().is_some() {
        return InfoValue::List(li_texts(td, &sel("li")));
    }
    if td.select(&sel("br")).next().is_some() {
        return InfoValue::List(split_on_br(td));
    }
    InfoValue::Text(strip_citation(&text_of(td)))
}

/// Split a cell's direct children into lines at each `<br>`.
fn split_on_br(td: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for child in td.children() {
        match child.value() {
            Node::Element(e) if e.name() == "br" => {
                lines.push(std::mem::take(&mut current));
            }
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    current.push_str(&el.text().collect::<String>());
                }
            }
            Node::Text(t) => current.push_str(t),
            _ => {}
        }
    }
    lines.push(current);
    lines
        .iter()
        .map(|l| strip_citation(&crate::html::collapse_ws(l)))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Parse a release cell with the layout parsers in priority order.
pub fn parse_release(td: ElementRef<'_>) -> ReleaseInfo {
    let parsers: [fn(ElementRef<'_>) -> Option<ReleaseInfo>; 4] =
        [bold_platform_lists, alternating_pairs, flat_list, plain_text];
    parsers
        .iter()
        .find_map(|parse| parse(td))
        .unwrap_or(ReleaseInfo::Unconfirmed)
}

fn li_texts(el: ElementRef<'_>, li_sel: &Selector) -> Vec<String> {
    el.select(li_sel)
        .map(|li| strip_citation(&text_of(li)))
        .filter(|s| !s.is_empty())
        .collect()
}

/// `<b>Platform</b>` headings, each followed by a `div.plainlist` of dates.
/// The date lists may sit next to the headings or nested inside an outer
/// plainlist; only innermost lists without bold text count.
fn bold_platform_lists(td: ElementRef<'_>) -> Option<ReleaseInfo> {
    let bold_sel = sel("b");
    let list_sel = sel("div.plainlist");
    let li_sel = sel("li");
    let platforms: Vec<String> = td.select(&bold_sel).map(text_of).collect();
    if platforms.is_empty() {
        return None;
    }
    let lists: Vec<ElementRef<'_>> = td
        .select(&list_sel)
        .filter(|list| list.select(&list_sel).next().is_none())
        .filter(|list| list.select(&bold_sel).next().is_none())
        .filter(|list| list.select(&li_sel).next().is_some())
        .collect();
    if lists.len() < platforms.len() {
        return None;
    }
    let releases = platforms
        .into_iter()
        .zip(lists)
        .map(|(platform, list)| PlatformRelease {
            platform: strip_citation(&platform),
            dates: li_texts(list, &li_sel),
        })
        .collect();
    Some(ReleaseInfo::ByPlatform(releases))
}

/// `li` items alternating platform (bold) and date.
fn alternating_pairs(td: ElementRef<'_>) -> Option<ReleaseInfo> {
    let items: Vec<ElementRef<'_>> = td.select(&sel("li")).collect();
    let first = items.first()?;
    if first.select(&sel("b")).next().is_none() || items.len() % 2 != 0 {
        return None;
    }
    let releases = items
        .chunks(2)
        .map(|pair| PlatformRelease {
            platform: strip_citation(&text_of(pair[0])),
            dates: vec![strip_citation(&text_of(pair[1]))],
        })
        .collect();
    Some(ReleaseInfo::ByPlatform(releases))
}

/// A plain list of dates; a single entry collapses to text.
fn flat_list(td: ElementRef<'_>) -> Option<ReleaseInfo> {
    let mut dates = li_texts(td, &sel("li"));
    match dates.len() {
        0 => None,
        1 => dates.pop().map(ReleaseInfo::Text),
        _ => Some(ReleaseInfo::Dates(dates)),
    }
}

fn plain_text(td: ElementRef<'_>) -> Option<ReleaseInfo> {
    let text = strip_citation(&text_of(td));
    (!text.is_empty()).then_some(ReleaseInfo::Text(text))
}
