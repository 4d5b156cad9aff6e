//! Reception box parsing (aggregate scores and critic reviews).

use crate::html::{first_direct_text, sel, strip_citation, text_excluding, text_of};
use crate::types::ReviewScore;
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reception {
    pub aggregators: Vec<(String, Vec<String>)>,
    pub reviews: Vec<(String, ReviewScore)>,
}

impl Reception {
    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty() && self.reviews.is_empty()
    }
}

pub fn parse_reception(doc: &Html) -> Reception {
    let mut reception = Reception::default();
    let Some(block) = doc.select(&sel("div.video-game-reviews")).next() else {
        return reception;
    };

    for table in block.select(&sel("table")) {
        let classes: Vec<&str> = table.value().classes().collect();
        if classes.contains(&"vgr-aggregators") {
            reception.aggregators.extend(aggregator_rows(table));
        }
        if classes.contains(&"vgr-reviews") {
            reception.reviews.extend(review_rows(table));
        }
    }
    reception
}

fn aggregator_rows(table: ElementRef<'_>) -> Vec<(String, Vec<String>)> {
    let th_sel = sel("th");
    let td_sel = sel("td");
    let rows = table
        .select(&sel("tr"))
        .filter(|row| row.select(&th_sel).next().is_none())
        .filter(|row| !text_of(*row).contains("Aggregator"))
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
            let (name, scores) = cells.split_first()?;
            let scores = scores
                .iter()
                .filter_map(|td| {
                    first_direct_text(*td)
                        .or_else(|| Some(text_excluding(*td, &["sup"])))
                        .map(|s| strip_citation(&s))
                        .filter(|s| !s.is_empty())
                })
                .collect();
            Some((strip_citation(&text_of(*name)), scores))
        })
        .collect();
    rows
}

fn review_rows(table: ElementRef<'_>) -> Vec<(String, ReviewScore)> {
    let td_sel = sel("td");
    let rows = table
        .select(&sel("tr"))
        .filter(|row| !text_of(*row).contains("Publication"))
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
            let (name, scores) = cells.split_first()?;
            let name = strip_citation(&text_of(*name));
            let score = match scores {
                [] => return None,
                [single] => ReviewScore::Single(score_text(*single)),
                many => ReviewScore::Multiple(many.iter().map(|td| score_text(*td)).collect()),
            };
            Some((name, score))
        })
        .collect();
    rows
}

/// Star ratings carry the score in a `title` attribute; everything else is
/// the cell text without footnotes.
fn score_text(td: ElementRef<'_>) -> String {
    if let Some(title) = td
        .select(&sel("span[title]"))
        .next()
        .and_then(|span| span.value().attr("title"))
    {
        return title.trim().to_string();
    }
    strip_citation(&text_excluding(td, &["sup", "br"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEPTION: &str = r#"<html><body><div class="video-game-reviews"><table class="vgr-aggregators">
        <tr><th colspan="2">Aggregate score</th></tr>
        <tr><td>Aggregator</td><td>Score</td></tr>
        <tr><td>Metacritic</td><td>NS: 90/100<sup>[52]</sup><br>PC: 87/100<sup>[53]</sup></td></tr>
        <tr><td>OpenCritic</td><td>91% recommend<sup>[54]</sup></td></tr>
      </table>
      <table class="vgr-reviews">
        <tr><td>Publication</td><td>Score</td></tr>
        <tr><td>Destructoid</td><td>9/10<sup>[55]</sup></td></tr>
        <tr><td>GameSpot</td><td><span role="img" title="4.5/5 stars"><span>★★★★½</span></span></td></tr>
        <tr><td>IGN</td><td>9.4/10</td><td>9.0/10</td></tr>
      </table></div></body></html>"#;

    #[test]
    fn test_aggregator_rows() {
        let reception = parse_reception(&Html::parse_document(RECEPTION));
        assert_eq!(
            reception.aggregators,
            vec![
                ("Metacritic".to_string(), vec!["NS: 90/100".to_string()]),
                ("OpenCritic".to_string(), vec!["91% recommend".to_string()]),
            ]
        );
    }

    #[test]
    fn test_review_rows() {
        let reception = parse_reception(&Html::parse_document(RECEPTION));
        assert_eq!(
            reception.reviews,
            vec![
                ("Destructoid".to_string(), ReviewScore::Single("9/10".to_string())),
                ("GameSpot".to_string(), ReviewScore::Single("4.5/5 stars".to_string())),
                (
                    "IGN".to_string(),
                    ReviewScore::Multiple(vec!["9.4/10".to_string(), "9.0/10".to_string()])
                ),
            ]
        );
    }

    #[test]
    fn test_no_reception_block() {
        let reception = parse_reception(&Html::parse_document("<html><body><p>x</p></body></html>"));
        assert!(reception.is_empty());
    }
}
