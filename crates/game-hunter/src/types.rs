//! Core data types: sources, per-source records and encyclopedia values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder for a storefront review tier with no data.
pub const NO_USER_REVIEW: &str = "No user review";
/// Placeholder for a missing storefront header image.
pub const NO_IMAGE_URL: &str = "NO IMAGE URL FOUND";
/// Placeholder for a missing aggregator rating label.
pub const NO_RATING: &str = "None";
/// Release value when the infobox has no usable date.
pub const NO_CONFIRMED_RELEASE: &str = "No Confirmed Release Date";

/// One of the three external data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Digital storefront (Steam).
    Storefront,
    /// Review aggregator (OpenCritic).
    Aggregator,
    /// Encyclopedia (Wikipedia).
    Encyclopedia,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Storefront, Source::Aggregator, Source::Encyclopedia];

    /// Short machine name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Storefront => "storefront",
            Source::Aggregator => "aggregator",
            Source::Encyclopedia => "encyclopedia",
        }
    }

    /// Human-facing site name.
    pub fn site(&self) -> &'static str {
        match self {
            Source::Storefront => "Steam",
            Source::Aggregator => "OpenCritic",
            Source::Encyclopedia => "Wikipedia",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "storefront" | "steam" => Ok(Source::Storefront),
            "aggregator" | "opencritic" | "oc" => Ok(Source::Aggregator),
            "encyclopedia" | "wikipedia" | "wiki" => Ok(Source::Encyclopedia),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

/// One storefront review tier (all-time or last 30 days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTier {
    /// Sentiment label, e.g. "Very Positive".
    pub text: String,
    /// Detail line, e.g. "97% of the 234 user reviews ... are positive."
    pub detail: String,
    /// Percentage parsed from the detail line.
    pub score: u8,
}

impl Default for ReviewTier {
    fn default() -> Self {
        Self {
            text: NO_USER_REVIEW.to_string(),
            detail: NO_USER_REVIEW.to_string(),
            score: 0,
        }
    }
}

impl ReviewTier {
    pub fn has_data(&self) -> bool {
        self.text != NO_USER_REVIEW || self.has_detail()
    }

    pub fn has_detail(&self) -> bool {
        self.detail != NO_USER_REVIEW
    }
}

/// Fields extracted from a storefront product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontRecord {
    pub url: String,
    pub title: String,
    pub found: bool,
    pub all_reviews: ReviewTier,
    pub recent_reviews: ReviewTier,
    pub release_date: String,
    pub image_url: String,
}

impl Default for StorefrontRecord {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            found: false,
            all_reviews: ReviewTier::default(),
            recent_reviews: ReviewTier::default(),
            release_date: String::new(),
            image_url: NO_IMAGE_URL.to_string(),
        }
    }
}

/// Fields extracted from a review aggregator game page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorRecord {
    pub url: String,
    pub title: String,
    pub found: bool,
    /// Tier label such as "Mighty" or "Strong".
    pub rating: String,
    pub top_critic_average: u32,
    pub critics_recommend: u32,
}

impl Default for AggregatorRecord {
    fn default() -> Self {
        Self {
            url: String::new(),
            title: String::new(),
            found: false,
            rating: NO_RATING.to_string(),
            top_critic_average: 0,
            critics_recommend: 0,
        }
    }
}

/// Release information from an encyclopedia infobox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReleaseInfo {
    /// A single free-text date.
    Text(String),
    /// Several dates without platform attribution.
    Dates(Vec<String>),
    /// Dates grouped by platform, in page order.
    ByPlatform(Vec<PlatformRelease>),
    /// No usable release data on the page.
    Unconfirmed,
}

/// Release dates for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRelease {
    pub platform: String,
    pub dates: Vec<String>,
}

/// Value of one encyclopedia infobox category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Text(String),
    List(Vec<String>),
    Release(ReleaseInfo),
}

impl InfoValue {
    pub fn is_empty(&self) -> bool {
        match self {
            InfoValue::Text(s) => s.trim().is_empty(),
            InfoValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            InfoValue::Release(_) => false,
        }
    }
}

/// Infobox categories with a dedicated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoField {
    Developers,
    Publishers,
    Directors,
    Producers,
    Designers,
    Programmers,
    Artists,
    Writers,
    Composers,
    Engine,
    Platforms,
    Release,
    Genres,
    Modes,
    Series,
}

impl InfoField {
    pub const ALL: [InfoField; 15] = [
        InfoField::Developers,
        InfoField::Publishers,
        InfoField::Directors,
        InfoField::Producers,
        InfoField::Designers,
        InfoField::Programmers,
        InfoField::Artists,
        InfoField::Writers,
        InfoField::Composers,
        InfoField::Engine,
        InfoField::Platforms,
        InfoField::Release,
        InfoField::Genres,
        InfoField::Modes,
        InfoField::Series,
    ];

    /// Map an infobox row label ("Developer(s)", "Publisher", "Genres") to a field.
    pub fn from_label(label: &str) -> Option<InfoField> {
        let key = label.trim().to_lowercase().replace("(s)", "");
        let key = key.trim();
        let field = match key {
            "developer" | "developers" => InfoField::Developers,
            "publisher" | "publishers" => InfoField::Publishers,
            "director" | "directors" => InfoField::Directors,
            "producer" | "producers" => InfoField::Producers,
            "designer" | "designers" => InfoField::Designers,
            "programmer" | "programmers" => InfoField::Programmers,
            "artist" | "artists" => InfoField::Artists,
            "writer" | "writers" => InfoField::Writers,
            "composer" | "composers" => InfoField::Composers,
            "engine" | "engines" => InfoField::Engine,
            "platform" | "platforms" => InfoField::Platforms,
            "release" | "releases" | "release date" | "release dates" => InfoField::Release,
            "genre" | "genres" => InfoField::Genres,
            "mode" | "modes" => InfoField::Modes,
            "series" => InfoField::Series,
            _ => return None,
        };
        Some(field)
    }
}

/// A critic review score: one value, or several for multi-platform reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewScore {
    Single(String),
    Multiple(Vec<String>),
}

/// Fields extracted from an encyclopedia article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncyclopediaRecord {
    pub url: String,
    pub title: String,
    pub found: bool,
    pub fields: BTreeMap<InfoField, InfoValue>,
    /// Infobox categories without a dedicated field, keyed by their page label.
    pub extra: BTreeMap<String, InfoValue>,
    pub image_url: Option<String>,
    /// Aggregator name to its score strings, in table order.
    pub aggregator_scores: Vec<(String, Vec<String>)>,
    /// Publication name to its score, in table order.
    pub critic_reviews: Vec<(String, ReviewScore)>,
}

impl EncyclopediaRecord {
    pub fn field(&self, field: InfoField) -> Option<&InfoValue> {
        self.fields.get(&field)
    }
}

/// The outcome of one source for one title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SourceRecord {
    Storefront(StorefrontRecord),
    Aggregator(AggregatorRecord),
    Encyclopedia(EncyclopediaRecord),
}

impl SourceRecord {
    /// A fully-default record signalling no acceptable match.
    pub fn not_found(source: Source) -> Self {
        match source {
            Source::Storefront => SourceRecord::Storefront(StorefrontRecord::default()),
            Source::Aggregator => SourceRecord::Aggregator(AggregatorRecord::default()),
            Source::Encyclopedia => SourceRecord::Encyclopedia(EncyclopediaRecord::default()),
        }
    }

    pub fn source(&self) -> Source {
        match self {
            SourceRecord::Storefront(_) => Source::Storefront,
            SourceRecord::Aggregator(_) => Source::Aggregator,
            SourceRecord::Encyclopedia(_) => Source::Encyclopedia,
        }
    }

    pub fn found(&self) -> bool {
        match self {
            SourceRecord::Storefront(r) => r.found,
            SourceRecord::Aggregator(r) => r.found,
            SourceRecord::Encyclopedia(r) => r.found,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            SourceRecord::Storefront(r) => &r.url,
            SourceRecord::Aggregator(r) => &r.url,
            SourceRecord::Encyclopedia(r) => &r.url,
        }
    }

    /// Title as shown on the source page.
    pub fn title(&self) -> &str {
        match self {
            SourceRecord::Storefront(r) => &r.title,
            SourceRecord::Aggregator(r) => &r.title,
            SourceRecord::Encyclopedia(r) => &r.title,
        }
    }
}

/// A registered title with its persistence metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    pub title: String,
    pub last_update: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_str_aliases() {
        assert_eq!("steam".parse::<Source>().unwrap(), Source::Storefront);
        assert_eq!("OC".parse::<Source>().unwrap(), Source::Aggregator);
        assert_eq!(" Wikipedia ".parse::<Source>().unwrap(), Source::Encyclopedia);
        assert!("metacritic".parse::<Source>().is_err());
    }

    #[test]
    fn test_info_field_labels() {
        assert_eq!(InfoField::from_label("Developer(s)"), Some(InfoField::Developers));
        assert_eq!(InfoField::from_label("Publisher"), Some(InfoField::Publishers));
        assert_eq!(InfoField::from_label("Mode(s)"), Some(InfoField::Modes));
        assert_eq!(InfoField::from_label("Series"), Some(InfoField::Series));
        assert_eq!(InfoField::from_label("Release"), Some(InfoField::Release));
        assert_eq!(InfoField::from_label("Arcade system"), None);
    }

    #[test]
    fn test_not_found_records_are_default() {
        for source in Source::ALL {
            let record = SourceRecord::not_found(source);
            assert_eq!(record.source(), source);
            assert!(!record.found());
            assert!(record.url().is_empty());
        }
        match SourceRecord::not_found(Source::Storefront) {
            SourceRecord::Storefront(r) => {
                assert_eq!(r.all_reviews.text, NO_USER_REVIEW);
                assert_eq!(r.image_url, NO_IMAGE_URL);
                assert!(!r.all_reviews.has_data());
            }
            _ => unreachable!(),
        }
    }
}
