//! Column catalogue and the flat-string rendering of source records.
//!
//! Each column has a canonical spreadsheet label ("Steam: All Reviews -
//! Score") and a database name ("SteamAllScore"). Structured values are
//! flattened to `key: value | key: value`, lists to `a | b`, and lists nested
//! inside a keyed value to `a, b`.

use crate::types::{
    InfoField, InfoValue, ReleaseInfo, ReviewScore, SourceRecord, NO_CONFIRMED_RELEASE,
};
use rusqlite::types::Value;
use std::fmt;

pub const NOT_FOUND_TITLE: &str = "Not Found";
pub const NO_URL: &str = "No URL";
pub const NO_DATE: &str = "No Date";
pub const NOT_AVAILABLE: &str = "n/a";

const ENTRY_SEP: &str = " | ";
const NESTED_SEP: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Modes,
    Genres,
    Platforms,
    SteamAllText,
    SteamRecentText,
    OpenCriticRating,
    SteamAllData,
    SteamRecentData,
    SteamAllScore,
    SteamRecentScore,
    OpenCriticAverage,
    OpenCriticRecommend,
    WikiReviews,
    SteamReleaseDate,
    WikiReleaseDate,
    SteamImageUrl,
    WikiImageUrl,
    WikiUrl,
    SteamUrl,
    OpenCriticUrl,
    WikiTitle,
    SteamTitle,
    OpenCriticTitle,
    Series,
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
    ExtraWikiInfo,
    LastUpdate,
}

impl Column {
    /// Every column in schema order.
    pub const ALL: [Column; 37] = [
        Column::Title,
        Column::Modes,
        Column::Genres,
        Column::Platforms,
        Column::SteamAllText,
        Column::SteamRecentText,
        Column::OpenCriticRating,
        Column::SteamAllData,
        Column::SteamRecentData,
        Column::SteamAllScore,
        Column::SteamRecentScore,
        Column::OpenCriticAverage,
        Column::OpenCriticRecommend,
        Column::WikiReviews,
        Column::SteamReleaseDate,
        Column::WikiReleaseDate,
        Column::SteamImageUrl,
        Column::WikiImageUrl,
        Column::WikiUrl,
        Column::SteamUrl,
        Column::OpenCriticUrl,
        Column::WikiTitle,
        Column::SteamTitle,
        Column::OpenCriticTitle,
        Column::Series,
        Column::Developers,
        Column::Publishers,
        Column::Directors,
        Column::Producers,
        Column::Designers,
        Column::Programmers,
        Column::Artists,
        Column::Writers,
        Column::Composers,
        Column::Engine,
        Column::ExtraWikiInfo,
        Column::LastUpdate,
    ];

    /// Spreadsheet-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Title => "Game Title",
            Column::Modes => "Modes",
            Column::Genres => "Genres",
            Column::Platforms => "Platforms",
            Column::SteamAllText => "Steam: All Reviews Text",
            Column::SteamRecentText => "Steam: Recent Reviews - Text",
            Column::OpenCriticRating => "OpenCritic Rating",
            Column::SteamAllData => "Steam: All Reviews - Data",
            Column::SteamRecentData => "Steam: Recent Reviews - Data",
            Column::SteamAllScore => "Steam: All Reviews - Score",
            Column::SteamRecentScore => "Steam: Recent Reviews - Score",
            Column::OpenCriticAverage => "OC: Top Critic Average",
            Column::OpenCriticRecommend => "OC: Critics Recommend",
            Column::WikiReviews => "Wikipedia: Reviews",
            Column::SteamReleaseDate => "Steam: Release Date",
            Column::WikiReleaseDate => "Wikipedia: Release Date",
            Column::SteamImageUrl => "Steam: Image URL",
            Column::WikiImageUrl => "Wikipedia: Image URL",
            Column::WikiUrl => "Wikipedia: Game URL",
            Column::SteamUrl => "Steam: Game URL",
            Column::OpenCriticUrl => "OpenCritic: Game URL",
            Column::WikiTitle => "Wikipedia: Title",
            Column::SteamTitle => "Steam: Title",
            Column::OpenCriticTitle => "OpenCritic: Title",
            Column::Series => "Series",
            Column::Developers => "Developers",
            Column::Publishers => "Publishers",
            Column::Directors => "Directors",
            Column::Producers => "Producers",
            Column::Designers => "Designers",
            Column::Programmers => "Programmers",
            Column::Artists => "Artists",
            Column::Writers => "Writers",
            Column::Composers => "Composers",
            Column::Engine => "Engine",
            Column::ExtraWikiInfo => "Wikipedia: Extra Info",
            Column::LastUpdate => "Last Update",
        }
    }

    pub fn db_name(&self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Modes => "Modes",
            Column::Genres => "Genres",
            Column::Platforms => "Platforms",
            Column::SteamAllText => "SteamAllText",
            Column::SteamRecentText => "SteamRecentText",
            Column::OpenCriticRating => "OpenCriticRating",
            Column::SteamAllData => "SteamAllData",
            Column::SteamRecentData => "SteamRecentData",
            Column::SteamAllScore => "SteamAllScore",
            Column::SteamRecentScore => "SteamRecentScore",
            Column::OpenCriticAverage => "OpenCriticAverage",
            Column::OpenCriticRecommend => "OpenCriticRecommend",
            Column::WikiReviews => "WikiReviews",
            Column::SteamReleaseDate => "SteamReleaseDate",
            Column::WikiReleaseDate => "WikiReleaseDate",
            Column::SteamImageUrl => "SteamImageURL",
            Column::WikiImageUrl => "WikiImageURL",
            Column::WikiUrl => "WikiURL",
            Column::SteamUrl => "SteamURL",
            Column::OpenCriticUrl => "OpenCriticURL",
            Column::WikiTitle => "WikiTitle",
            Column::SteamTitle => "SteamTitle",
            Column::OpenCriticTitle => "OpenCriticTitle",
            Column::Series => "Series",
            Column::Developers => "Developers",
            Column::Publishers => "Publishers",
            Column::Directors => "Directors",
            Column::Producers => "Producers",
            Column::Designers => "Designers",
            Column::Programmers => "Programmers",
            Column::Artists => "Artists",
            Column::Writers => "Writers",
            Column::Composers => "Composers",
            Column::Engine => "Engine",
            Column::ExtraWikiInfo => "ExtraWikiInfo",
            Column::LastUpdate => "LastUpdate",
        }
    }

    /// SQL type used in the table definition.
    pub(crate) fn sql_type(&self) -> &'static str {
        match self {
            Column::SteamAllScore
            | Column::SteamRecentScore
            | Column::OpenCriticAverage
            | Column::OpenCriticRecommend => "INTEGER",
            _ => "TEXT",
        }
    }

    /// Resolve a spreadsheet label or a database column name.
    pub fn from_label(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(name) || c.db_name().eq_ignore_ascii_case(name))
    }

    /// The encyclopedia column backing an infobox field.
    pub fn for_info_field(field: InfoField) -> Column {
        match field {
            InfoField::Developers => Column::Developers,
            InfoField::Publishers => Column::Publishers,
            InfoField::Directors => Column::Directors,
            InfoField::Producers => Column::Producers,
            InfoField::Designers => Column::Designers,
            InfoField::Programmers => Column::Programmers,
            InfoField::Artists => Column::Artists,
            InfoField::Writers => Column::Writers,
            InfoField::Composers => Column::Composers,
            InfoField::Engine => Column::Engine,
            InfoField::Platforms => Column::Platforms,
            InfoField::Release => Column::WikiReleaseDate,
            InfoField::Genres => Column::Genres,
            InfoField::Modes => Column::Modes,
            InfoField::Series => Column::Series,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn text(s: impl Into<String>) -> Value {
    Value::Text(s.into())
}

fn or_na(s: String) -> Value {
    if s.trim().is_empty() {
        text(NOT_AVAILABLE)
    } else {
        text(s)
    }
}

/// The full column group written for one source record.
///
/// Records with `found = false` produce the not-found defaults.
pub fn column_values(record: &SourceRecord) -> Vec<(Column, Value)> {
    match record {
        SourceRecord::Storefront(r) if r.found => vec![
            (Column::SteamAllText, text(&r.all_reviews.text)),
            (Column::SteamRecentText, text(&r.recent_reviews.text)),
            (Column::SteamAllData, text(&r.all_reviews.detail)),
            (Column::SteamRecentData, text(&r.recent_reviews.detail)),
            (Column::SteamAllScore, Value::Integer(r.all_reviews.score.into())),
            (Column::SteamRecentScore, Value::Integer(r.recent_reviews.score.into())),
            (Column::SteamReleaseDate, text(&r.release_date)),
            (Column::SteamImageUrl, text(&r.image_url)),
            (Column::SteamTitle, text(&r.title)),
            (Column::SteamUrl, text(&r.url)),
        ],
        SourceRecord::Storefront(_) => vec![
            (Column::SteamAllText, text(crate::types::NO_USER_REVIEW)),
            (Column::SteamRecentText, text(crate::types::NO_USER_REVIEW)),
            (Column::SteamAllData, text(crate::types::NO_USER_REVIEW)),
            (Column::SteamRecentData, text(crate::types::NO_USER_REVIEW)),
            (Column::SteamAllScore, Value::Integer(0)),
            (Column::SteamRecentScore, Value::Integer(0)),
            (Column::SteamReleaseDate, text(NO_DATE)),
            (Column::SteamImageUrl, text(NO_URL)),
            (Column::SteamTitle, text(NOT_FOUND_TITLE)),
            (Column::SteamUrl, text(NO_URL)),
        ],
        SourceRecord::Aggregator(r) => {
            let (rating, average, recommend, title, url) = if r.found {
                (r.rating.as_str(), r.top_critic_average, r.critics_recommend, r.title.as_str(), r.url.as_str())
            } else {
                (crate::types::NO_RATING, 0, 0, NOT_FOUND_TITLE, NO_URL)
            };
            vec![
                (Column::OpenCriticRating, text(rating)),
                (Column::OpenCriticAverage, Value::Integer(average.into())),
                (Column::OpenCriticRecommend, Value::Integer(recommend.into())),
                (Column::OpenCriticTitle, text(title)),
                (Column::OpenCriticUrl, text(url)),
            ]
        }
        SourceRecord::Encyclopedia(r) if r.found => {
            let mut values: Vec<(Column, Value)> = InfoField::ALL
                .into_iter()
                .map(|field| {
                    let rendered = r.field(field).map(render_info).unwrap_or_default();
                    (Column::for_info_field(field), or_na(rendered))
                })
                .collect();
            values.push((Column::WikiReviews, or_na(render_reviews(&r.aggregator_scores, &r.critic_reviews))));
            values.push((Column::WikiImageUrl, or_na(r.image_url.clone().unwrap_or_default())));
            values.push((Column::WikiTitle, or_na(r.title.clone())));
            values.push((Column::ExtraWikiInfo, or_na(render_extra(r.extra.iter()))));
            values.push((Column::WikiUrl, or_na(r.url.clone())));
            values
        }
        SourceRecord::Encyclopedia(_) => {
            let mut values: Vec<(Column, Value)> = InfoField::ALL
                .into_iter()
                .map(|field| (Column::for_info_field(field), text(NOT_AVAILABLE)))
                .collect();
            values.push((Column::WikiReviews, text(NOT_AVAILABLE)));
            values.push((Column::WikiImageUrl, text(NOT_AVAILABLE)));
            values.push((Column::WikiTitle, text(NOT_FOUND_TITLE)));
            values.push((Column::ExtraWikiInfo, text(NOT_AVAILABLE)));
            values.push((Column::WikiUrl, text(NO_URL)));
            values
        }
    }
}

/// Flatten an infobox value.
pub fn render_info(value: &InfoValue) -> String {
    match value {
        InfoValue::Text(s) => s.clone(),
        InfoValue::List(items) => join_entries(items.iter().map(String::as_str)),
        InfoValue::Release(release) => render_release(release),
    }
}

pub fn render_release(release: &ReleaseInfo) -> String {
    match release {
        ReleaseInfo::Text(s) => s.clone(),
        ReleaseInfo::Dates(dates) => join_entries(dates.iter().map(String::as_str)),
        ReleaseInfo::ByPlatform(platforms) => {
            let entries: Vec<String> = platforms
                .iter()
                .map(|p| format!("{}: {}", p.platform, p.dates.join(NESTED_SEP)))
                .collect();
            entries.join(ENTRY_SEP)
        }
        ReleaseInfo::Unconfirmed => NO_CONFIRMED_RELEASE.to_string(),
    }
}

fn render_reviews(aggregators: &[(String, Vec<String>)], reviews: &[(String, ReviewScore)]) -> String {
    let aggregate = aggregators
        .iter()
        .map(|(name, scores)| format!("{name}: {}", scores.join(NESTED_SEP)));
    let critics = reviews.iter().map(|(name, score)| match score {
        ReviewScore::Single(s) => format!("{name}: {s}"),
        ReviewScore::Multiple(all) => format!("{name}: {}", all.join(NESTED_SEP)),
    });
    let entries: Vec<String> = aggregate.chain(critics).collect();
    entries.join(ENTRY_SEP)
}

fn render_extra<'a>(extra: impl Iterator<Item = (&'a String, &'a InfoValue)>) -> String {
    let entries: Vec<String> = extra
        .map(|(label, value)| {
            let rendered = match value {
                InfoValue::List(items) => items.join(NESTED_SEP),
                other => render_info(other),
            };
            format!("{label}: {rendered}")
        })
        .collect();
    entries.join(ENTRY_SEP)
}

fn join_entries<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.filter(|s| !s.trim().is_empty()).collect();
    items.join(ENTRY_SEP)
}
