//! Error types for the game hunter core.

/// All errors that can surface from the core library.
///
/// Source-level failures (fetch errors, missing page elements, title
/// mismatches) are never represented here: they degrade to a not-found
/// record. Only configuration and persistence problems reach the caller.
#[derive(thiserror::Error, Debug)]
pub enum HunterError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Unknown title: {0}")]
    UnknownTitle(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type HunterResult<T> = Result<T, HunterError>;
