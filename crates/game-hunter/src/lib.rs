//! Game Hunter: per-title game info aggregation from a storefront, a review
//! aggregator and an encyclopedia, persisted to SQLite.

pub mod adapters;
pub mod browser;
pub mod config;
pub mod error;
pub mod fetch;
mod html;
pub mod matcher;
pub mod orchestrator;
pub mod staleness;
pub mod store;
pub mod types;

pub use adapters::{build_hunters, Endpoints, HuntContext, Hunter, SourceAdapter};
pub use browser::chromium::ChromiumLauncher;
pub use browser::{BrowserLauncher, BrowserSession, NoopBrowser};
pub use config::HunterConfig;
pub use error::{HunterError, HunterResult};
pub use fetch::FetchClient;
pub use matcher::{MatchScore, TitleMatcher};
pub use orchestrator::{RunSummary, SearchOrchestrator, TitleOutcome};
pub use staleness::needs_research;
pub use store::columns::Column;
pub use store::GameRecordStore;
pub use types::*;
