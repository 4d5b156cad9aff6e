//! Per-title fan-out over the enabled sources.
//!
//! Titles are processed one at a time. For each stale title every hunter
//! runs in its own tokio task; records are persisted in completion order
//! and the title is stamped only once all of them have finished. A random
//! pause separates consecutive titles.

use crate::adapters::Hunter;
use crate::error::HunterResult;
use crate::staleness::needs_research;
use crate::store::GameRecordStore;
use crate::types::{Source, SourceRecord};
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to one searched title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOutcome {
    pub title: String,
    /// Found flag per source that ran.
    pub found: BTreeMap<Source, bool>,
    /// Whether the last-update stamp was written.
    pub stamped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub searched: Vec<TitleOutcome>,
    /// Titles still fresh under the staleness threshold.
    pub skipped: Vec<String>,
    /// Persistence failures that were logged and skipped.
    pub store_errors: usize,
}

pub struct SearchOrchestrator {
    store: GameRecordStore,
    hunters: Vec<Arc<dyn Hunter>>,
    staleness_days: u32,
    min_wait: Duration,
    max_wait: Duration,
}

impl SearchOrchestrator {
    pub fn new(store: GameRecordStore, hunters: Vec<Arc<dyn Hunter>>, staleness_days: u32) -> Self {
        Self {
            store,
            hunters,
            staleness_days,
            min_wait: Duration::from_secs(9),
            max_wait: Duration::from_secs(12),
        }
    }

    /// Set the inclusive range of the pause between titles.
    pub fn with_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.min_wait = min.min(max);
        self.max_wait = max.max(min);
        self
    }

    pub fn store(&self) -> &GameRecordStore {
        &self.store
    }

    pub fn into_store(self) -> GameRecordStore {
        self.store
    }

    /// Register `titles`, then search every stale one.
    ///
    /// Only failing to register the titles aborts the run; a failed write
    /// for one title is logged and the run moves on.
    pub async fn run<S: AsRef<str>>(&mut self, titles: &[S]) -> HunterResult<RunSummary> {
        self.store.register_titles(titles)?;

        let today = chrono::Local::now().date_naive();
        let mut summary = RunSummary::default();
        let mut queue: Vec<String> = Vec::new();
        for title in titles {
            let title = title.as_ref();
            if queue.iter().any(|t| t == title) || summary.skipped.iter().any(|t| t == title) {
                continue;
            }
            let last = match self.store.last_update(title) {
                Ok(last) => last,
                Err(e) => {
                    error!("Could not read last update of '{title}': {e}");
                    summary.store_errors += 1;
                    None
                }
            };
            if needs_research(last, self.staleness_days, today) {
                queue.push(title.to_string());
            } else {
                summary.skipped.push(title.to_string());
            }
        }

        if !summary.skipped.is_empty() {
            info!(
                "Ignoring {} titles updated within {} days: {}",
                summary.skipped.len(),
                self.staleness_days,
                summary.skipped.join(", ")
            );
        }

        let total = queue.len();
        for (index, title) in queue.iter().enumerate() {
            info!("Searching {} of {total}: {title}", index + 1);
            let outcome = self.search_title(title, &mut summary.store_errors).await;
            summary.searched.push(outcome);

            if index + 1 < total {
                self.pause().await;
            }
        }
        info!("Search complete: {} searched, {} skipped", summary.searched.len(), summary.skipped.len());
        Ok(summary)
    }

    async fn search_title(&mut self, title: &str, store_errors: &mut usize) -> TitleOutcome {
        let mut pending: FuturesUnordered<_> = self
            .hunters
            .iter()
            .map(|hunter| {
                let source = hunter.source();
                let hunter = Arc::clone(hunter);
                let owned = title.to_string();
                let handle = tokio::spawn(async move { hunter.hunt(&owned).await });
                async move { (source, handle.await) }
            })
            .collect();

        let mut found = BTreeMap::new();
        while let Some((source, joined)) = pending.next().await {
            let record = match joined {
                Ok(record) => record,
                Err(e) => {
                    warn!("{}: task for '{title}' failed: {e}", source.site());
                    SourceRecord::not_found(source)
                }
            };
            found.insert(source, record.found());
            if let Err(e) = self.store.upsert_source_record(title, &record) {
                error!("{}: could not store record for '{title}': {e}", source.site());
                *store_errors += 1;
            }
        }

        let stamped = match self.store.mark_updated(title, chrono::Local::now().date_naive()) {
            Ok(()) => true,
            Err(e) => {
                error!("Could not stamp '{title}': {e}");
                *store_errors += 1;
                false
            }
        };
        TitleOutcome {
            title: title.to_string(),
            found,
            stamped,
        }
    }

    async fn pause(&self) {
        let wait = backoff_delay(&mut rand::thread_rng(), self.min_wait, self.max_wait);
        if !wait.is_zero() {
            info!("Waiting {:.1}s before the next title", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }
}

/// Pause drawn uniformly from `[min, max]` at millisecond resolution.
pub fn backoff_delay<R: Rng>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let min = min.as_millis() as u64;
    let max = (max.as_millis() as u64).max(min);
    Duration::from_millis(rng.gen_range(min..=max))
}

/// Whether `title` would be searched today under `staleness_days`.
pub fn is_stale(store: &GameRecordStore, title: &str, staleness_days: u32, today: NaiveDate) -> HunterResult<bool> {
    Ok(needs_research(store.last_update(title)?, staleness_days, today))
}
