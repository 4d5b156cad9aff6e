//! Wiring from configuration to a ready orchestrator.

use anyhow::{Context, Result};
use game_hunter::{
    build_hunters, BrowserLauncher, GameRecordStore, HuntContext, HunterConfig,
    NoopBrowser, SearchOrchestrator,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Open the configured store. Failing to open it is fatal.
pub fn open_store(config: &HunterConfig) -> Result<GameRecordStore> {
    let db = &config.database;
    GameRecordStore::open(&db.folder, &db.name, &db.table).with_context(|| {
        format!(
            "failed to open database {}/{}.db",
            db.folder.display(),
            db.name
        )
    })
}

/// Chromium when one can be found, otherwise a launcher whose sessions
/// always fail so browser-only steps degrade to not found.
pub fn browser_launcher(config: &HunterConfig) -> Arc<dyn BrowserLauncher> {
    match config.chromium_launcher() {
        Ok(launcher) => Arc::new(launcher),
        Err(e) => {
            warn!("{e}; continuing without a browser");
            Arc::new(NoopBrowser)
        }
    }
}

/// Build an orchestrator over the enabled sources of `config`.
pub fn build_orchestrator(config: &HunterConfig) -> Result<SearchOrchestrator> {
    config.validate()?;
    let store = open_store(config)?;
    let ctx = HuntContext::new(config.fetch_client(), browser_launcher(config));
    let sources = config.enabled_sources();
    info!(
        "Sources: {}",
        sources.iter().map(|s| s.site()).collect::<Vec<_>>().join(", ")
    );
    let hunters = build_hunters(&sources, &ctx, &config.endpoints);
    let (min, max) = config.backoff();
    Ok(SearchOrchestrator::new(store, hunters, config.staleness_days).with_backoff(min, max))
}
