//! End-to-end orchestration with stub sources and a real SQLite store.

use async_trait::async_trait;
use game_hunter::{
    AggregatorRecord, Column, EncyclopediaRecord, GameRecordStore, Hunter, InfoField, InfoValue,
    SearchOrchestrator, Source, SourceAdapter, SourceRecord, StorefrontRecord,
};
use std::sync::Arc;
use std::time::Duration;

/// Finds every title except those listed as missing.
struct StubSource {
    source: Source,
    missing: Vec<&'static str>,
}

#[async_trait]
impl SourceAdapter for StubSource {
    type Target = String;

    fn source(&self) -> Source {
        self.source
    }

    async fn search(&self, title: &str) -> Option<String> {
        if self.missing.iter().any(|m| *m == title) {
            None
        } else {
            Some(format!("https://{}.example/{}", self.source, title.replace(' ', "_")))
        }
    }

    async fn extract(&self, url: String, title: &str) -> SourceRecord {
        match self.source {
            Source::Storefront => SourceRecord::Storefront(StorefrontRecord {
                url,
                title: title.to_string(),
                found: true,
                release_date: "Sep 17, 2020".to_string(),
                ..Default::default()
            }),
            Source::Aggregator => SourceRecord::Aggregator(AggregatorRecord {
                url,
                title: title.to_string(),
                found: true,
                rating: "Mighty".to_string(),
                top_critic_average: 93,
                critics_recommend: 98,
            }),
            Source::Encyclopedia => {
                let mut record = EncyclopediaRecord {
                    url,
                    title: title.to_string(),
                    found: true,
                    ..Default::default()
                };
                record.fields.insert(
                    InfoField::Developers,
                    InfoValue::Text("Supergiant Games".to_string()),
                );
                SourceRecord::Encyclopedia(record)
            }
        }
    }
}

fn hunters(missing: Vec<&'static str>) -> Vec<Arc<dyn Hunter>> {
    Source::ALL
        .into_iter()
        .map(|source| -> Arc<dyn Hunter> {
            Arc::new(StubSource {
                source,
                missing: missing.clone(),
            })
        })
        .collect()
}

fn open_store(dir: &tempfile::TempDir) -> GameRecordStore {
    GameRecordStore::open(dir.path(), "Games", "GAMES").unwrap()
}

#[tokio::test]
async fn test_three_sources_populate_every_group() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = SearchOrchestrator::new(open_store(&dir), hunters(vec![]), 30)
        .with_backoff(Duration::ZERO, Duration::ZERO);

    let summary = orch.run(&["Hades"]).await.unwrap();
    assert_eq!(summary.searched.len(), 1);
    assert!(summary.searched[0].found.values().all(|found| *found));
    assert_eq!(summary.store_errors, 0);

    let store = orch.store();
    let today = chrono::Local::now().date_naive();
    assert_eq!(store.last_update("Hades").unwrap(), Some(today));
    assert_eq!(
        store.get_field("Hades", Column::SteamReleaseDate).unwrap().as_deref(),
        Some("Sep 17, 2020")
    );
    assert_eq!(
        store.get_field_by_label("Hades", "OC: Top Critic Average").unwrap().as_deref(),
        Some("93")
    );
    assert_eq!(
        store.get_field("Hades", Column::Developers).unwrap().as_deref(),
        Some("Supergiant Games")
    );
    assert_eq!(
        store.get_field("Hades", Column::WikiUrl).unwrap().as_deref(),
        Some("https://encyclopedia.example/Hades")
    );
}

#[tokio::test]
async fn test_missing_source_writes_defaults_and_still_stamps() {
    let dir = tempfile::tempdir().unwrap();
    let mut orch = SearchOrchestrator::new(open_store(&dir), hunters(vec!["Zzyzx Quest"]), 30)
        .with_backoff(Duration::ZERO, Duration::ZERO);

    let summary = orch.run(&["Zzyzx Quest", "Hades"]).await.unwrap();
    let missing = &summary.searched[0];
    assert_eq!(missing.title, "Zzyzx Quest");
    assert!(missing.found.values().all(|found| !*found));
    assert!(missing.stamped);

    let store = orch.store();
    assert_eq!(
        store.get_field("Zzyzx Quest", Column::SteamTitle).unwrap().as_deref(),
        Some("Not Found")
    );
    assert_eq!(
        store.get_field("Zzyzx Quest", Column::OpenCriticRating).unwrap().as_deref(),
        Some("None")
    );
    assert_eq!(
        store.get_field("Zzyzx Quest", Column::WikiUrl).unwrap().as_deref(),
        Some("No URL")
    );
}

#[tokio::test]
async fn test_rerun_keeps_ids_and_skips_fresh_titles() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut orch = SearchOrchestrator::new(open_store(&dir), hunters(vec![]), 30)
            .with_backoff(Duration::ZERO, Duration::ZERO);
        orch.run(&["Hades", "Celeste"]).await.unwrap();
    }

    let mut orch = SearchOrchestrator::new(open_store(&dir), hunters(vec![]), 30)
        .with_backoff(Duration::ZERO, Duration::ZERO);
    let summary = orch.run(&["Tunic", "Celeste", "Hades"]).await.unwrap();
    assert_eq!(summary.skipped, vec!["Celeste".to_string(), "Hades".to_string()]);
    assert_eq!(summary.searched.len(), 1);

    let titles = orch.into_store().all_titles().unwrap();
    assert_eq!(
        titles,
        vec![
            (1, "Hades".to_string()),
            (2, "Celeste".to_string()),
            (3, "Tunic".to_string()),
        ]
    );
}
