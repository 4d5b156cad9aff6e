//! Run configuration, persisted as JSON.
//!
//! Every field has a default, so a partial file (or `{}`) is a valid
//! configuration.

use crate::adapters::Endpoints;
use crate::browser::chromium::ChromiumLauncher;
use crate::error::{HunterError, HunterResult};
use crate::fetch::FetchClient;
use crate::staleness::DEFAULT_STALENESS_DAYS;
use crate::store::validate_identifier;
use crate::types::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceToggles {
    pub storefront: bool,
    pub aggregator: bool,
    pub encyclopedia: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            storefront: true,
            aggregator: true,
            encyclopedia: true,
        }
    }
}

impl SourceToggles {
    pub fn is_enabled(&self, source: Source) -> bool {
        match source {
            Source::Storefront => self.storefront,
            Source::Aggregator => self.aggregator,
            Source::Encyclopedia => self.encyclopedia,
        }
    }

    /// Enable exactly the given sources.
    pub fn only(sources: &[Source]) -> Self {
        Self {
            storefront: sources.contains(&Source::Storefront),
            aggregator: sources.contains(&Source::Aggregator),
            encyclopedia: sources.contains(&Source::Encyclopedia),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub folder: PathBuf,
    pub name: String,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            name: "Games".to_string(),
            table: "GAMES".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Explicit Chromium binary; auto-detected when unset.
    pub chromium_path: Option<PathBuf>,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chromium_path: None,
            headless: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HunterConfig {
    pub sources: SourceToggles,
    /// Extra request headers sent with every plain HTTP fetch.
    pub headers: BTreeMap<String, String>,
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
    pub staleness_days: u32,
    pub request_timeout_secs: u64,
    pub database: DatabaseConfig,
    pub browser: BrowserConfig,
    pub endpoints: Endpoints,
}

impl Default for HunterConfig {
    fn default() -> Self {
        let headers = [
            ("Accept-Language", "en-US,en;q=0.9"),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            sources: SourceToggles::default(),
            headers,
            min_wait_secs: 9,
            max_wait_secs: 12,
            staleness_days: DEFAULT_STALENESS_DAYS,
            request_timeout_secs: 8,
            database: DatabaseConfig::default(),
            browser: BrowserConfig::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl HunterConfig {
    /// Load a configuration file and validate it.
    pub fn load(path: &Path) -> HunterResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: HunterConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> HunterResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> HunterResult<()> {
        if self.min_wait_secs > self.max_wait_secs {
            return Err(HunterError::Config(format!(
                "min_wait_secs ({}) exceeds max_wait_secs ({})",
                self.min_wait_secs, self.max_wait_secs
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(HunterError::Config("request_timeout_secs must be positive".to_string()));
        }
        validate_identifier(&self.database.table)?;
        if self.database.name.trim().is_empty() {
            return Err(HunterError::Config("database name must not be empty".to_string()));
        }
        if self.enabled_sources().is_empty() {
            return Err(HunterError::Config("every source is disabled".to_string()));
        }
        Ok(())
    }

    /// Enabled sources in canonical order.
    pub fn enabled_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| self.sources.is_enabled(*s))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Inclusive range of the pause between titles.
    pub fn backoff(&self) -> (Duration, Duration) {
        (
            Duration::from_secs(self.min_wait_secs),
            Duration::from_secs(self.max_wait_secs),
        )
    }

    pub fn fetch_client(&self) -> FetchClient {
        FetchClient::new(&self.headers, self.request_timeout())
    }

    /// Chromium launcher for the configured (or auto-detected) binary.
    pub fn chromium_launcher(&self) -> HunterResult<ChromiumLauncher> {
        ChromiumLauncher::new(self.browser.chromium_path.clone(), self.browser.headless)
            .map_err(|e| HunterError::Browser(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HunterConfig::default();
        assert_eq!(config.min_wait_secs, 9);
        assert_eq!(config.max_wait_secs, 12);
        assert_eq!(config.staleness_days, 30);
        assert_eq!(config.request_timeout_secs, 8);
        assert_eq!(config.database.table, "GAMES");
        assert_eq!(config.enabled_sources(), Source::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let config: HunterConfig =
            serde_json::from_str(r#"{"sources": {"aggregator": false}, "staleness_days": 7}"#).unwrap();
        assert_eq!(config.staleness_days, 7);
        assert_eq!(config.max_wait_secs, 12);
        assert_eq!(
            config.enabled_sources(),
            vec![Source::Storefront, Source::Encyclopedia]
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HunterConfig {
            min_wait_secs: 20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HunterError::Config(_))));

        config.min_wait_secs = 1;
        config.database.table = "games table".to_string();
        assert!(config.validate().is_err());
        config.database.table = "1GAMES".to_string();
        assert!(config.validate().is_err());
        config.database.table = String::new();
        assert!(matches!(config.validate(), Err(HunterError::Config(_))));

        config.database.table = "GAMES".to_string();
        config.sources = SourceToggles::only(&[]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = HunterConfig::default();
        config.sources = SourceToggles::only(&[Source::Encyclopedia]);
        config.save(&path).unwrap();

        let loaded = HunterConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
