//! Configuration file resolution and loading.

use anyhow::{Context, Result};
use game_hunter::HunterConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "GAME_HUNTER_CONFIG";
pub const LOCAL_CONFIG: &str = "game-hunter.json";

/// Resolve the configuration file path.
///
/// Order: explicit flag, `GAME_HUNTER_CONFIG`, `./game-hunter.json` if it
/// exists, then `~/.game-hunter/config.json`.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return local;
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".game-hunter")
        .join("config.json")
}

/// Load the configuration at `path`, or the defaults when it does not exist.
pub fn load_or_default(path: &Path) -> Result<HunterConfig> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        let config = HunterConfig::default();
        config.validate()?;
        return Ok(config);
    }
    HunterConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Write the default configuration. Refuses to overwrite unless `force`.
pub fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    HunterConfig::default()
        .save(path)
        .with_context(|| format!("failed to write config {}", path.display()))
}
