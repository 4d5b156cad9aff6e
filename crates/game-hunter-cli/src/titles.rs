//! Title list input.

use anyhow::{Context, Result};
use game_hunter::Source;
use std::path::Path;

/// Read one title per line. Blank lines and `#` comments are skipped.
pub fn read_titles_file(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read titles from {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Trim and de-duplicate titles, keeping first occurrence order.
pub fn unique_titles<I, S>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for title in titles {
        let title = title.as_ref().trim();
        if !title.is_empty() && !out.iter().any(|t| t == title) {
            out.push(title.to_string());
        }
    }
    out
}

/// Parse a comma-separated source list such as `steam,wiki`.
pub fn parse_sources(list: &str) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let source: Source = name.parse().map_err(anyhow::Error::msg)?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        anyhow::bail!("no sources given");
    }
    Ok(sources)
}
