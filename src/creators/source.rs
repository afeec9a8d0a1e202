use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::creators::{Creator, TerritoryConfidence};

/// Provider of creator snapshots. Each call returns an independent copy.
pub trait CreatorSource: Send + Sync {
    fn name(&self) -> &str;
    fn load(&self) -> Result<Vec<Creator>>;
}

pub struct InMemorySource {
    creators: Vec<Creator>,
}

impl InMemorySource {
    pub fn new(creators: Vec<Creator>) -> Self {
        Self { creators }
    }
}

impl CreatorSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Vec<Creator>> {
        Ok(self.creators.clone())
    }
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CreatorSource for JsonFileSource {
    fn name(&self) -> &str {
        "json"
    }

    fn load(&self) -> Result<Vec<Creator>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading creators: {}", self.path.display()))?;
        let creators: Vec<Creator> = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing creators JSON: {}", self.path.display()))?;
        debug!("loaded {} creators from {}", creators.len(), self.path.display());
        Ok(creators)
    }
}

pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Deserialize)]
struct CreatorRow {
    id: String,
    handle: String,
    #[serde(default)]
    followers: Option<u64>,
    #[serde(default)]
    engagement_rate: Option<f64>,
    #[serde(default)]
    median_views: Option<u64>,
    #[serde(default)]
    reel_rate: Option<f64>,
    #[serde(default)]
    content_types: String,
    #[serde(default)]
    music_genres: String,
    #[serde(default)]
    territory: String,
    #[serde(default)]
    territory_confidence: String,
}

impl CreatorRow {
    fn into_creator(self) -> Result<Creator> {
        let confidence = TerritoryConfidence::from_str(&self.territory_confidence)
            .map_err(|e| anyhow!("creator {}: {e}", self.id))?;
        Ok(Creator::new(self.id, self.handle)
            .with_audience(
                self.followers.unwrap_or(0),
                self.engagement_rate.unwrap_or(0.0),
            )
            .with_median_views(self.median_views)
            .with_rate(self.reel_rate.unwrap_or(0.0))
            .with_content_types(split_tags(&self.content_types))
            .with_genres(split_tags(&self.music_genres))
            .with_territory(self.territory.trim(), confidence))
    }
}

impl CreatorSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self) -> Result<Vec<Creator>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("failed opening creators CSV: {}", self.path.display()))?;
        let mut creators = Vec::new();
        for (line, row) in reader.deserialize::<CreatorRow>().enumerate() {
            let row = row.with_context(|| {
                format!("failed parsing row {} of {}", line + 2, self.path.display())
            })?;
            creators.push(row.into_creator()?);
        }
        debug!("loaded {} creators from {}", creators.len(), self.path.display());
        Ok(creators)
    }
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(['|', ';'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Picks a file-backed source from the extension; anything but `.csv` is
/// read as JSON.
pub fn source_for_path(path: &Path) -> Box<dyn CreatorSource> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        Box::new(CsvFileSource::new(path))
    } else {
        Box::new(JsonFileSource::new(path))
    }
}
