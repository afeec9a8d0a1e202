pub mod source;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::CampaignType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TerritoryConfidence {
    High,
    #[serde(alias = "Medium")]
    Med,
    #[default]
    Low,
}

impl TerritoryConfidence {
    pub fn is_at_least_med(self) -> bool {
        matches!(self, Self::High | Self::Med)
    }
}

impl Display for TerritoryConfidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::High => "High",
            Self::Med => "Med",
            Self::Low => "Low",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
#[error("unknown territory confidence: {0}")]
pub struct ConfidenceParseError(pub String);

impl FromStr for TerritoryConfidence {
    type Err = ConfidenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "med" | "medium" => Ok(Self::Med),
            "low" | "" => Ok(Self::Low),
            _ => Err(ConfidenceParseError(s.to_string())),
        }
    }
}

/// A creator record as supplied by the creator database. The engine never
/// mutates these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Creator {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub median_views: Option<u64>,
    #[serde(default)]
    pub reel_rate: f64,
    #[serde(default)]
    pub content_types: Vec<String>,
    #[serde(default)]
    pub music_genres: Vec<String>,
    #[serde(default)]
    pub territory: String,
    #[serde(default)]
    pub territory_confidence: TerritoryConfidence,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Creator {
    pub fn new(id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            followers: 0,
            engagement_rate: 0.0,
            median_views: None,
            reel_rate: 0.0,
            content_types: Vec::new(),
            music_genres: Vec::new(),
            territory: String::new(),
            territory_confidence: TerritoryConfidence::Low,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_audience(mut self, followers: u64, engagement_rate: f64) -> Self {
        self.followers = followers;
        self.engagement_rate = engagement_rate;
        self
    }

    pub fn with_median_views(mut self, median_views: Option<u64>) -> Self {
        self.median_views = median_views;
        self
    }

    pub fn with_rate(mut self, reel_rate: f64) -> Self {
        self.reel_rate = reel_rate;
        self
    }

    pub fn with_content_types<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.music_genres = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_territory(
        mut self,
        territory: impl Into<String>,
        confidence: TerritoryConfidence,
    ) -> Self {
        self.territory = territory.into();
        self.territory_confidence = confidence;
        self
    }

    pub fn has_content_marker(&self, marker: &str) -> bool {
        self.content_types
            .iter()
            .any(|tag| tag.to_lowercase().contains(marker))
    }

    /// True when a content-type tag names the campaign type outright, e.g.
    /// "Audio Seeding".
    pub fn has_campaign_tag(&self, campaign_type: CampaignType) -> bool {
        self.content_types
            .iter()
            .any(|tag| tag.trim().eq_ignore_ascii_case(campaign_type.label()))
    }

    pub fn is_global(&self) -> bool {
        self.territory.trim().eq_ignore_ascii_case("global")
    }
}
