use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CampaignType {
    #[serde(rename = "Audio Seeding", alias = "audio")]
    AudioSeeding,
    #[serde(rename = "Footage Seeding", alias = "footage")]
    FootageSeeding,
}

impl CampaignType {
    pub const ALL: [CampaignType; 2] = [CampaignType::AudioSeeding, CampaignType::FootageSeeding];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AudioSeeding => "Audio Seeding",
            Self::FootageSeeding => "Footage Seeding",
        }
    }

    /// Lowercase fragment a creator content-type tag must contain to count as
    /// this campaign type's marker.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::AudioSeeding => "audio",
            Self::FootageSeeding => "footage",
        }
    }
}

impl Display for CampaignType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown campaign type: {0}")]
pub struct CampaignTypeParseError(pub String);

impl FromStr for CampaignType {
    type Err = CampaignTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "audio" | "audio seeding" => Ok(Self::AudioSeeding),
            "footage" | "footage seeding" => Ok(Self::FootageSeeding),
            _ => Err(CampaignTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Guardrails {
    #[serde(default)]
    pub min_median_views: Option<u64>,
    #[serde(default)]
    pub max_cp1k: Option<f64>,
    /// Percentage, e.g. `3.5` means a 3.5% engagement floor.
    #[serde(default)]
    pub min_engagement_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignRequest {
    pub budget: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    pub campaign_type: CampaignType,
    #[serde(default)]
    pub content_types: Vec<String>,
    #[serde(default)]
    pub territories: Vec<String>,
    #[serde(default)]
    pub guardrails: Guardrails,
}

impl CampaignRequest {
    pub fn new(budget: f64, campaign_type: CampaignType) -> Self {
        Self {
            budget,
            genres: Vec::new(),
            campaign_type,
            content_types: Vec::new(),
            territories: Vec::new(),
            guardrails: Guardrails::default(),
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = content_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_territories<I, S>(mut self, territories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.territories = territories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_guardrails(mut self, guardrails: Guardrails) -> Self {
        self.guardrails = guardrails;
        self
    }

    /// Territory preferences with qualifiers stripped, blanks dropped.
    pub fn normalized_territories(&self) -> Vec<String> {
        self.territories
            .iter()
            .map(|t| normalize_territory(t))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

const TERRITORY_QUALIFIERS: [&str; 3] = [" Primary", " Focus", " Audience"];

/// Strips trailing qualifiers such as " Primary" so "US Primary" compares
/// equal to a creator labelled "US".
pub fn normalize_territory(raw: &str) -> String {
    let mut value = raw.trim();
    while let Some(next) = strip_qualifier(value) {
        value = next;
    }
    value.to_string()
}

fn strip_qualifier(value: &str) -> Option<&str> {
    TERRITORY_QUALIFIERS.iter().find_map(|qualifier| {
        let at = value.len().checked_sub(qualifier.len())?;
        if value.is_char_boundary(at) && value[at..].eq_ignore_ascii_case(qualifier) {
            Some(value[..at].trim_end())
        } else {
            None
        }
    })
}

/// True when the creator's normalized territory equals one of the
/// normalized preferences, ignoring ASCII case.
pub fn territory_matches(creator_territory: &str, preferences: &[String]) -> bool {
    let territory = normalize_territory(creator_territory);
    !territory.is_empty()
        && preferences
            .iter()
            .any(|pref| pref.eq_ignore_ascii_case(&territory))
}
