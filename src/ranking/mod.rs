use serde::{Deserialize, Serialize};

use crate::campaign::{territory_matches, CampaignRequest};
use crate::creators::{Creator, TerritoryConfidence};
use crate::types::CreatorWithPredictions;

const WEIGHT_CP1K: f64 = 0.55;
const WEIGHT_VIEWS: f64 = 0.25;
const WEIGHT_ENGAGEMENT: f64 = 0.10;
const WEIGHT_TERRITORY: f64 = 0.10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Min/max over `values`, falling back to `[0, 1]` when empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() && max.is_finite() {
            Self { min, max }
        } else {
            Self { min: 0.0, max: 1.0 }
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        if self.max == self.min {
            return 0.5;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    pub fn normalize_inverse(&self, value: f64) -> f64 {
        1.0 - self.normalize(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PoolBounds {
    pub cp1k: Bounds,
    pub views: Bounds,
    pub engagement: Bounds,
}

impl PoolBounds {
    pub fn from_pool(pool: &[CreatorWithPredictions]) -> Self {
        Self {
            cp1k: Bounds::from_values(pool.iter().filter_map(|c| c.predicted_cp1k)),
            views: Bounds::from_values(pool.iter().map(|c| c.predicted_views_per_post as f64)),
            engagement: Bounds::from_values(pool.iter().map(|c| c.creator.engagement_rate)),
        }
    }
}

pub fn territory_score(creator: &Creator, preferences: &[String]) -> f64 {
    if preferences.is_empty() {
        return 0.8;
    }
    if territory_matches(&creator.territory, preferences) {
        return match creator.territory_confidence {
            TerritoryConfidence::High => 1.0,
            TerritoryConfidence::Med => 0.8,
            TerritoryConfidence::Low => 0.6,
        };
    }
    if creator.is_global() && creator.territory_confidence.is_at_least_med() {
        0.5
    } else {
        0.3
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn composite_score(
    candidate: &CreatorWithPredictions,
    bounds: &PoolBounds,
    preferences: &[String],
) -> f64 {
    // A missing CP1K scores as the most expensive creator in the pool.
    let cp1k = candidate.predicted_cp1k.unwrap_or(bounds.cp1k.max);
    let raw = WEIGHT_CP1K * bounds.cp1k.normalize_inverse(cp1k)
        + WEIGHT_VIEWS * bounds.views.normalize(candidate.predicted_views_per_post as f64)
        + WEIGHT_ENGAGEMENT * bounds.engagement.normalize(candidate.creator.engagement_rate)
        + WEIGHT_TERRITORY * territory_score(&candidate.creator, preferences);
    round_to(100.0 * raw, 1).clamp(0.0, 100.0)
}

/// Scores the pool and returns it sorted by score, highest first. Equal
/// scores keep their input order.
pub fn rank_pool(
    pool: Vec<CreatorWithPredictions>,
    request: &CampaignRequest,
) -> Vec<CreatorWithPredictions> {
    let bounds = PoolBounds::from_pool(&pool);
    let preferences = request.normalized_territories();
    let scored = pool
        .into_iter()
        .map(|c| {
            let score = composite_score(&c, &bounds, &preferences);
            c.with_score(score)
        })
        .collect();
    sort_by_score(scored)
}

pub fn sort_by_score(mut pool: Vec<CreatorWithPredictions>) -> Vec<CreatorWithPredictions> {
    pool.sort_by(|a, b| b.ranking_score.total_cmp(&a.ranking_score));
    pool
}
