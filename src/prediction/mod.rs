use tracing::debug;

use crate::campaign::{territory_matches, CampaignRequest};
use crate::creators::{Creator, TerritoryConfidence};
use crate::types::CreatorWithPredictions;

const ER_WEIGHT: f64 = 0.5;
const ER_MULTIPLIER_MIN: f64 = 0.85;
const ER_MULTIPLIER_MAX: f64 = 1.15;
const TERRITORY_MATCH_BONUS: f64 = 0.05;
const TERRITORY_MULTIPLIER_CAP: f64 = 1.10;
const CAMPAIGN_TAG_MULTIPLIER: f64 = 1.05;

/// Median with the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median engagement across the whole creator pool, ignoring creators with
/// no engagement data.
pub fn baseline_engagement(all_creators: &[Creator]) -> f64 {
    let rates: Vec<f64> = all_creators
        .iter()
        .map(|c| c.engagement_rate)
        .filter(|er| *er > 0.0)
        .collect();
    median(&rates).unwrap_or(0.0)
}

pub fn engagement_multiplier(engagement_rate: f64, baseline: f64) -> f64 {
    (1.0 + ER_WEIGHT * (engagement_rate - baseline)).clamp(ER_MULTIPLIER_MIN, ER_MULTIPLIER_MAX)
}

pub fn territory_multiplier(creator: &Creator, preferences: &[String]) -> f64 {
    let base = match creator.territory_confidence {
        TerritoryConfidence::High => 1.05,
        TerritoryConfidence::Med => 1.00,
        TerritoryConfidence::Low => 0.95,
    };
    if !preferences.is_empty() && territory_matches(&creator.territory, preferences) {
        (base + TERRITORY_MATCH_BONUS).min(TERRITORY_MULTIPLIER_CAP)
    } else {
        base
    }
}

pub fn predicted_cp1k(rate: f64, predicted_views: u64) -> Option<f64> {
    if predicted_views > 0 {
        Some(rate / (predicted_views as f64 / 1000.0))
    } else {
        None
    }
}

pub fn predict_creator(
    creator: &Creator,
    request: &CampaignRequest,
    preferences: &[String],
    baseline: f64,
) -> CreatorWithPredictions {
    let m_er = engagement_multiplier(creator.engagement_rate, baseline);
    let m_terr = territory_multiplier(creator, preferences);
    let m_type = if creator.has_campaign_tag(request.campaign_type) {
        CAMPAIGN_TAG_MULTIPLIER
    } else {
        1.0
    };
    let median_views = creator.median_views.unwrap_or(0) as f64;
    let views = (median_views * m_er * m_terr * m_type).round().max(0.0) as u64;
    let cp1k = predicted_cp1k(creator.reel_rate, views);
    CreatorWithPredictions::new(creator.clone(), views, cp1k)
}

/// Predicts every eligible creator. The engagement baseline comes from
/// `all_creators`, not just the eligible subset.
pub fn predict_pool(
    eligible: &[Creator],
    all_creators: &[Creator],
    request: &CampaignRequest,
) -> Vec<CreatorWithPredictions> {
    let baseline = baseline_engagement(all_creators);
    let preferences = request.normalized_territories();
    debug!("engagement baseline {baseline:.4} over {} creators", all_creators.len());
    eligible
        .iter()
        .map(|creator| predict_creator(creator, request, &preferences, baseline))
        .collect()
}

/// Drops creators above the CP1K ceiling, or without a CP1K at all. A
/// missing or non-positive ceiling keeps the pool as is.
pub fn apply_cp1k_guardrail(
    pool: Vec<CreatorWithPredictions>,
    max_cp1k: Option<f64>,
) -> Vec<CreatorWithPredictions> {
    let Some(ceiling) = max_cp1k.filter(|v| *v > 0.0) else {
        return pool;
    };
    let before = pool.len();
    let kept: Vec<CreatorWithPredictions> = pool
        .into_iter()
        .filter(|c| c.predicted_cp1k.map(|cp1k| cp1k <= ceiling).unwrap_or(false))
        .collect();
    debug!("cp1k ceiling {ceiling} kept {}/{before} creators", kept.len());
    kept
}
