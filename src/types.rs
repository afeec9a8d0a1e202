use serde::{Deserialize, Serialize};

use crate::creators::Creator;

/// A creator annotated with model output and its share of the allocation.
///
/// `selected`, `cost` and `predicted_views_total` are derived from
/// `posts_assigned`; change them only through [`CreatorWithPredictions::with_posts`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatorWithPredictions {
    #[serde(flatten)]
    pub creator: Creator,
    pub predicted_views_per_post: u64,
    pub predicted_views_total: u64,
    pub predicted_cp1k: Option<f64>,
    pub ranking_score: f64,
    pub posts_assigned: u32,
    pub cost: f64,
    pub selected: bool,
}

impl CreatorWithPredictions {
    pub fn new(
        creator: Creator,
        predicted_views_per_post: u64,
        predicted_cp1k: Option<f64>,
    ) -> Self {
        Self {
            creator,
            predicted_views_per_post,
            predicted_views_total: 0,
            predicted_cp1k,
            ranking_score: 0.0,
            posts_assigned: 0,
            cost: 0.0,
            selected: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.creator.id
    }

    pub fn rate(&self) -> f64 {
        self.creator.reel_rate
    }

    pub fn with_score(mut self, ranking_score: f64) -> Self {
        self.ranking_score = ranking_score;
        self
    }

    pub fn with_posts(mut self, posts: u32) -> Self {
        self.posts_assigned = posts;
        self.cost = self.creator.reel_rate * f64::from(posts);
        self.predicted_views_total = self.predicted_views_per_post * u64::from(posts);
        self.selected = posts > 0;
        self
    }

    /// Predicted views bought per currency unit for one more post.
    pub fn marginal_value(&self) -> f64 {
        if self.rate() > 0.0 {
            self.predicted_views_per_post as f64 / self.rate()
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CampaignTotals {
    pub total_creators: usize,
    pub total_posts: u32,
    pub total_cost: f64,
    pub total_followers: u64,
    pub median_views: f64,
    pub predicted_views: u64,
    pub avg_cp1k: f64,
    pub avg_cpv: f64,
    pub budget_remaining: f64,
    pub budget_utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignResult {
    pub budget: f64,
    pub eligible_pool: Vec<CreatorWithPredictions>,
    pub selected: Vec<CreatorWithPredictions>,
    pub totals: CampaignTotals,
    pub allocation_insight: String,
}
