pub mod evaluator;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use evaluator::{evaluate_creator, explain_eligibility, filter_eligible};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    MissingFollowers,
    MissingEngagement,
    MissingMedianViews,
    MissingRate,
    GenreMismatch,
    CampaignTypeMismatch,
    ContentTypeMismatch,
    TerritoryMismatch,
    BelowMinMedianViews,
    BelowMinEngagement,
}

impl RejectionReason {
    /// Hard-floor failures are data-quality problems rather than targeting.
    pub fn is_hard_floor(self) -> bool {
        matches!(
            self,
            Self::MissingFollowers
                | Self::MissingEngagement
                | Self::MissingMedianViews
                | Self::MissingRate
        )
    }
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MissingFollowers => "no followers",
            Self::MissingEngagement => "no engagement rate",
            Self::MissingMedianViews => "no median views",
            Self::MissingRate => "no sponsorship rate",
            Self::GenreMismatch => "genre mismatch",
            Self::CampaignTypeMismatch => "campaign type mismatch",
            Self::ContentTypeMismatch => "content type mismatch",
            Self::TerritoryMismatch => "territory mismatch",
            Self::BelowMinMedianViews => "below median views guardrail",
            Self::BelowMinEngagement => "below engagement guardrail",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatorEligibility {
    pub creator_id: String,
    pub handle: String,
    pub eligible: bool,
    pub failures: Vec<RejectionReason>,
}

impl CreatorEligibility {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Counts how often each rule rejected a creator.
pub fn rejection_breakdown(results: &[CreatorEligibility]) -> BTreeMap<RejectionReason, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        for reason in &result.failures {
            *counts.entry(*reason).or_insert(0) += 1;
        }
    }
    counts
}
