pub mod allocator;
pub mod campaign;
pub mod config;
pub mod creators;
pub mod eligibility;
pub mod output;
pub mod planner;
pub mod prediction;
pub mod ranking;
pub mod server;
pub mod types;

pub use allocator::AllocationPolicy;
pub use campaign::{CampaignRequest, CampaignType, Guardrails};
pub use creators::{Creator, TerritoryConfidence};
pub use planner::{plan_campaign, reoptimize_allocation};
pub use types::{CampaignResult, CampaignTotals, CreatorWithPredictions};
