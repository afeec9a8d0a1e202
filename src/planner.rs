//! End-to-end campaign planning: eligibility, prediction, ranking,
//! allocation and totals, plus re-optimization and manual edits of an
//! existing result.

use thiserror::Error;
use tracing::{debug, info};

use crate::allocator::totals::{allocation_insight, recalc_totals};
use crate::allocator::{allocate, clear_allocation, AllocationPolicy, MANUAL_MAX_POSTS};
use crate::campaign::CampaignRequest;
use crate::creators::Creator;
use crate::eligibility::{explain_eligibility, filter_eligible, rejection_breakdown};
use crate::prediction::{apply_cp1k_guardrail, predict_pool};
use crate::ranking::{rank_pool, sort_by_score};
use crate::types::{CampaignResult, CreatorWithPredictions};

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("creator {0} is not in the eligible pool")]
    UnknownCreator(String),
}

pub fn plan_campaign(
    creators: &[Creator],
    request: &CampaignRequest,
    policy: &AllocationPolicy,
) -> CampaignResult {
    let eligible = filter_eligible(creators, request);
    debug!("{}/{} creators passed eligibility", eligible.len(), creators.len());

    let predicted = predict_pool(&eligible, creators, request);
    let pool = apply_cp1k_guardrail(predicted, request.guardrails.max_cp1k);
    let ranked = rank_pool(pool, request);
    let allocated = allocate(ranked, request.budget, policy);

    let mut result = build_result(allocated, request.budget);
    if result.eligible_pool.is_empty() && !creators.is_empty() {
        result
            .allocation_insight
            .push_str(&empty_pool_hint(creators, request, eligible.len()));
    }
    info!(
        "planned campaign: {} selected of {} eligible, cost {:.2}/{:.2}",
        result.totals.total_creators,
        result.eligible_pool.len(),
        result.totals.total_cost,
        request.budget
    );
    result
}

/// Discards any allocation on `pool` and re-derives one from the existing
/// ranking scores. Eligibility and predictions are reused as is.
pub fn reoptimize_allocation(
    pool: &[CreatorWithPredictions],
    budget: f64,
    policy: &AllocationPolicy,
) -> CampaignResult {
    let cleared = clear_allocation(pool.to_vec());
    let ranked = sort_by_score(cleared);
    let allocated = allocate(ranked, budget, policy);
    let result = build_result(allocated, budget);
    info!(
        "reoptimized allocation: {} selected, cost {:.2}/{budget:.2}",
        result.totals.total_creators, result.totals.total_cost
    );
    result
}

/// Rebuilds the selected subset, totals and insight from the pool. Used
/// after the pool has been edited by hand.
///
/// The `selected` flag wins over a stale post count: a selected row with no
/// posts gets one, an unselected row gets none. Cost and view totals are
/// re-derived from the post count on every row.
pub fn recalculate(result: &CampaignResult) -> CampaignResult {
    build_result(result.eligible_pool.clone(), result.budget)
}

/// Sets a creator's post count, clamped to `[1, MANUAL_MAX_POSTS]`.
pub fn set_posts(
    result: &CampaignResult,
    creator_id: &str,
    posts: u32,
) -> Result<CampaignResult, EditError> {
    let posts = posts.clamp(1, MANUAL_MAX_POSTS);
    edit_creator(result, creator_id, |c| c.with_posts(posts))
}

/// Toggles selection. Selecting keeps an existing post count or starts at
/// one post; deselecting clears it.
pub fn set_selected(
    result: &CampaignResult,
    creator_id: &str,
    selected: bool,
) -> Result<CampaignResult, EditError> {
    edit_creator(result, creator_id, |mut c| {
        c.selected = selected;
        reconcile(c)
    })
}

fn edit_creator<F>(
    result: &CampaignResult,
    creator_id: &str,
    edit: F,
) -> Result<CampaignResult, EditError>
where
    F: FnOnce(CreatorWithPredictions) -> CreatorWithPredictions,
{
    let idx = result
        .eligible_pool
        .iter()
        .position(|c| c.id() == creator_id)
        .ok_or_else(|| EditError::UnknownCreator(creator_id.to_string()))?;
    let mut pool = result.eligible_pool.clone();
    pool[idx] = edit(pool[idx].clone());
    Ok(build_result(pool, result.budget))
}

fn reconcile(row: CreatorWithPredictions) -> CreatorWithPredictions {
    let posts = match (row.selected, row.posts_assigned) {
        (false, _) => 0,
        (true, 0) => 1,
        (true, current) => current,
    };
    row.with_posts(posts)
}

fn build_result(pool: Vec<CreatorWithPredictions>, budget: f64) -> CampaignResult {
    let pool: Vec<CreatorWithPredictions> = pool.into_iter().map(reconcile).collect();
    let totals = recalc_totals(&pool, budget);
    let allocation_insight = allocation_insight(&pool, &totals, budget);
    let selected = pool.iter().filter(|c| c.selected).cloned().collect();
    CampaignResult {
        budget,
        eligible_pool: pool,
        selected,
        totals,
        allocation_insight,
    }
}

fn empty_pool_hint(creators: &[Creator], request: &CampaignRequest, eligible: usize) -> String {
    if eligible > 0 {
        let ceiling = request.guardrails.max_cp1k.unwrap_or_default();
        return format!(" All {eligible} matching creators exceeded the ${ceiling:.2} CP1K ceiling.");
    }
    let breakdown = rejection_breakdown(&explain_eligibility(creators, request));
    breakdown
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(reason, count)| format!(" Most common rejection: {reason} ({count})."))
        .unwrap_or_default()
}
