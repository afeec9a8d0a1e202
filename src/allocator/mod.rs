pub mod totals;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::CreatorWithPredictions;

/// Post cap per creator used by the automated allocator.
pub const DEFAULT_MAX_POSTS_PER_CREATOR: u32 = 2;
/// Upper bound for post counts entered by hand. Independent of the
/// allocator cap.
pub const MANUAL_MAX_POSTS: u32 = 10;
/// Closeout runs only when the leftover budget covers this many of the
/// cheapest unselected rate.
pub const DEFAULT_CLOSEOUT_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AllocationPolicy {
    pub max_posts_per_creator: u32,
    pub closeout_multiplier: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            max_posts_per_creator: DEFAULT_MAX_POSTS_PER_CREATOR,
            closeout_multiplier: DEFAULT_CLOSEOUT_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    pub pool: Vec<CreatorWithPredictions>,
    pub remaining: f64,
}

/// Runs coverage, efficiency and closeout over a ranked pool. The pool is
/// expected to be cleared (no posts assigned).
pub fn allocate(
    pool: Vec<CreatorWithPredictions>,
    budget: f64,
    policy: &AllocationPolicy,
) -> Vec<CreatorWithPredictions> {
    let outcome = coverage_pass(pool, budget);
    debug!("coverage pass left {:.2} of {budget:.2}", outcome.remaining);
    let outcome = efficiency_pass(outcome.pool, outcome.remaining, policy.max_posts_per_creator);
    debug!("efficiency pass left {:.2}", outcome.remaining);
    let outcome = closeout_pass(outcome.pool, outcome.remaining, policy.closeout_multiplier);
    debug!("closeout pass left {:.2}", outcome.remaining);
    outcome.pool
}

/// Phase A: one post for every creator that still fits, in ranked order.
pub fn coverage_pass(pool: Vec<CreatorWithPredictions>, budget: f64) -> PhaseOutcome {
    let mut remaining = budget;
    let pool = pool
        .into_iter()
        .map(|creator| {
            if !creator.selected && creator.rate() <= remaining {
                remaining -= creator.rate();
                creator.with_posts(1)
            } else {
                creator
            }
        })
        .collect();
    PhaseOutcome { pool, remaining }
}

/// Phase B: repeatedly give one extra post to the selected creator with the
/// best views per currency unit, until nobody under the cap fits.
pub fn efficiency_pass(
    mut pool: Vec<CreatorWithPredictions>,
    budget_remaining: f64,
    max_posts: u32,
) -> PhaseOutcome {
    let mut remaining = budget_remaining;
    while let Some(idx) = best_efficiency_candidate(&pool, remaining, max_posts) {
        let creator = pool[idx].clone();
        remaining -= creator.rate();
        let posts = creator.posts_assigned + 1;
        pool[idx] = creator.with_posts(posts);
    }
    PhaseOutcome { pool, remaining }
}

fn best_efficiency_candidate(
    pool: &[CreatorWithPredictions],
    remaining: f64,
    max_posts: u32,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, creator) in pool.iter().enumerate() {
        if !creator.selected || creator.posts_assigned >= max_posts || creator.rate() > remaining {
            continue;
        }
        let value = creator.marginal_value();
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Phase C: if enough budget is left over, one more sweep adding any
/// unselected creator that fits, one post each.
pub fn closeout_pass(
    pool: Vec<CreatorWithPredictions>,
    budget_remaining: f64,
    multiplier: f64,
) -> PhaseOutcome {
    let cheapest = pool
        .iter()
        .filter(|c| !c.selected)
        .map(|c| c.rate())
        .fold(f64::INFINITY, f64::min);
    if !cheapest.is_finite() || budget_remaining < multiplier * cheapest {
        return PhaseOutcome {
            pool,
            remaining: budget_remaining,
        };
    }
    coverage_pass(pool, budget_remaining)
}

pub fn clear_allocation(pool: Vec<CreatorWithPredictions>) -> Vec<CreatorWithPredictions> {
    pool.into_iter().map(|c| c.with_posts(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::Creator;

    fn row(id: &str, rate: f64, views: u64) -> CreatorWithPredictions {
        let creator = Creator::new(id, format!("@{id}")).with_rate(rate);
        CreatorWithPredictions::new(creator, views, None)
    }

    fn posts(pool: &[CreatorWithPredictions]) -> Vec<u32> {
        pool.iter().map(|c| c.posts_assigned).collect()
    }

    #[test]
    fn coverage_skips_creators_that_do_not_fit() {
        let pool = vec![row("a", 60.0, 1_000), row("b", 50.0, 1_000), row("c", 30.0, 1_000)];
        let outcome = coverage_pass(pool, 100.0);
        assert_eq!(posts(&outcome.pool), vec![1, 0, 1]);
        assert!((outcome.remaining - 10.0).abs() < 1e-9);
    }

    #[test]
    fn efficiency_prefers_best_views_per_dollar() {
        let pool = vec![row("a", 50.0, 5_000), row("b", 50.0, 9_000)];
        let covered = coverage_pass(pool, 150.0);
        let outcome = efficiency_pass(covered.pool, covered.remaining, 2);
        assert_eq!(posts(&outcome.pool), vec![1, 2]);
        assert_eq!(outcome.remaining, 0.0);
    }

    #[test]
    fn efficiency_respects_cap_and_breaks_ties_by_order() {
        let pool = vec![row("a", 10.0, 1_000), row("b", 10.0, 1_000)];
        let covered = coverage_pass(pool, 1_000.0);
        let outcome = efficiency_pass(covered.pool.clone(), covered.remaining, 2);
        assert_eq!(posts(&outcome.pool), vec![2, 2]);

        let tight = efficiency_pass(covered.pool, 10.0, 3);
        assert_eq!(posts(&tight.pool), vec![2, 1]);
    }

    #[test]
    fn efficiency_ignores_unselected_creators() {
        let pool = vec![row("a", 10.0, 1_000), row("b", 10.0, 90_000)];
        let outcome = efficiency_pass(pool, 100.0, 2);
        assert_eq!(posts(&outcome.pool), vec![0, 0]);
    }

    #[test]
    fn closeout_requires_threshold() {
        let pool = vec![row("a", 100.0, 1_000).with_posts(1), row("b", 40.0, 1_000)];
        let below = closeout_pass(pool.clone(), 59.0, 1.5);
        assert_eq!(posts(&below.pool), vec![1, 0]);

        let above = closeout_pass(pool, 60.0, 1.5);
        assert_eq!(posts(&above.pool), vec![1, 1]);
        assert!((above.remaining - 20.0).abs() < 1e-9);
    }

    #[test]
    fn closeout_without_unselected_is_noop() {
        let pool = vec![row("a", 10.0, 1_000).with_posts(1)];
        let outcome = closeout_pass(pool.clone(), 500.0, 1.5);
        assert_eq!(outcome.pool, pool);
        assert_eq!(outcome.remaining, 500.0);
    }

    #[test]
    fn allocate_stays_within_budget() {
        let pool = vec![
            row("a", 120.0, 20_000),
            row("b", 80.0, 9_000),
            row("c", 45.0, 8_000),
            row("d", 300.0, 40_000),
        ];
        let allocated = allocate(pool, 400.0, &AllocationPolicy::default());
        let spent: f64 = allocated.iter().map(|c| c.cost).sum();
        assert!(spent <= 400.0);
        assert!(allocated
            .iter()
            .all(|c| c.posts_assigned <= DEFAULT_MAX_POSTS_PER_CREATOR));
        assert!(allocated
            .iter()
            .all(|c| c.selected == (c.posts_assigned > 0)));
    }

    #[test]
    fn clear_allocation_resets_every_row() {
        let pool = vec![row("a", 10.0, 100).with_posts(2), row("b", 5.0, 100)];
        let cleared = clear_allocation(pool);
        assert!(cleared.iter().all(|c| !c.selected && c.cost == 0.0));
    }
}
