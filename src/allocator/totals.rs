use crate::prediction::median;
use crate::ranking::round_to;
use crate::types::{CampaignTotals, CreatorWithPredictions};

/// Aggregates the selected rows of `pool`. Unselected rows are ignored, so
/// the full pool or just the selected subset can be passed.
pub fn recalc_totals(pool: &[CreatorWithPredictions], budget: f64) -> CampaignTotals {
    let selected: Vec<&CreatorWithPredictions> = pool.iter().filter(|c| c.selected).collect();

    let total_posts = selected.iter().map(|c| c.posts_assigned).sum::<u32>();
    let total_cost = selected.iter().map(|c| c.cost).sum::<f64>();
    let total_followers = selected.iter().map(|c| c.creator.followers).sum::<u64>();
    let predicted_views = selected.iter().map(|c| c.predicted_views_total).sum::<u64>();

    let historical: Vec<f64> = selected
        .iter()
        .filter_map(|c| c.creator.median_views)
        .filter(|v| *v > 0)
        .map(|v| v as f64)
        .collect();

    let avg_cp1k = if predicted_views > 0 {
        round_to(total_cost / predicted_views as f64 * 1000.0, 2)
    } else {
        0.0
    };
    let budget_utilization = if budget > 0.0 {
        (total_cost / budget * 1000.0).round() / 10.0
    } else {
        0.0
    };

    CampaignTotals {
        total_creators: selected.len(),
        total_posts,
        total_cost,
        total_followers,
        median_views: median(&historical).unwrap_or(0.0),
        predicted_views,
        avg_cp1k,
        avg_cpv: round_to(avg_cp1k / 1000.0, 2),
        budget_remaining: budget - total_cost,
        budget_utilization,
    }
}

/// Human-readable summary of an allocation for the campaign builder.
pub fn allocation_insight(
    pool: &[CreatorWithPredictions],
    totals: &CampaignTotals,
    budget: f64,
) -> String {
    if pool.is_empty() {
        return "No eligible creators matched the campaign criteria. Try widening genres, \
                territories or guardrails."
            .to_string();
    }
    if totals.total_creators == 0 {
        let cheapest = pool
            .iter()
            .map(|c| c.rate())
            .fold(f64::INFINITY, f64::min);
        return format!(
            "No creators could be allocated: {} eligible, but the cheapest rate (${cheapest:.2}) \
             exceeds the ${budget:.2} budget.",
            pool.len()
        );
    }
    let extra_posts = (totals.total_posts as usize).saturating_sub(totals.total_creators);
    let mut insight = format!(
        "Selected {} of {} eligible creators for {} posts ({} extra for efficiency), \
         using {:.1}% of the ${budget:.2} budget at an average CP1K of ${:.2}.",
        totals.total_creators,
        pool.len(),
        totals.total_posts,
        extra_posts,
        totals.budget_utilization,
        totals.avg_cp1k,
    );
    if totals.budget_remaining > 0.0 {
        insight.push_str(&format!(
            " ${:.2} remains unallocated.",
            totals.budget_remaining
        ));
    }
    insight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::Creator;

    fn row(id: &str, rate: f64, views: u64, median_views: Option<u64>) -> CreatorWithPredictions {
        let creator = Creator::new(id, format!("@{id}"))
            .with_audience(1_000, 0.05)
            .with_median_views(median_views)
            .with_rate(rate);
        CreatorWithPredictions::new(creator, views, None)
    }

    #[test]
    fn aggregates_selected_rows_only() {
        let pool = vec![
            row("a", 100.0, 10_000, Some(9_000)).with_posts(2),
            row("b", 50.0, 5_000, Some(4_000)).with_posts(1),
            row("c", 10.0, 1_000, Some(1_000)),
        ];
        let totals = recalc_totals(&pool, 1_000.0);
        assert_eq!(totals.total_creators, 2);
        assert_eq!(totals.total_posts, 3);
        assert_eq!(totals.total_cost, 250.0);
        assert_eq!(totals.total_followers, 2_000);
        assert_eq!(totals.median_views, 6_500.0);
        assert_eq!(totals.predicted_views, 25_000);
        assert_eq!(totals.avg_cp1k, 10.0);
        assert_eq!(totals.avg_cpv, 0.01);
        assert_eq!(totals.budget_remaining, 750.0);
        assert_eq!(totals.budget_utilization, 25.0);
    }

    #[test]
    fn median_views_skips_zero_and_missing() {
        let pool = vec![
            row("a", 10.0, 100, Some(0)).with_posts(1),
            row("b", 10.0, 100, None).with_posts(1),
            row("c", 10.0, 100, Some(3_000)).with_posts(1),
        ];
        assert_eq!(recalc_totals(&pool, 100.0).median_views, 3_000.0);
    }

    #[test]
    fn empty_selection_and_zero_budget_are_guarded() {
        let totals = recalc_totals(&[], 0.0);
        assert_eq!(totals, CampaignTotals::default());

        let pool = vec![row("a", 10.0, 0, Some(10)).with_posts(1)];
        let totals = recalc_totals(&pool, 0.0);
        assert_eq!(totals.avg_cp1k, 0.0);
        assert_eq!(totals.budget_utilization, 0.0);
        assert_eq!(totals.budget_remaining, -10.0);
    }

    #[test]
    fn utilization_has_one_decimal() {
        let pool = vec![row("a", 333.0, 1_000, Some(10)).with_posts(1)];
        assert_eq!(recalc_totals(&pool, 1_000.0).budget_utilization, 33.3);
    }

    #[test]
    fn insight_describes_outcome() {
        let empty = allocation_insight(&[], &CampaignTotals::default(), 100.0);
        assert!(empty.starts_with("No eligible creators matched"));

        let pool = vec![row("a", 100.0, 1_000, Some(10))];
        let none = allocation_insight(&pool, &recalc_totals(&pool, 50.0), 50.0);
        assert!(none.starts_with("No creators could be allocated"));

        let pool = vec![row("a", 100.0, 1_000, Some(10)).with_posts(2)];
        let totals = recalc_totals(&pool, 500.0);
        let text = allocation_insight(&pool, &totals, 500.0);
        assert!(text.contains("Selected 1 of 1 eligible creators for 2 posts (1 extra"));
        assert!(text.contains("$300.00 remains unallocated"));
    }

    #[test]
    fn insight_tolerates_selected_rows_without_posts() {
        let mut flagged = row("a", 100.0, 1_000, Some(10));
        flagged.selected = true;
        let pool = vec![flagged];
        let totals = recalc_totals(&pool, 500.0);
        let text = allocation_insight(&pool, &totals, 500.0);
        assert!(text.contains("for 0 posts (0 extra"));
    }
}
