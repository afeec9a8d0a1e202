use seeding_planner::planner::set_selected;
use seeding_planner::{
    plan_campaign, reoptimize_allocation, AllocationPolicy, CampaignRequest, CampaignResult,
    CampaignType, Creator, Guardrails, TerritoryConfidence,
};

fn creator(id: &str, rate: f64, median_views: u64, er: f64) -> Creator {
    Creator::new(id, format!("@{id}"))
        .with_audience(25_000, er)
        .with_median_views(Some(median_views))
        .with_rate(rate)
        .with_genres(["Pop"])
        .with_territory("US", TerritoryConfidence::Med)
}

fn varied_pool() -> Vec<Creator> {
    let genres = ["Pop", "Hip Hop", "Indie Rock", "EDM"];
    let tiers = [
        TerritoryConfidence::High,
        TerritoryConfidence::Med,
        TerritoryConfidence::Low,
    ];
    let territories = ["US", "UK", "Global", "DE"];
    (0..40u64)
        .map(|i| {
            let content = if i % 5 == 0 {
                vec!["Footage Seeding".to_string()]
            } else if i % 3 == 0 {
                vec!["Audio Seeding".to_string(), "Dance".to_string()]
            } else {
                vec!["Lifestyle".to_string()]
            };
            Creator::new(format!("c{i:02}"), format!("@creator{i}"))
                .with_audience(1_000 + i * 2_500, 0.01 + (i % 9) as f64 * 0.01)
                .with_median_views(Some(2_000 + (i * 7_919) % 60_000))
                .with_rate(40.0 + ((i * 37) % 400) as f64)
                .with_content_types(content)
                .with_genres([genres[(i % 4) as usize]])
                .with_territory(territories[(i % 4) as usize], tiers[(i % 3) as usize])
        })
        .collect()
}

fn audio_request(budget: f64) -> CampaignRequest {
    CampaignRequest::new(budget, CampaignType::AudioSeeding)
}

fn assert_consistent(result: &CampaignResult) {
    for row in &result.eligible_pool {
        assert_eq!(row.selected, row.posts_assigned > 0, "{}", row.id());
        assert_eq!(row.cost, row.rate() * f64::from(row.posts_assigned));
        assert_eq!(
            row.predicted_views_total,
            row.predicted_views_per_post * u64::from(row.posts_assigned)
        );
        assert!((0.0..=100.0).contains(&row.ranking_score));
    }
    let spent: f64 = result.selected.iter().map(|c| c.cost).sum();
    assert!(spent <= result.budget + 1e-9, "spent {spent} of {}", result.budget);
}

#[test]
fn scenario_a_budget_below_only_rate() {
    let creators = vec![creator("solo", 100.0, 10_000, 0.05)];
    let result = plan_campaign(&creators, &audio_request(50.0), &AllocationPolicy::default());
    assert_eq!(result.eligible_pool.len(), 1);
    assert!(result.selected.is_empty());
    assert_eq!(result.totals.total_cost, 0.0);
    assert!(result.allocation_insight.starts_with("No creators could be allocated"));
}

#[test]
fn scenario_b_single_creator_gets_capped_posts() {
    let creators = vec![creator("solo", 100.0, 10_000, 0.05)];
    let result = plan_campaign(&creators, &audio_request(1_000.0), &AllocationPolicy::default());
    assert_eq!(result.selected.len(), 1);
    assert_eq!(result.selected[0].posts_assigned, 2);
    assert_eq!(result.totals.total_cost, 200.0);
    assert_eq!(result.totals.budget_remaining, 800.0);
    assert_eq!(result.totals.budget_utilization, 20.0);
    assert_consistent(&result);
}

#[test]
fn scenario_c_extra_post_goes_to_higher_views() {
    let creators = vec![
        creator("y", 50.0, 8_000, 0.05),
        creator("x", 50.0, 12_000, 0.05),
    ];
    let result = plan_campaign(&creators, &audio_request(150.0), &AllocationPolicy::default());
    let posts = |id: &str| {
        result
            .selected
            .iter()
            .find(|c| c.id() == id)
            .map(|c| c.posts_assigned)
            .unwrap_or(0)
    };
    assert_eq!(posts("x"), 2);
    assert_eq!(posts("y"), 1);
    assert_eq!(result.totals.total_cost, 150.0);
}

#[test]
fn scenario_d_cp1k_ceiling_empties_pool() {
    let creators = vec![
        creator("a", 60.0, 10_000, 0.05),
        creator("b", 120.0, 20_000, 0.05),
    ];
    let request = audio_request(1_000.0).with_guardrails(Guardrails {
        max_cp1k: Some(5.0),
        ..Guardrails::default()
    });
    let result = plan_campaign(&creators, &request, &AllocationPolicy::default());
    assert!(result.eligible_pool.is_empty());
    assert!(result.selected.is_empty());
    assert!(result.allocation_insight.starts_with("No eligible creators matched"));
    assert!(result.allocation_insight.contains("CP1K ceiling"));

    let unguarded = plan_campaign(&creators, &audio_request(1_000.0), &AllocationPolicy::default());
    assert!(unguarded
        .eligible_pool
        .iter()
        .all(|c| (c.predicted_cp1k.expect("cp1k") - 6.0).abs() < 1e-9));
}

#[test]
fn scenario_e_reoptimize_reproduces_fresh_allocation() {
    let creators = varied_pool();
    let request = audio_request(2_500.0);
    let fresh = plan_campaign(&creators, &request, &AllocationPolicy::default());
    assert!(!fresh.selected.is_empty());

    let mut edited = fresh.clone();
    for id in fresh.selected.iter().map(|c| c.id().to_string()) {
        edited = set_selected(&edited, &id, false).expect("deselect");
    }
    assert!(edited.selected.is_empty());

    let reoptimized =
        reoptimize_allocation(&edited.eligible_pool, request.budget, &AllocationPolicy::default());
    assert_eq!(reoptimized, fresh);
}

#[test]
fn pipeline_is_idempotent() {
    let creators = varied_pool();
    let request = audio_request(3_000.0).with_territories(["US Primary"]);
    let first = plan_campaign(&creators, &request, &AllocationPolicy::default());
    let second = plan_campaign(&creators, &request, &AllocationPolicy::default());
    assert_eq!(first, second);
}

#[test]
fn allocations_respect_budget_and_consistency() {
    let creators = varied_pool();
    for budget in [45.0, 300.0, 1_234.5, 5_000.0, 50_000.0] {
        let result = plan_campaign(&creators, &audio_request(budget), &AllocationPolicy::default());
        assert_consistent(&result);
        assert!(result
            .selected
            .iter()
            .all(|c| c.posts_assigned <= AllocationPolicy::default().max_posts_per_creator));
    }
}

#[test]
fn wider_cap_is_a_policy_choice() {
    let creators = vec![creator("solo", 100.0, 10_000, 0.05)];
    let policy = AllocationPolicy {
        max_posts_per_creator: 5,
        ..AllocationPolicy::default()
    };
    let result = plan_campaign(&creators, &audio_request(1_000.0), &policy);
    assert_eq!(result.selected[0].posts_assigned, 5);
}

#[test]
fn tighter_guardrails_never_grow_the_pool() {
    let creators = varied_pool();
    let pool_size = |guardrails: Guardrails| {
        let request = audio_request(10_000.0).with_guardrails(guardrails);
        plan_campaign(&creators, &request, &AllocationPolicy::default())
            .eligible_pool
            .len()
    };

    let mut previous = usize::MAX;
    for min_er in [0.0, 2.0, 4.0, 6.0, 8.0, 10.0] {
        let size = pool_size(Guardrails {
            min_engagement_rate: Some(min_er),
            ..Guardrails::default()
        });
        assert!(size <= previous);
        previous = size;
    }

    let mut previous = usize::MAX;
    for min_views in [0, 10_000, 25_000, 40_000, 70_000] {
        let size = pool_size(Guardrails {
            min_median_views: Some(min_views),
            ..Guardrails::default()
        });
        assert!(size <= previous);
        previous = size;
    }

    let mut previous = usize::MAX;
    for max_cp1k in [500.0, 50.0, 20.0, 10.0, 1.0, 0.1] {
        let size = pool_size(Guardrails {
            max_cp1k: Some(max_cp1k),
            ..Guardrails::default()
        });
        assert!(size <= previous);
        previous = size;
    }
    assert_eq!(previous, 0);
}

#[test]
fn empty_creator_pool_yields_empty_result() {
    let result = plan_campaign(&[], &audio_request(500.0), &AllocationPolicy::default());
    assert!(result.eligible_pool.is_empty());
    assert_eq!(result.totals.total_creators, 0);
    assert!(result.allocation_insight.starts_with("No eligible creators matched"));
}
