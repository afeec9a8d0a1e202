use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::eligibility::CreatorEligibility;
use crate::types::{CampaignResult, CampaignTotals};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_plan_table(result: &CampaignResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Creator",
        "Territory",
        "Score",
        "Views/Post",
        "CP1K",
        "Rate",
        "Posts",
        "Cost",
    ]);

    for (idx, row) in result.eligible_pool.iter().enumerate() {
        let posts_cell = if row.selected {
            Cell::new(row.posts_assigned).fg(Color::Green)
        } else {
            Cell::new("-").fg(Color::DarkGrey)
        };
        table.add_row(Row::from(vec![
            Cell::new(idx + 1),
            Cell::new(&row.creator.handle),
            Cell::new(format!(
                "{} ({})",
                row.creator.territory, row.creator.territory_confidence
            )),
            Cell::new(format!("{:.1}", row.ranking_score)),
            Cell::new(row.predicted_views_per_post),
            Cell::new(
                row.predicted_cp1k
                    .map(|v| format!("${v:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(format!("${:.2}", row.rate())),
            posts_cell,
            Cell::new(format!("${:.2}", row.cost)),
        ]));
    }

    let mut out = table.to_string();
    out.push('\n');
    out.push_str(&render_totals_table(&result.totals));
    out.push('\n');
    out.push_str(&result.allocation_insight);
    out
}

pub fn render_totals_table(totals: &CampaignTotals) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    let rows = vec![
        ("Creators", totals.total_creators.to_string()),
        ("Posts", totals.total_posts.to_string()),
        ("Total cost", format!("${:.2}", totals.total_cost)),
        ("Followers", totals.total_followers.to_string()),
        ("Median views", format!("{:.0}", totals.median_views)),
        ("Predicted views", totals.predicted_views.to_string()),
        ("Avg CP1K", format!("${:.2}", totals.avg_cp1k)),
        ("Avg CPV", format!("${:.2}", totals.avg_cpv)),
        ("Budget remaining", format!("${:.2}", totals.budget_remaining)),
        ("Utilization", format!("{:.1}%", totals.budget_utilization)),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    table.to_string()
}

pub fn render_eligibility_table(results: &[CreatorEligibility]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Creator", "Eligible", "Failed Rules"]);
    for r in results {
        let elig_cell = if r.eligible {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("NO").fg(Color::Red)
        };
        let failures = r
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(Row::from(vec![
            Cell::new(&r.handle),
            elig_cell,
            Cell::new(failures),
        ]));
    }
    table.to_string()
}
