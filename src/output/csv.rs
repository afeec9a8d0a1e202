use anyhow::Result;

use crate::eligibility::CreatorEligibility;
use crate::types::CreatorWithPredictions;

/// Export of the selected creators, one row per creator.
pub fn selection_to_csv(selected: &[CreatorWithPredictions]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "handle",
        "territory",
        "followers",
        "posts",
        "rate",
        "cost",
        "predicted_views_per_post",
        "predicted_views_total",
        "predicted_cp1k",
        "ranking_score",
    ])?;
    for row in selected.iter().filter(|c| c.selected) {
        writer.write_record([
            row.creator.id.clone(),
            row.creator.handle.clone(),
            row.creator.territory.clone(),
            row.creator.followers.to_string(),
            row.posts_assigned.to_string(),
            format!("{:.2}", row.rate()),
            format!("{:.2}", row.cost),
            row.predicted_views_per_post.to_string(),
            row.predicted_views_total.to_string(),
            row.predicted_cp1k
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default(),
            format!("{:.1}", row.ranking_score),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn eligibility_to_csv(results: &[CreatorEligibility]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["id", "handle", "eligible", "failures"])?;
    for result in results {
        let failures = result
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        writer.write_record([
            result.creator_id.clone(),
            result.handle.clone(),
            result.eligible.to_string(),
            failures,
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::Creator;
    use crate::eligibility::RejectionReason;

    #[test]
    fn exports_only_selected_rows() {
        let picked = CreatorWithPredictions::new(
            Creator::new("c1", "@one").with_rate(120.0),
            8_000,
            Some(15.0),
        )
        .with_posts(2);
        let skipped =
            CreatorWithPredictions::new(Creator::new("c2", "@two").with_rate(50.0), 1_000, None);
        let csv = selection_to_csv(&[picked, skipped]).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("c1,@one,,0,2,120.00,240.00,8000,16000,15.00,0.0"));
    }

    #[test]
    fn joins_failure_reasons() {
        let rows = vec![CreatorEligibility {
            creator_id: "c1".to_string(),
            handle: "@one".to_string(),
            eligible: false,
            failures: vec![RejectionReason::GenreMismatch, RejectionReason::MissingRate],
        }];
        let csv = eligibility_to_csv(&rows).expect("csv");
        assert!(csv.contains("c1,@one,false,genre mismatch; no sponsorship rate"));
    }
}
