use crate::campaign::{territory_matches, CampaignRequest, CampaignType};
use crate::creators::Creator;
use crate::eligibility::{CreatorEligibility, RejectionReason};

pub fn filter_eligible(creators: &[Creator], request: &CampaignRequest) -> Vec<Creator> {
    let territories = request.normalized_territories();
    creators
        .iter()
        .filter(|creator| failed_rules(creator, request, &territories).is_empty())
        .cloned()
        .collect()
}

pub fn explain_eligibility(
    creators: &[Creator],
    request: &CampaignRequest,
) -> Vec<CreatorEligibility> {
    let territories = request.normalized_territories();
    creators
        .iter()
        .map(|creator| build_eligibility(creator, failed_rules(creator, request, &territories)))
        .collect()
}

pub fn evaluate_creator(creator: &Creator, request: &CampaignRequest) -> CreatorEligibility {
    let territories = request.normalized_territories();
    build_eligibility(creator, failed_rules(creator, request, &territories))
}

fn build_eligibility(creator: &Creator, failures: Vec<RejectionReason>) -> CreatorEligibility {
    CreatorEligibility {
        creator_id: creator.id.clone(),
        handle: creator.handle.clone(),
        eligible: failures.is_empty(),
        failures,
    }
}

fn failed_rules(
    creator: &Creator,
    request: &CampaignRequest,
    territories: &[String],
) -> Vec<RejectionReason> {
    let mut failures = Vec::new();

    if creator.followers == 0 {
        failures.push(RejectionReason::MissingFollowers);
    }
    if creator.engagement_rate <= 0.0 {
        failures.push(RejectionReason::MissingEngagement);
    }
    if creator.median_views.unwrap_or(0) == 0 {
        failures.push(RejectionReason::MissingMedianViews);
    }
    if creator.reel_rate <= 0.0 {
        failures.push(RejectionReason::MissingRate);
    }

    if !request.genres.is_empty() && !genres_overlap(&creator.music_genres, &request.genres) {
        failures.push(RejectionReason::GenreMismatch);
    }
    if !campaign_type_allowed(creator, request.campaign_type) {
        failures.push(RejectionReason::CampaignTypeMismatch);
    }
    if !request.content_types.is_empty() && !content_type_matches(creator, &request.content_types)
    {
        failures.push(RejectionReason::ContentTypeMismatch);
    }
    if !territories.is_empty()
        && !territory_matches(&creator.territory, territories)
        && !(creator.is_global() && creator.territory_confidence.is_at_least_med())
    {
        failures.push(RejectionReason::TerritoryMismatch);
    }

    if let Some(min_views) = request.guardrails.min_median_views {
        match creator.median_views {
            Some(views) if views >= min_views => {}
            _ => failures.push(RejectionReason::BelowMinMedianViews),
        }
    }
    if let Some(min_er_pct) = request.guardrails.min_engagement_rate {
        if creator.engagement_rate < min_er_pct / 100.0 {
            failures.push(RejectionReason::BelowMinEngagement);
        }
    }

    failures
}

fn genres_overlap(creator_genres: &[String], selected: &[String]) -> bool {
    creator_genres.iter().any(|genre| {
        let genre = genre.to_lowercase();
        selected.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            genre.contains(&wanted) || wanted.contains(&genre)
        })
    })
}

/// Creators tagged with an audio or footage marker only run in the matching
/// campaign type; untagged creators run in either.
fn campaign_type_allowed(creator: &Creator, campaign_type: CampaignType) -> bool {
    let markers: Vec<CampaignType> = CampaignType::ALL
        .into_iter()
        .filter(|kind| creator.has_content_marker(kind.marker()))
        .collect();
    markers.is_empty() || markers.contains(&campaign_type)
}

fn content_type_matches(creator: &Creator, preferences: &[String]) -> bool {
    creator.content_types.iter().any(|tag| {
        let tag = tag.to_lowercase();
        preferences
            .iter()
            .any(|pref| tag.contains(&pref.to_lowercase()))
    })
}
