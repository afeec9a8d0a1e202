use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::allocator::AllocationPolicy;
use crate::campaign::CampaignRequest;
use crate::config::Config;
use crate::creators::source::{source_for_path, CreatorSource, InMemorySource};
use crate::creators::Creator;
use crate::eligibility::{explain_eligibility, CreatorEligibility};
use crate::planner::{plan_campaign, recalculate, reoptimize_allocation, set_posts, set_selected};
use crate::types::{CampaignResult, CreatorWithPredictions};

#[derive(Clone)]
struct ApiState {
    config: Config,
    creators_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct PlanRequest {
    request: CampaignRequest,
    creators: Option<Vec<Creator>>,
    max_posts_per_creator: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReoptimizeRequest {
    pool: Vec<CreatorWithPredictions>,
    budget: f64,
    max_posts_per_creator: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct TotalsRequest {
    result: CampaignResult,
}

#[derive(Debug, Clone, Deserialize)]
struct EditRequest {
    result: CampaignResult,
    creator_id: String,
    posts: Option<u32>,
    selected: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct EligibilityRequest {
    request: CampaignRequest,
    creators: Option<Vec<Creator>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct EligibilityResponse {
    eligible: usize,
    results: Vec<CreatorEligibility>,
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/config", get(show_config))
        .route("/v1/plan", post(plan))
        .route("/v1/reoptimize", post(reoptimize))
        .route("/v1/totals", post(totals))
        .route("/v1/edit", post(edit))
        .route("/v1/eligibility", post(eligibility))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let state = ApiState {
        creators_path: config.resolved_creators_path(),
        config,
    };
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    ok(state.config)
}

async fn plan(
    State(state): State<ApiState>,
    Json(body): Json<PlanRequest>,
) -> ApiResult<CampaignResult> {
    validate_budget(body.request.budget)?;
    let creators = resolve_creators(&state, body.creators)?;
    let policy = resolve_policy(&state, body.max_posts_per_creator);
    Ok(ok(plan_campaign(&creators, &body.request, &policy)))
}

async fn reoptimize(
    State(state): State<ApiState>,
    Json(body): Json<ReoptimizeRequest>,
) -> ApiResult<CampaignResult> {
    validate_budget(body.budget)?;
    let policy = resolve_policy(&state, body.max_posts_per_creator);
    Ok(ok(reoptimize_allocation(&body.pool, body.budget, &policy)))
}

async fn totals(Json(body): Json<TotalsRequest>) -> ApiResult<CampaignResult> {
    Ok(ok(recalculate(&body.result)))
}

async fn edit(Json(body): Json<EditRequest>) -> ApiResult<CampaignResult> {
    let edited = match (body.posts, body.selected) {
        (Some(posts), _) => set_posts(&body.result, &body.creator_id, posts),
        (None, Some(selected)) => set_selected(&body.result, &body.creator_id, selected),
        (None, None) => {
            return Err(ApiError::bad_request("either posts or selected is required"));
        }
    };
    edited
        .map(ok)
        .map_err(|error| ApiError::not_found(error.to_string()))
}

async fn eligibility(
    State(state): State<ApiState>,
    Json(body): Json<EligibilityRequest>,
) -> ApiResult<EligibilityResponse> {
    let creators = resolve_creators(&state, body.creators)?;
    let results = explain_eligibility(&creators, &body.request);
    Ok(ok(EligibilityResponse {
        eligible: results.iter().filter(|r| r.eligible).count(),
        results,
    }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn validate_budget(budget: f64) -> std::result::Result<(), ApiError> {
    if budget.is_finite() && budget > 0.0 {
        Ok(())
    } else {
        Err(ApiError::bad_request("budget must be a positive amount"))
    }
}

fn resolve_policy(state: &ApiState, max_posts: Option<u32>) -> AllocationPolicy {
    let mut policy = state.config.policy();
    if let Some(max_posts) = max_posts {
        policy.max_posts_per_creator = max_posts.max(1);
    }
    policy
}

fn resolve_creators(
    state: &ApiState,
    inline: Option<Vec<Creator>>,
) -> std::result::Result<Vec<Creator>, ApiError> {
    let source: Box<dyn CreatorSource> = match inline {
        Some(creators) => Box::new(InMemorySource::new(creators)),
        None => source_for_path(&state.creators_path),
    };
    source.load().map_err(|error| {
        warn!("failed loading creators: {error:#}");
        ApiError::internal(format!("{error:#}"))
    })
}
