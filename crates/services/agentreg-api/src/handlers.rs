use agentreg_ledger::{
    AgentDetails, AgentId, Principal, RatingNotification, ReputationService, ReputationSummary,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::ApiError;
use crate::models::*;

/// The ambient caller, taken from the `x-caller-id` header.
///
/// Never read from a request body, so a caller cannot claim another identity
/// as creator or rater.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", CALLER_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(format!("{} header is not valid text", CALLER_HEADER)))?;
        let principal: Principal = raw
            .parse()
            .map_err(|e| ApiError::Unauthorized(format!("invalid caller: {}", e)))?;
        if principal.is_null() {
            return Err(ApiError::Unauthorized("caller must be a non-null principal".to_string()));
        }
        Ok(Caller(principal))
    }
}

/// Run a registry call off the async executor. The service lock may be held
/// across a sled flush.
async fn blocking<T, F>(service: &Arc<ReputationService>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ReputationService) -> Result<T, agentreg_ledger::RegistryError> + Send + 'static,
{
    let service = Arc::clone(service);
    Ok(tokio::task::spawn_blocking(move || f(&service)).await??)
}

// GET /health
pub async fn health_check_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// POST /agents
pub async fn register_agent_handler(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<RegisterAgentResponse>), ApiError> {
    let id = blocking(&state.service, move |svc| {
        svc.register_agent(req.owner, req.metadata_uri, &caller)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(RegisterAgentResponse { id })))
}

// GET /agents/count
pub async fn get_total_agents_handler(
    State(state): State<AppState>,
) -> Result<Json<TotalAgentsResponse>, ApiError> {
    let total_agents = blocking(&state.service, |svc| svc.get_total_agents()).await?;
    Ok(Json(TotalAgentsResponse { total_agents }))
}

// GET /agents/:id
pub async fn get_agent_details_handler(
    State(state): State<AppState>,
    Path(id): Path<AgentId>,
) -> Result<Json<AgentDetails>, ApiError> {
    let details = blocking(&state.service, move |svc| svc.get_agent_details(id)).await?;
    Ok(Json(details))
}

// POST /agents/:id/ratings
pub async fn submit_rating_handler(
    State(state): State<AppState>,
    Caller(rater): Caller,
    Path(id): Path<AgentId>,
    Json(req): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<RatingNotification>), ApiError> {
    let rated = blocking(&state.service, move |svc| {
        svc.submit_rating(id, req.rating, &rater)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(rated)))
}

// GET /agents/:id/reputation
pub async fn get_reputation_summary_handler(
    State(state): State<AppState>,
    Path(id): Path<AgentId>,
) -> Result<Json<ReputationSummary>, ApiError> {
    let summary = blocking(&state.service, move |svc| svc.get_reputation_summary(id)).await?;
    Ok(Json(summary))
}

// GET /agents/:id/average
pub async fn get_average_rating_handler(
    State(state): State<AppState>,
    Path(id): Path<AgentId>,
) -> Result<Json<AverageRatingResponse>, ApiError> {
    let average_score = blocking(&state.service, move |svc| svc.get_average_rating(id)).await?;
    Ok(Json(AverageRatingResponse { id, average_score }))
}

// GET /agents/:id/raters/:rater
pub async fn has_address_rated_handler(
    State(state): State<AppState>,
    Path((id, rater)): Path<(AgentId, String)>,
) -> Result<Json<HasRatedResponse>, ApiError> {
    let rater: Principal = rater
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid rater: {}", e)))?;
    let query = rater.clone();
    let has_rated = blocking(&state.service, move |svc| svc.has_address_rated(id, &query)).await?;
    Ok(Json(HasRatedResponse { id, rater, has_rated }))
}

// PUT /agents/:id/owner
pub async fn transfer_agent_handler(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<AgentId>,
    Json(req): Json<TransferAgentRequest>,
) -> Result<Json<AgentDetails>, ApiError> {
    let record = blocking(&state.service, move |svc| {
        svc.transfer_agent(id, req.new_owner, &caller)
    })
    .await?;
    Ok(Json(record.details()))
}
