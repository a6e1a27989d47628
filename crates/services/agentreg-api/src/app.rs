use agentreg_ledger::{BroadcastSink, ReputationService};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    get_agent_details_handler, get_average_rating_handler, get_reputation_summary_handler,
    get_total_agents_handler, has_address_rated_handler, health_check_handler,
    register_agent_handler, submit_rating_handler, transfer_agent_handler,
};
use crate::metrics::metrics_handler;
use crate::websocket::events_handler;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReputationService>,
    /// The sink `service` publishes to; websocket clients subscribe here.
    pub events: BroadcastSink,
}

impl AppState {
    /// Wire `service` to a fresh broadcast sink.
    pub fn new(service: ReputationService, event_buffer: usize) -> Self {
        let events = BroadcastSink::new(event_buffer);
        let service = service.with_sink(Arc::new(events.clone()));
        Self {
            service: Arc::new(service),
            events,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/metrics", get(metrics_handler))
        .route("/events", get(events_handler))
        .route("/agents", post(register_agent_handler))
        .route("/agents/count", get(get_total_agents_handler))
        .route("/agents/:id", get(get_agent_details_handler))
        .route("/agents/:id/ratings", post(submit_rating_handler))
        .route("/agents/:id/reputation", get(get_reputation_summary_handler))
        .route("/agents/:id/average", get(get_average_rating_handler))
        .route("/agents/:id/raters/:rater", get(has_address_rated_handler))
        .route("/agents/:id/owner", put(transfer_agent_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
