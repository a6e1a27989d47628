use agentreg_ledger::{AgentId, Principal};
use serde::{Deserialize, Serialize};

/// Header carrying the ambient caller identity.
pub const CALLER_HEADER: &str = "x-caller-id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAgentRequest {
    pub owner: Principal,
    #[serde(default)]
    pub metadata_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAgentResponse {
    pub id: AgentId,
}

/// Wide integer so out-of-range values still reach the registry's checks
/// instead of failing JSON decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRatingRequest {
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAgentRequest {
    pub new_owner: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageRatingResponse {
    pub id: AgentId,
    pub average_score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasRatedResponse {
    pub id: AgentId,
    pub rater: Principal,
    pub has_rated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalAgentsResponse {
    pub total_agents: u64,
}
