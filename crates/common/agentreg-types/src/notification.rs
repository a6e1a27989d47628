use crate::{AgentId, Principal};
use serde::{Deserialize, Serialize};

/// Emitted once an agent registration has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationNotification {
    pub id: AgentId,
    pub creator: Principal,
    pub metadata_uri: String,
}

/// Emitted once a rating has committed. `new_average` uses the post-update counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingNotification {
    pub id: AgentId,
    pub rater: Principal,
    pub rating_value: u8,
    pub new_average: u64,
}

/// Emitted once an owner reassignment has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferNotification {
    pub id: AgentId,
    pub previous_owner: Principal,
    pub new_owner: Principal,
}

/// Registry events for external subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notification {
    AgentRegistered(RegistrationNotification),
    RatingSubmitted(RatingNotification),
    AgentTransferred(TransferNotification),
}

impl Notification {
    pub fn agent_id(&self) -> AgentId {
        match self {
            Notification::AgentRegistered(n) => n.id,
            Notification::RatingSubmitted(n) => n.id,
            Notification::AgentTransferred(n) => n.id,
        }
    }
}
