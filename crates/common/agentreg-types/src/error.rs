use crate::{AgentId, Principal};
use thiserror::Error;

/// Every way a registry transaction can be rejected.
///
/// A rejected transaction never leaves partial effects behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("owner must be a non-null principal")]
    InvalidOwner,

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("invalid rating {0}: must be between 1 and 5")]
    InvalidRating(i64),

    #[error("cannot rate own agent {0}")]
    CannotRateOwnAgent(AgentId),

    #[error("{1} has already rated agent {0}")]
    AlreadyRated(AgentId, Principal),

    #[error("{caller} is not the owner of agent {id}")]
    NotAgentOwner { id: AgentId, caller: Principal },

    #[error("re-entrant call into the registry rejected")]
    Reentrant,

    #[error("agent identifier space exhausted")]
    IdentifierSpaceExhausted,

    #[error("rating counters for agent {0} would overflow")]
    ScoreOverflow(AgentId),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Capacity and backend failures, as opposed to a caller's invalid request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RegistryError::IdentifierSpaceExhausted
                | RegistryError::ScoreOverflow(_)
                | RegistryError::Storage(_)
        )
    }

    /// Short stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidOwner => "invalid_owner",
            RegistryError::AgentNotFound(_) => "agent_not_found",
            RegistryError::InvalidRating(_) => "invalid_rating",
            RegistryError::CannotRateOwnAgent(_) => "self_rating",
            RegistryError::AlreadyRated(..) => "already_rated",
            RegistryError::NotAgentOwner { .. } => "not_owner",
            RegistryError::Reentrant => "reentrant",
            RegistryError::IdentifierSpaceExhausted => "id_exhausted",
            RegistryError::ScoreOverflow(_) => "score_overflow",
            RegistryError::Storage(_) => "storage",
        }
    }
}
