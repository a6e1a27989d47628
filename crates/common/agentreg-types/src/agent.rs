use crate::{Principal, RegistryError};
use serde::{Deserialize, Serialize};

/// Agent identifiers are handed out densely from 0.
pub type AgentId = u64;

/// Lowest accepted rating value.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating value.
pub const MAX_RATING: u8 = 5;

/// Fixed-point average with two implied decimals, truncated toward zero.
///
/// `average_score(13, 3) == 433`; an agent with no ratings averages 0.
pub fn average_score(total_score: u64, total_ratings: u64) -> u64 {
    if total_ratings == 0 {
        return 0;
    }
    // u128 keeps `total_score * 100` exact for any u64 score.
    ((total_score as u128 * 100) / total_ratings as u128) as u64
}

/// The stored state of one registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    /// Current holder; may change through a transfer.
    pub owner: Principal,
    /// Identity that performed the registration. Never changes.
    pub creator: Principal,
    /// Stored verbatim, never interpreted.
    pub metadata_uri: String,
    pub total_ratings: u64,
    pub total_score: u64,
}

impl AgentRecord {
    pub fn new(id: AgentId, owner: Principal, creator: Principal, metadata_uri: String) -> Self {
        Self {
            id,
            owner,
            creator,
            metadata_uri,
            total_ratings: 0,
            total_score: 0,
        }
    }

    pub fn average_score(&self) -> u64 {
        average_score(self.total_score, self.total_ratings)
    }

    pub fn summary(&self) -> ReputationSummary {
        ReputationSummary {
            total_ratings: self.total_ratings,
            average_score: self.average_score(),
        }
    }

    pub fn details(&self) -> AgentDetails {
        AgentDetails {
            owner: self.owner.clone(),
            creator: self.creator.clone(),
            metadata_uri: self.metadata_uri.clone(),
        }
    }

    /// Returns a copy with one more rating of `value` folded into the counters.
    ///
    /// Range checking is the caller's job; this only guards the arithmetic.
    pub fn with_rating(&self, value: u8) -> Result<Self, RegistryError> {
        let total_ratings = self
            .total_ratings
            .checked_add(1)
            .ok_or(RegistryError::ScoreOverflow(self.id))?;
        let total_score = self
            .total_score
            .checked_add(u64::from(value))
            .ok_or(RegistryError::ScoreOverflow(self.id))?;
        Ok(Self {
            total_ratings,
            total_score,
            ..self.clone()
        })
    }
}

/// `(owner, creator, metadata_uri)` view of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDetails {
    pub owner: Principal,
    pub creator: Principal,
    pub metadata_uri: String,
}

/// `(total_ratings, average_score)` view of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationSummary {
    pub total_ratings: u64,
    pub average_score: u64,
}
