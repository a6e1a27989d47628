//! Agent Registry types: identities, agent records, and the reputation
//! arithmetic shared by the ledger and its front-ends.
//!
//! - `Principal` is the opaque caller identity (`did:key:…`, `0x…`).
//! - `AgentRecord` carries the running `total_score`/`total_ratings` pair the
//!   average is derived from; the average itself is never stored.
//! - `RegistryError` is the closed error taxonomy of every ledger operation.

#![forbid(unsafe_code)]

pub mod agent;
pub mod error;
pub mod notification;
pub mod principal;

pub use agent::{
    average_score, AgentDetails, AgentId, AgentRecord, ReputationSummary, MAX_RATING, MIN_RATING,
};
pub use error::RegistryError;
pub use notification::{
    Notification, RatingNotification, RegistrationNotification, TransferNotification,
};
pub use principal::{Principal, PrincipalError};
