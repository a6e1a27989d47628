#![forbid(unsafe_code)]

pub mod allocator;
pub mod guard;
pub mod metrics;
pub mod ratings;
pub mod service;
pub mod sink;
pub mod sled_storage;
pub mod storage;
pub mod store;

pub use allocator::IdentifierAllocator;
pub use ratings::RatingLedger;
pub use service::ReputationService;
pub use sink::{BroadcastSink, MemorySink, NotificationSink};
pub use sled_storage::SledStorage;
pub use storage::{InMemoryStorage, LedgerBatch, LedgerStorage};
pub use store::AgentStore;

pub use agentreg_types::*;
