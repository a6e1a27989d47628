//! `ReputationService`: the single entry point of the registry.
//!
//! Every public operation runs as one transaction under a service-wide
//! lock: preconditions are checked, the storage batch is committed, and the
//! resulting notification is delivered to every sink before the lock is
//! released. Reads take the same lock, so they only ever observe committed
//! states.

use crate::allocator::IdentifierAllocator;
use crate::guard::ReentrancyGuard;
use crate::metrics;
use crate::ratings::RatingLedger;
use crate::sink::NotificationSink;
use crate::storage::{InMemoryStorage, LedgerStorage};
use crate::store::AgentStore;
use agentreg_types::{
    AgentDetails, AgentId, AgentRecord, Notification, Principal, RatingNotification,
    RegistrationNotification, RegistryError, ReputationSummary, TransferNotification, MAX_RATING,
    MIN_RATING,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

struct Ledger {
    agents: AgentStore,
    ratings: RatingLedger,
}

pub struct ReputationService {
    ledger: Mutex<Ledger>,
    guard: ReentrancyGuard,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl ReputationService {
    /// Service over `storage`, continuing after any records it already holds.
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Result<Self, RegistryError> {
        let agents = AgentStore::open(storage.clone())?;
        Ok(Self::from_parts(agents, storage))
    }

    pub fn in_memory() -> Self {
        let storage: Arc<dyn LedgerStorage> = Arc::new(InMemoryStorage::new());
        let agents = AgentStore::new(storage.clone(), IdentifierAllocator::new());
        Self::from_parts(agents, storage)
    }

    fn from_parts(agents: AgentStore, storage: Arc<dyn LedgerStorage>) -> Self {
        metrics::set_registered_agents(agents.count());
        Self {
            ledger: Mutex::new(Ledger {
                agents,
                ratings: RatingLedger::new(storage),
            }),
            guard: ReentrancyGuard::new(),
            sinks: Vec::new(),
        }
    }

    /// Add a subscriber. Sinks are called in the order they were added.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Register a new agent held by `owner`; `caller` becomes its immutable creator.
    pub fn register_agent(
        &self,
        owner: Principal,
        metadata_uri: String,
        caller: &Principal,
    ) -> Result<AgentId, RegistryError> {
        self.transact("register_agent", |ledger| {
            let id = ledger
                .agents
                .create(owner.clone(), caller.clone(), metadata_uri.clone())?;
            metrics::set_registered_agents(ledger.agents.count());
            info!(id, owner = %owner, creator = %caller, "agent registered");
            let notification = Notification::AgentRegistered(RegistrationNotification {
                id,
                creator: caller.clone(),
                metadata_uri,
            });
            Ok((id, Some(notification)))
        })
    }

    /// Rate agent `id` on behalf of `rater`.
    ///
    /// Checks run in order: existence, range, self-rating, duplicate.
    pub fn submit_rating(
        &self,
        id: AgentId,
        value: i64,
        rater: &Principal,
    ) -> Result<RatingNotification, RegistryError> {
        self.transact("submit_rating", |ledger| {
            let record = ledger.agents.get(id)?;
            let value = match u8::try_from(value) {
                Ok(v) if (MIN_RATING..=MAX_RATING).contains(&v) => v,
                _ => return Err(RegistryError::InvalidRating(value)),
            };
            if *rater == record.owner {
                return Err(RegistryError::CannotRateOwnAgent(id));
            }
            if ledger.ratings.has_rated(id, rater)? {
                return Err(RegistryError::AlreadyRated(id, rater.clone()));
            }

            let updated = ledger
                .ratings
                .record_rating(&ledger.agents, id, value, rater)?;
            metrics::record_rating_accepted(value);

            let rated = RatingNotification {
                id,
                rater: rater.clone(),
                rating_value: value,
                new_average: updated.average_score(),
            };
            info!(
                id,
                rater = %rater,
                value,
                new_average = rated.new_average,
                "rating accepted"
            );
            Ok((rated.clone(), Some(Notification::RatingSubmitted(rated))))
        })
    }

    /// Hand agent `id` to `new_owner`. Only the current owner may do this.
    ///
    /// Returns the record as committed by this transfer.
    pub fn transfer_agent(
        &self,
        id: AgentId,
        new_owner: Principal,
        caller: &Principal,
    ) -> Result<AgentRecord, RegistryError> {
        self.transact("transfer_agent", |ledger| {
            let previous_owner = ledger.agents.owner_of(id)?;
            if *caller != previous_owner {
                return Err(RegistryError::NotAgentOwner {
                    id,
                    caller: caller.clone(),
                });
            }
            let record = ledger.agents.set_owner(id, new_owner.clone())?;
            info!(id, from = %previous_owner, to = %new_owner, "agent transferred");
            let notification = Notification::AgentTransferred(TransferNotification {
                id,
                previous_owner,
                new_owner,
            });
            Ok((record, Some(notification)))
        })
    }

    pub fn get_agent(&self, id: AgentId) -> Result<AgentRecord, RegistryError> {
        self.read("get_agent", |ledger| ledger.agents.get(id))
    }

    pub fn get_agent_details(&self, id: AgentId) -> Result<AgentDetails, RegistryError> {
        self.read("get_agent_details", |ledger| {
            ledger.agents.get(id).map(|r| r.details())
        })
    }

    pub fn get_reputation_summary(&self, id: AgentId) -> Result<ReputationSummary, RegistryError> {
        self.read("get_reputation_summary", |ledger| {
            ledger.agents.get(id).map(|r| r.summary())
        })
    }

    /// Average score ×100, truncated.
    pub fn get_average_rating(&self, id: AgentId) -> Result<u64, RegistryError> {
        self.read("get_average_rating", |ledger| {
            ledger.agents.get(id).map(|r| r.average_score())
        })
    }

    /// False both when `rater` has not rated `id` and when `id` does not exist.
    pub fn has_address_rated(&self, id: AgentId, rater: &Principal) -> Result<bool, RegistryError> {
        self.read("has_address_rated", |ledger| ledger.ratings.has_rated(id, rater))
    }

    pub fn get_total_agents(&self) -> Result<u64, RegistryError> {
        self.read("get_total_agents", |ledger| Ok(ledger.agents.count()))
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // Storage commits before any sink runs, so a panicking sink cannot
        // leave the ledger half-updated.
        self.ledger.lock().unwrap_or_else(|poisoned| {
            warn!("registry lock poisoned by a panicking caller; continuing");
            PoisonError::into_inner(poisoned)
        })
    }

    fn transact<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&mut Ledger) -> Result<(T, Option<Notification>), RegistryError>,
    ) -> Result<T, RegistryError> {
        if let Err(e) = self.guard.check() {
            warn!(operation, "re-entrant registry call rejected");
            metrics::record_operation(operation, e.kind());
            return Err(e);
        }
        let mut ledger = self.lock();
        let _held = self.guard.hold();

        match body(&mut ledger) {
            Ok((value, notification)) => {
                if let Some(notification) = notification {
                    for sink in &self.sinks {
                        sink.deliver(&notification);
                    }
                }
                metrics::record_operation(operation, metrics::STATUS_SUCCESS);
                Ok(value)
            }
            Err(e) => {
                if e.is_fatal() {
                    error!(operation, error = %e, "registry transaction failed");
                } else {
                    warn!(operation, error = %e, "registry transaction rejected");
                }
                metrics::record_operation(operation, e.kind());
                Err(e)
            }
        }
    }

    fn read<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&Ledger) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        self.guard.check()?;
        let ledger = self.lock();
        let _held = self.guard.hold();
        let result = body(&ledger);
        if let Err(e) = &result {
            debug!(operation, error = %e, "registry query failed");
        }
        result
    }
}
