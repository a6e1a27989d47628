use crate::allocator::IdentifierAllocator;
use crate::storage::{LedgerBatch, LedgerStorage};
use agentreg_types::{AgentId, AgentRecord, Principal, RegistryError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of truth for agent records.
///
/// Records are created here and never deleted, so every id below the
/// allocator's watermark exists.
pub struct AgentStore {
    storage: Arc<dyn LedgerStorage>,
    allocator: IdentifierAllocator,
}

impl AgentStore {
    pub fn new(storage: Arc<dyn LedgerStorage>, allocator: IdentifierAllocator) -> Self {
        Self { storage, allocator }
    }

    /// Store over `storage`, resuming allocation after the records already in it.
    pub fn open(storage: Arc<dyn LedgerStorage>) -> Result<Self, RegistryError> {
        let count = storage.record_count()?;
        Ok(Self::new(storage, IdentifierAllocator::starting_at(count)))
    }

    /// Register a new record with zeroed counters.
    ///
    /// The allocator only advances once the record is committed.
    pub fn create(
        &mut self,
        owner: Principal,
        creator: Principal,
        metadata_uri: String,
    ) -> Result<AgentId, RegistryError> {
        if owner.is_null() {
            return Err(RegistryError::InvalidOwner);
        }
        let mut allocator = self.allocator.clone();
        let id = allocator.next()?;

        let mut batch = LedgerBatch::new();
        batch.put_record(AgentRecord::new(id, owner, creator, metadata_uri));
        if let Err(e) = self.storage.commit(batch) {
            // A backend may report failure after its writes landed. Never issue
            // an id twice.
            if let Ok(Some(_)) = self.storage.load_record(id) {
                warn!(id, error = %e, "commit reported failure but record is stored");
                self.allocator = allocator;
            }
            return Err(e);
        }

        self.allocator = allocator;
        debug!(id, "agent record created");
        Ok(id)
    }

    pub fn get(&self, id: AgentId) -> Result<AgentRecord, RegistryError> {
        if !self.exists(id) {
            return Err(RegistryError::AgentNotFound(id));
        }
        self.storage
            .load_record(id)?
            .ok_or(RegistryError::AgentNotFound(id))
    }

    pub fn exists(&self, id: AgentId) -> bool {
        id < self.allocator.peek()
    }

    pub fn owner_of(&self, id: AgentId) -> Result<Principal, RegistryError> {
        Ok(self.get(id)?.owner)
    }

    /// Reassign the holder of an agent. The creator is untouched.
    pub fn set_owner(&mut self, id: AgentId, new_owner: Principal) -> Result<AgentRecord, RegistryError> {
        if new_owner.is_null() {
            return Err(RegistryError::InvalidOwner);
        }
        let mut record = self.get(id)?;
        record.owner = new_owner;
        let mut batch = LedgerBatch::new();
        batch.put_record(record.clone());
        self.storage.commit(batch)?;
        Ok(record)
    }

    /// Stage one more rating of `value` on `id` into `batch`.
    ///
    /// Nothing is visible to readers until the batch is committed. Staging
    /// twice for the same id in one batch folds both ratings in.
    pub fn apply_rating(
        &self,
        id: AgentId,
        value: u8,
        batch: &mut LedgerBatch,
    ) -> Result<AgentRecord, RegistryError> {
        let current = match batch.records().iter().find(|r| r.id == id) {
            Some(staged) => staged.clone(),
            None => self.get(id)?,
        };
        let updated = current.with_rating(value)?;
        batch.put_record(updated.clone());
        Ok(updated)
    }

    /// Number of records ever created; also the next id to be issued.
    pub fn count(&self) -> u64 {
        self.allocator.peek()
    }
}
