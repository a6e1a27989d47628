use crate::storage::{LedgerBatch, LedgerStorage};
use crate::store::AgentStore;
use agentreg_types::{AgentId, AgentRecord, Principal, RegistryError};
use std::sync::Arc;
use tracing::debug;

/// Owns the "has rated" marks and folds accepted ratings into the agent's
/// running sum and count.
///
/// The mark set is insert-only: a mark, once committed, is never cleared.
pub struct RatingLedger {
    storage: Arc<dyn LedgerStorage>,
}

impl RatingLedger {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    /// Whether `rater` has rated `id`. An unknown agent simply has no marks.
    pub fn has_rated(&self, id: AgentId, rater: &Principal) -> Result<bool, RegistryError> {
        self.storage.has_mark(id, rater)
    }

    /// Stage the mark for `(id, rater)` into `batch`.
    pub fn mark_rated(
        &self,
        id: AgentId,
        rater: &Principal,
        batch: &mut LedgerBatch,
    ) -> Result<(), RegistryError> {
        if batch.has_mark(id, rater) || self.has_rated(id, rater)? {
            return Err(RegistryError::AlreadyRated(id, rater.clone()));
        }
        batch.put_mark(id, rater.clone());
        Ok(())
    }

    /// Commit one rating: the counter update and the mark land together or
    /// not at all. Returns the post-update record.
    ///
    /// Range and self-rating checks belong to the caller.
    pub fn record_rating(
        &self,
        store: &AgentStore,
        id: AgentId,
        value: u8,
        rater: &Principal,
    ) -> Result<AgentRecord, RegistryError> {
        let mut batch = LedgerBatch::new();
        let updated = store.apply_rating(id, value, &mut batch)?;
        self.mark_rated(id, rater, &mut batch)?;
        self.storage.commit(batch)?;
        debug!(
            id,
            rater = %rater,
            total_ratings = updated.total_ratings,
            total_score = updated.total_score,
            "rating committed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use assert_matches::assert_matches;

    fn setup() -> (AgentStore, RatingLedger, AgentId) {
        let storage: Arc<dyn LedgerStorage> = Arc::new(InMemoryStorage::new());
        let mut store = AgentStore::open(storage.clone()).unwrap();
        let id = store
            .create(Principal::new("0xowner"), Principal::new("0xowner"), String::new())
            .unwrap();
        (store, RatingLedger::new(storage), id)
    }

    #[test]
    fn unknown_agent_has_no_marks() {
        let (_, ledger, _) = setup();
        assert!(!ledger.has_rated(404, &Principal::new("0xr1")).unwrap());
    }

    #[test]
    fn record_rating_sets_mark_and_counters() {
        let (store, ledger, id) = setup();
        let r1 = Principal::new("0xr1");
        let updated = ledger.record_rating(&store, id, 5, &r1).unwrap();
        assert_eq!((updated.total_ratings, updated.total_score), (1, 5));
        assert!(ledger.has_rated(id, &r1).unwrap());
        assert_eq!(store.get(id).unwrap(), updated);
    }

    #[test]
    fn second_mark_rejected_and_nothing_committed() {
        let (store, ledger, id) = setup();
        let r1 = Principal::new("0xr1");
        ledger.record_rating(&store, id, 5, &r1).unwrap();

        assert_matches!(
            ledger.record_rating(&store, id, 1, &r1),
            Err(RegistryError::AlreadyRated(i, r)) if i == id && r == r1
        );
        let record = store.get(id).unwrap();
        assert_eq!((record.total_ratings, record.total_score), (1, 5));
    }

    #[test]
    fn duplicate_within_one_batch_rejected() {
        let (_, ledger, id) = setup();
        let r1 = Principal::new("0xr1");
        let mut batch = LedgerBatch::new();
        ledger.mark_rated(id, &r1, &mut batch).unwrap();
        assert_matches!(
            ledger.mark_rated(id, &r1, &mut batch),
            Err(RegistryError::AlreadyRated(..))
        );
    }
}
