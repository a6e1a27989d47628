use agentreg_types::{AgentId, AgentRecord, Principal, RegistryError};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Writes staged by one transaction, applied all together by `LedgerStorage::commit`.
///
/// Marks can only be added: there is no way to express a removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerBatch {
    records: Vec<AgentRecord>,
    marks: Vec<(AgentId, Principal)>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a full record write. A later put for the same id wins.
    pub fn put_record(&mut self, record: AgentRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.push(record);
    }

    /// Stage a rating mark.
    pub fn put_mark(&mut self, id: AgentId, rater: Principal) {
        self.marks.push((id, rater));
    }

    pub fn has_mark(&self, id: AgentId, rater: &Principal) -> bool {
        self.marks.iter().any(|(i, r)| *i == id && r == rater)
    }

    pub fn records(&self) -> &[AgentRecord] {
        &self.records
    }

    pub fn marks(&self) -> &[(AgentId, Principal)] {
        &self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.marks.is_empty()
    }
}

/// Persistence substrate for the record table and the mark table.
pub trait LedgerStorage: Send + Sync {
    /// Load one agent record.
    fn load_record(&self, id: AgentId) -> Result<Option<AgentRecord>, RegistryError>;

    /// Number of records stored.
    fn record_count(&self) -> Result<u64, RegistryError>;

    /// Whether `rater` holds a mark for `id`.
    fn has_mark(&self, id: AgentId, rater: &Principal) -> Result<bool, RegistryError>;

    /// Apply every staged write atomically: readers see all of them or none.
    fn commit(&self, batch: LedgerBatch) -> Result<(), RegistryError>;
}

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<AgentId, AgentRecord>,
    marks: HashMap<AgentId, HashSet<Principal>>,
}

/// Both tables behind one lock, so a commit is a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: RwLock<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RegistryError {
    RegistryError::Storage("in-memory ledger lock poisoned".to_string())
}

impl LedgerStorage for InMemoryStorage {
    fn load_record(&self, id: AgentId) -> Result<Option<AgentRecord>, RegistryError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.records.get(&id).cloned())
    }

    fn record_count(&self) -> Result<u64, RegistryError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.records.len() as u64)
    }

    fn has_mark(&self, id: AgentId, rater: &Principal) -> Result<bool, RegistryError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables
            .marks
            .get(&id)
            .map_or(false, |raters| raters.contains(rater)))
    }

    fn commit(&self, batch: LedgerBatch) -> Result<(), RegistryError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let LedgerBatch { records, marks } = batch;
        for record in records {
            tables.records.insert(record.id, record);
        }
        for (id, rater) in marks {
            tables.marks.entry(id).or_default().insert(rater);
        }
        Ok(())
    }
}
