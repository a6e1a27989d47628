use crate::metrics::STORAGE_ERRORS_TOTAL;
use crate::storage::{LedgerBatch, LedgerStorage};
use agentreg_types::{AgentId, AgentRecord, Principal, RegistryError};
use anyhow::{Context, Result};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use tracing::error;

const RECORDS_TREE_NAME: &str = "agent_records";
const MARKS_TREE_NAME: &str = "rating_marks";

/// A `LedgerStorage` backed by a sled database.
///
/// Records are keyed by the big-endian agent id, so tree order is id order.
/// Marks are keyed by the big-endian id followed by the rater's bytes.
#[derive(Clone)] // sled handles are Arc internally
pub struct SledStorage {
    db: Db,
    records: Tree,
    marks: Tree,
}

impl SledStorage {
    /// Opens or creates a sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening agent ledger database at: {:?}", path);
        let db = sled::open(path)
            .with_context(|| format!("Failed to open sled database at {:?}", path))?;
        Self::from_db(db)
    }

    /// Uses an already opened database, e.g. a temporary one.
    pub fn from_db(db: Db) -> Result<Self> {
        let records = db
            .open_tree(RECORDS_TREE_NAME)
            .context("Failed to open agent_records tree")?;
        let marks = db
            .open_tree(MARKS_TREE_NAME)
            .context("Failed to open rating_marks tree")?;
        Ok(Self { db, records, marks })
    }

    fn mark_key(id: AgentId, rater: &Principal) -> Vec<u8> {
        let mut key = id.to_be_bytes().to_vec();
        key.extend_from_slice(rater.as_str().as_bytes());
        key
    }

    fn io_error(operation: &str, e: impl std::fmt::Display) -> RegistryError {
        STORAGE_ERRORS_TOTAL.with_label_values(&["sled", operation]).inc();
        error!(operation, error = %e, "sled ledger operation failed");
        RegistryError::Storage(format!("sled {} failed: {}", operation, e))
    }
}

impl LedgerStorage for SledStorage {
    fn load_record(&self, id: AgentId) -> Result<Option<AgentRecord>, RegistryError> {
        match self.records.get(id.to_be_bytes()) {
            Ok(Some(ivec)) => bincode::deserialize::<AgentRecord>(&ivec)
                .map(Some)
                .map_err(|e| Self::io_error("deserialize", e)),
            Ok(None) => Ok(None),
            Err(e) => Err(Self::io_error("get", e)),
        }
    }

    fn record_count(&self) -> Result<u64, RegistryError> {
        // Only consulted when a service is opened; sled counts by scanning.
        Ok(self.records.len() as u64)
    }

    fn has_mark(&self, id: AgentId, rater: &Principal) -> Result<bool, RegistryError> {
        self.marks
            .contains_key(Self::mark_key(id, rater))
            .map_err(|e| Self::io_error("contains", e))
    }

    fn commit(&self, batch: LedgerBatch) -> Result<(), RegistryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut encoded = Vec::with_capacity(batch.records().len());
        for record in batch.records() {
            let bytes = bincode::serialize(record).map_err(|e| Self::io_error("serialize", e))?;
            encoded.push((record.id.to_be_bytes(), bytes));
        }
        let mark_keys: Vec<Vec<u8>> = batch
            .marks()
            .iter()
            .map(|(id, rater)| Self::mark_key(*id, rater))
            .collect();

        (&self.records, &self.marks)
            .transaction(|(records, marks)| {
                for (key, value) in &encoded {
                    records.insert(&key[..], value.as_slice())?;
                }
                for key in &mark_keys {
                    marks.insert(key.as_slice(), &[] as &[u8])?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(()) => Self::io_error("commit", "transaction aborted"),
                TransactionError::Storage(err) => Self::io_error("commit", err),
            })?;

        // The transaction is applied at this point, so a failed flush must not
        // turn the commit into a rejection.
        if let Err(e) = self.db.flush() {
            STORAGE_ERRORS_TOTAL.with_label_values(&["sled", "flush"]).inc();
            error!(error = %e, "sled flush failed after commit; durability deferred");
        }
        Ok(())
    }
}
