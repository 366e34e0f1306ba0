//! Durable keyed storage for patient record aggregates.
//!
//! The engines never write unconditionally: every mutation lands through
//! `compare_and_swap` against the version loaded at the start of the cycle.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;
use uuid::Uuid;

use crate::models::record::PatientRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Outcome of a conditional write. A mismatch reports the version actually
/// stored so the caller can surface or retry against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Committed,
    VersionMismatch { actual: u64 },
}

/// Keyed aggregate storage with compare-and-swap semantics.
///
/// `record.version` passed to `compare_and_swap` is the *new* version; the
/// swap only lands if the stored version still equals `expected_version`.
/// The swap must be atomic at the storage layer — whole aggregate, single
/// operation, never independent field writes.
pub trait RecordStore: Send + Sync {
    fn get(&self, patient_id: Uuid) -> Result<Option<PatientRecord>, StoreError>;

    /// Create the aggregate row. Fails with `ConstraintViolation` if the
    /// patient is already registered.
    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError>;

    fn compare_and_swap(
        &self,
        expected_version: u64,
        record: &PatientRecord,
    ) -> Result<CasOutcome, StoreError>;

    fn list(&self) -> Result<Vec<PatientRecord>, StoreError>;
}
