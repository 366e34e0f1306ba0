//! In-process aggregate store backed by `RwLock<HashMap>`.
//!
//! Concurrent readers, exclusive writers. Used by tests and by hosts that
//! embed the engine without a durable backend.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{CasOutcome, RecordStore, StoreError};
use crate::models::record::PatientRecord;

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, PatientRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, patient_id: Uuid) -> Result<Option<PatientRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(&patient_id).cloned())
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        match records.entry(record.patient_id) {
            Entry::Occupied(_) => Err(StoreError::ConstraintViolation(format!(
                "patient {} already registered",
                record.patient_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn compare_and_swap(
        &self,
        expected_version: u64,
        record: &PatientRecord,
    ) -> Result<CasOutcome, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(stored) = records.get_mut(&record.patient_id) else {
            return Err(StoreError::ConstraintViolation(format!(
                "patient {} not registered",
                record.patient_id
            )));
        };
        if stored.version != expected_version {
            return Ok(CasOutcome::VersionMismatch {
                actual: stored.version,
            });
        }
        *stored = record.clone();
        Ok(CasOutcome::Committed)
    }

    fn list(&self) -> Result<Vec<PatientRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<PatientRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| r.patient_id);
        Ok(all)
    }
}
