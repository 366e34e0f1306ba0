//! Version-guarded aggregate commit.
//!
//! Every mutation runs as load → mutate → validate → bump → compare-and-swap.
//! Two dashboards editing the same patient concurrently cannot silently lose
//! a write: the later committer sees `ConcurrencyConflict` and must reload.

use uuid::Uuid;

use crate::error::RecordError;
use crate::models::record::PatientRecord;
use crate::store::{CasOutcome, RecordStore};

/// Apply `mutate` to the aggregate stored under `patient_id`, guarded by
/// `expected_version`.
///
/// Fails with `NotFound` if no aggregate exists, `ConcurrencyConflict` if the
/// stored version is not `expected_version` (checked on load *and* again by
/// the storage-layer swap), and `InvalidMutation` if the candidate violates
/// the aggregate invariants. Nothing is persisted on any failure path.
pub fn commit<S, F>(
    store: &S,
    patient_id: Uuid,
    expected_version: u64,
    mutate: F,
) -> Result<PatientRecord, RecordError>
where
    S: RecordStore + ?Sized,
    F: FnOnce(&mut PatientRecord) -> Result<(), RecordError>,
{
    let current = store.get(patient_id)?.ok_or(RecordError::NotFound {
        entity: "patient record",
        id: patient_id.to_string(),
    })?;

    if current.version != expected_version {
        return Err(RecordError::ConcurrencyConflict {
            expected: expected_version,
            actual: current.version,
        });
    }

    let mut candidate = current.clone();
    mutate(&mut candidate)?;
    candidate.check_invariants()?;
    candidate.check_succession(&current)?;
    candidate.version = current.version + 1;

    match store.compare_and_swap(expected_version, &candidate)? {
        CasOutcome::Committed => {
            tracing::debug!(
                patient_id = %patient_id,
                version = candidate.version,
                "aggregate committed"
            );
            Ok(candidate)
        }
        CasOutcome::VersionMismatch { actual } => {
            tracing::warn!(
                patient_id = %patient_id,
                expected = expected_version,
                actual,
                "commit lost the race"
            );
            Err(RecordError::ConcurrencyConflict {
                expected: expected_version,
                actual,
            })
        }
    }
}
