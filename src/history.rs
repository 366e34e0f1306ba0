//! Medical history log — append-only clinical notes.
//!
//! There is no update or delete operation by design: the log is an audit
//! trail. The append-only law is re-checked at commit time by the aggregate
//! succession validation.

use chrono::Utc;

use crate::error::RecordError;
use crate::models::enums::ActorRole;
use crate::models::history::MedicalRecordEntry;
use crate::models::record::PatientRecord;

/// Append a clinical note. Only clinicians may write; the entry is stamped
/// with the commit-time instant and never changes afterwards.
pub fn append(
    record: &mut PatientRecord,
    note: &str,
    author_name: &str,
    actor: ActorRole,
) -> Result<MedicalRecordEntry, RecordError> {
    if actor != ActorRole::Doctor {
        return Err(RecordError::Forbidden {
            role: actor,
            action: "append to the medical history",
        });
    }
    if note.trim().is_empty() {
        return Err(RecordError::Validation {
            field: "note",
            reason: "must not be empty".to_string(),
        });
    }
    if author_name.trim().is_empty() {
        return Err(RecordError::Validation {
            field: "author_name",
            reason: "must not be empty".to_string(),
        });
    }

    let entry = MedicalRecordEntry {
        recorded_at: Utc::now(),
        author_role: actor,
        author_name: author_name.trim().to_string(),
        note: note.trim().to_string(),
    };
    record.medical_history.push(entry.clone());
    Ok(entry)
}
