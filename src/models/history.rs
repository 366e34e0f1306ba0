use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ActorRole;

/// One immutable entry in a patient's medical history.
///
/// Entries are never edited or removed after commit; the log is an audit
/// trail, not an editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordEntry {
    pub recorded_at: DateTime<Utc>,
    pub author_role: ActorRole,
    pub author_name: String,
    pub note: String,
}
