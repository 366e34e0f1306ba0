//! Dashboard intents and their dispatch.
//!
//! Dashboards never touch the aggregate directly: they submit plain-data
//! intents, and `RecordService` runs each one as a load-validate-commit
//! cycle against the version-guarded store. A commit lost to a concurrent
//! writer is reloaded and replayed a bounded number of times before the
//! conflict is surfaced — the conflict is the only failure retrying can fix.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointment::{self, AppointmentRequest};
use crate::commit::commit;
use crate::config::EngineConfig;
use crate::error::RecordError;
use crate::history;
use crate::models::enums::{ActorRole, AppointmentStatus, Urgency};
use crate::models::profile::PatientProfile;
use crate::models::record::PatientRecord;
use crate::store::RecordStore;

/// A caller-submitted request to mutate one patient's aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    CreateAppointment {
        patient_id: Uuid,
        date: String,
        time: String,
        reason: String,
        #[serde(default)]
        symptoms: Option<String>,
        #[serde(default)]
        urgency: Option<Urgency>,
    },
    ChangeStatus {
        patient_id: Uuid,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        actor: ActorRole,
    },
    SetNotes {
        patient_id: Uuid,
        appointment_id: Uuid,
        notes: String,
        actor: ActorRole,
    },
    AppendHistory {
        patient_id: Uuid,
        note: String,
        author_name: String,
        actor: ActorRole,
    },
}

impl Intent {
    pub fn patient_id(&self) -> Uuid {
        match self {
            Self::CreateAppointment { patient_id, .. }
            | Self::ChangeStatus { patient_id, .. }
            | Self::SetNotes { patient_id, .. }
            | Self::AppendHistory { patient_id, .. } => *patient_id,
        }
    }
}

/// Entry point for both dashboards: owns the store handle and the engine
/// configuration, translates intents into guarded commits.
pub struct RecordService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the version-0 aggregate at account creation.
    pub fn register_patient(
        &self,
        patient_id: Uuid,
        profile: PatientProfile,
    ) -> Result<PatientRecord, RecordError> {
        let record = PatientRecord::new(patient_id, profile);
        self.store.insert(&record)?;
        tracing::info!(patient_id = %patient_id, "patient registered");
        Ok(record)
    }

    /// Read-only snapshot of one aggregate.
    pub fn load(&self, patient_id: Uuid) -> Result<PatientRecord, RecordError> {
        self.store.get(patient_id)?.ok_or(RecordError::NotFound {
            entity: "patient record",
            id: patient_id.to_string(),
        })
    }

    /// Run one intent to completion: load the current aggregate version,
    /// commit against it, and absorb up to `max_commit_retries` concurrent
    /// conflicts before giving up.
    pub fn dispatch(&self, intent: &Intent) -> Result<PatientRecord, RecordError> {
        let patient_id = intent.patient_id();
        let mut attempts = 0u32;

        loop {
            let current = self.load(patient_id)?;
            let result = commit(&self.store, patient_id, current.version, |record| {
                self.apply(intent, record)
            });

            match result {
                Err(RecordError::ConcurrencyConflict { expected, actual })
                    if attempts < self.config.max_commit_retries =>
                {
                    attempts += 1;
                    tracing::info!(
                        patient_id = %patient_id,
                        expected,
                        actual,
                        attempt = attempts,
                        "commit conflict, reloading"
                    );
                }
                other => return other,
            }
        }
    }

    fn apply(&self, intent: &Intent, record: &mut PatientRecord) -> Result<(), RecordError> {
        match intent {
            Intent::CreateAppointment {
                date,
                time,
                reason,
                symptoms,
                urgency,
                ..
            } => {
                let request = AppointmentRequest {
                    date: date.clone(),
                    time: time.clone(),
                    reason: reason.clone(),
                    symptoms: symptoms.clone(),
                    urgency: *urgency,
                };
                appointment::create(record, &request, &self.config).map(|_| ())
            }
            Intent::ChangeStatus {
                appointment_id,
                new_status,
                actor,
                ..
            } => appointment::transition(record, *appointment_id, *new_status, *actor).map(|_| ()),
            Intent::SetNotes {
                appointment_id,
                notes,
                actor,
                ..
            } => appointment::set_notes(record, *appointment_id, notes, *actor),
            Intent::AppendHistory {
                note,
                author_name,
                actor,
                ..
            } => history::append(record, note, author_name, *actor).map(|_| ()),
        }
    }
}
