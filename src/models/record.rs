//! The patient record aggregate — the unit of consistency.
//!
//! One document per patient embedding the appointment list and the
//! medical-history log. The whole aggregate is read and written atomically;
//! `version` is the optimistic concurrency guard bumped on every commit.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::appointment::Appointment;
use super::history::MedicalRecordEntry;
use super::profile::PatientProfile;
use crate::error::RecordError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: Uuid,
    pub profile: PatientProfile,
    pub appointments: Vec<Appointment>,
    pub medical_history: Vec<MedicalRecordEntry>,
    pub version: u64,
}

impl PatientRecord {
    /// Fresh aggregate at account creation: empty collections, version 0.
    pub fn new(patient_id: Uuid, profile: PatientProfile) -> Self {
        Self {
            patient_id,
            profile,
            appointments: Vec::new(),
            medical_history: Vec::new(),
            version: 0,
        }
    }

    pub fn appointment(&self, id: Uuid) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn appointment_mut(&mut self, id: Uuid) -> Option<&mut Appointment> {
        self.appointments.iter_mut().find(|a| a.id == id)
    }

    /// Structural invariants that must hold for the aggregate in isolation.
    pub fn check_invariants(&self) -> Result<(), RecordError> {
        let mut seen = HashSet::with_capacity(self.appointments.len());
        for appt in &self.appointments {
            if !seen.insert(appt.id) {
                return Err(RecordError::InvalidMutation {
                    reason: format!("duplicate appointment id {}", appt.id),
                });
            }
        }
        Ok(())
    }

    /// Invariants that relate a candidate aggregate to the version it was
    /// derived from. Checked before every commit:
    ///
    /// - identity and version counter untouched by the mutation
    /// - medical history is a prefix-extension with at most one new entry
    /// - no appointment vanishes, and surviving statuses either stay put or
    ///   follow a legal state-machine edge
    pub fn check_succession(&self, prior: &PatientRecord) -> Result<(), RecordError> {
        if self.patient_id != prior.patient_id {
            return Err(RecordError::InvalidMutation {
                reason: "patient id changed".to_string(),
            });
        }
        if self.version != prior.version {
            return Err(RecordError::InvalidMutation {
                reason: "mutation touched the version counter".to_string(),
            });
        }

        if self.medical_history.len() < prior.medical_history.len() {
            return Err(RecordError::InvalidMutation {
                reason: "medical history shortened".to_string(),
            });
        }
        if self.medical_history.len() > prior.medical_history.len() + 1 {
            return Err(RecordError::InvalidMutation {
                reason: "more than one medical history entry appended".to_string(),
            });
        }
        if self.medical_history[..prior.medical_history.len()] != prior.medical_history[..] {
            return Err(RecordError::InvalidMutation {
                reason: "existing medical history entries modified".to_string(),
            });
        }

        for old in &prior.appointments {
            let Some(new) = self.appointment(old.id) else {
                return Err(RecordError::InvalidMutation {
                    reason: format!("appointment {} removed", old.id),
                });
            };
            if new.status != old.status && !old.status.can_transition_to(new.status) {
                return Err(RecordError::InvalidMutation {
                    reason: format!(
                        "appointment {} status moved {} -> {} outside the state machine",
                        old.id, old.status, new.status
                    ),
                });
            }
        }

        Ok(())
    }
}
