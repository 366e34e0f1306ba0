//! Appointment engine — booking, the status state machine, clinician notes.
//!
//! Operates on an aggregate already loaded by the commit guard; every
//! function validates, then mutates in place, and returns a typed failure
//! without partial effect otherwise. Role checks live here, not in the
//! dashboards: authorization is enforced once, centrally.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::RecordError;
use crate::models::appointment::Appointment;
use crate::models::enums::{ActorRole, AppointmentStatus, Urgency};
use crate::models::record::PatientRecord;

/// Booking request as submitted by the patient dashboard. Date and time
/// arrive as form strings and are parsed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub reason: String,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// Book a new appointment. Initial status is always `pending`.
pub fn create(
    record: &mut PatientRecord,
    request: &AppointmentRequest,
    config: &EngineConfig,
) -> Result<Appointment, RecordError> {
    if request.reason.trim().is_empty() {
        return Err(RecordError::Validation {
            field: "reason",
            reason: "must not be empty".to_string(),
        });
    }
    let date = parse_date(&request.date)?;
    let time = parse_time(&request.time)?;

    if config.enforce_slot_conflicts
        && record.appointments.iter().any(|a| a.occupies(date, time))
    {
        return Err(RecordError::SlotConflict { date, time });
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        date,
        time,
        reason: request.reason.trim().to_string(),
        symptoms: request.symptoms.clone().filter(|s| !s.trim().is_empty()),
        urgency: request.urgency,
        status: AppointmentStatus::Pending,
        notes: None,
    };
    record.appointments.push(appointment.clone());
    Ok(appointment)
}

/// Move an appointment along the status machine.
///
/// Patients may only cancel their own pending/confirmed appointments;
/// confirming and completing are clinician operations.
pub fn transition(
    record: &mut PatientRecord,
    appointment_id: Uuid,
    new_status: AppointmentStatus,
    actor: ActorRole,
) -> Result<Appointment, RecordError> {
    let current = record
        .appointment(appointment_id)
        .ok_or(RecordError::NotFound {
            entity: "appointment",
            id: appointment_id.to_string(),
        })?
        .status;

    if !current.can_transition_to(new_status) {
        return Err(RecordError::InvalidTransition {
            from: current,
            to: new_status,
        });
    }
    if actor == ActorRole::Patient && new_status != AppointmentStatus::Cancelled {
        return Err(RecordError::Forbidden {
            role: actor,
            action: "change appointment status (patients may only cancel)",
        });
    }

    // Lookup cannot fail past the check above.
    let appointment = record
        .appointment_mut(appointment_id)
        .ok_or(RecordError::NotFound {
            entity: "appointment",
            id: appointment_id.to_string(),
        })?;
    appointment.status = new_status;
    Ok(appointment.clone())
}

/// Set the clinician notes on an appointment.
pub fn set_notes(
    record: &mut PatientRecord,
    appointment_id: Uuid,
    notes: &str,
    actor: ActorRole,
) -> Result<(), RecordError> {
    if actor != ActorRole::Doctor {
        return Err(RecordError::Forbidden {
            role: actor,
            action: "write appointment notes",
        });
    }
    let appointment = record
        .appointment_mut(appointment_id)
        .ok_or(RecordError::NotFound {
            entity: "appointment",
            id: appointment_id.to_string(),
        })?;
    appointment.notes = Some(notes.to_string());
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, RecordError> {
    if s.trim().is_empty() {
        return Err(RecordError::Validation {
            field: "date",
            reason: "must not be empty".to_string(),
        });
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| RecordError::Validation {
        field: "date",
        reason: format!("not a calendar date (expected YYYY-MM-DD): {s}"),
    })
}

fn parse_time(s: &str) -> Result<NaiveTime, RecordError> {
    if s.trim().is_empty() {
        return Err(RecordError::Validation {
            field: "time",
            reason: "must not be empty".to_string(),
        });
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| RecordError::Validation {
        field: "time",
        reason: format!("not a time of day (expected HH:MM): {s}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::PatientProfile;

    fn test_record() -> PatientRecord {
        PatientRecord::new(
            Uuid::new_v4(),
            PatientProfile::new("Marie Dupont", "marie@example.com", ActorRole::Patient),
        )
    }

    fn cleaning_request() -> AppointmentRequest {
        AppointmentRequest {
            date: "2024-06-01".to_string(),
            time: "09:00".to_string(),
            reason: "Cleaning".to_string(),
            symptoms: None,
            urgency: None,
        }
    }

    // ── create ───────────────────────────────────────────

    #[test]
    fn create_starts_pending() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();

        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(appt.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(record.appointments.len(), 1);
    }

    #[test]
    fn create_keeps_symptoms_and_urgency() {
        let mut record = test_record();
        let request = AppointmentRequest {
            symptoms: Some("Toothache on the left side".to_string()),
            urgency: Some(Urgency::Urgent),
            ..cleaning_request()
        };
        let appt = create(&mut record, &request, &EngineConfig::default()).unwrap();
        assert_eq!(appt.symptoms.as_deref(), Some("Toothache on the left side"));
        assert_eq!(appt.urgency, Some(Urgency::Urgent));
    }

    #[test]
    fn create_rejects_empty_reason() {
        let mut record = test_record();
        let request = AppointmentRequest {
            reason: "   ".to_string(),
            ..cleaning_request()
        };
        let err = create(&mut record, &request, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, RecordError::Validation { field: "reason", .. }));
        assert!(record.appointments.is_empty());
    }

    #[test]
    fn create_rejects_empty_and_malformed_date() {
        let mut record = test_record();
        for bad in ["", "tomorrow", "2024-13-40", "01/06/2024"] {
            let request = AppointmentRequest {
                date: bad.to_string(),
                ..cleaning_request()
            };
            let err = create(&mut record, &request, &EngineConfig::default()).unwrap_err();
            assert!(matches!(err, RecordError::Validation { field: "date", .. }), "{bad}");
        }
    }

    #[test]
    fn create_rejects_empty_and_malformed_time() {
        let mut record = test_record();
        for bad in ["", "9am", "25:00", "09:65"] {
            let request = AppointmentRequest {
                time: bad.to_string(),
                ..cleaning_request()
            };
            let err = create(&mut record, &request, &EngineConfig::default()).unwrap_err();
            assert!(matches!(err, RecordError::Validation { field: "time", .. }), "{bad}");
        }
    }

    #[test]
    fn create_generates_distinct_ids() {
        let mut record = test_record();
        let config = EngineConfig::default();
        let a = create(&mut record, &cleaning_request(), &config).unwrap();
        let request = AppointmentRequest {
            time: "10:00".to_string(),
            ..cleaning_request()
        };
        let b = create(&mut record, &request, &config).unwrap();
        assert_ne!(a.id, b.id);
    }

    // ── slot conflicts ───────────────────────────────────

    #[test]
    fn same_slot_rejected_while_active() {
        let mut record = test_record();
        let config = EngineConfig::default();
        create(&mut record, &cleaning_request(), &config).unwrap();

        let err = create(&mut record, &cleaning_request(), &config).unwrap_err();
        assert!(matches!(err, RecordError::SlotConflict { .. }));
        assert_eq!(record.appointments.len(), 1);
    }

    #[test]
    fn cancelled_appointment_frees_its_slot() {
        let mut record = test_record();
        let config = EngineConfig::default();
        let appt = create(&mut record, &cleaning_request(), &config).unwrap();
        transition(&mut record, appt.id, AppointmentStatus::Cancelled, ActorRole::Patient).unwrap();

        assert!(create(&mut record, &cleaning_request(), &config).is_ok());
    }

    #[test]
    fn slot_check_can_be_disabled() {
        let mut record = test_record();
        let config = EngineConfig {
            enforce_slot_conflicts: false,
            ..EngineConfig::default()
        };
        create(&mut record, &cleaning_request(), &config).unwrap();
        create(&mut record, &cleaning_request(), &config).unwrap();
        assert_eq!(record.appointments.len(), 2);
    }

    // ── transition ───────────────────────────────────────

    #[test]
    fn doctor_confirms_then_completes() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();

        let confirmed =
            transition(&mut record, appt.id, AppointmentStatus::Confirmed, ActorRole::Doctor)
                .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let completed =
            transition(&mut record, appt.id, AppointmentStatus::Completed, ActorRole::Doctor)
                .unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
    }

    #[test]
    fn patient_may_cancel_but_not_confirm() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();

        let err = transition(
            &mut record,
            appt.id,
            AppointmentStatus::Confirmed,
            ActorRole::Patient,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Forbidden { .. }));
        // Nothing applied.
        assert_eq!(record.appointment(appt.id).unwrap().status, AppointmentStatus::Pending);

        transition(&mut record, appt.id, AppointmentStatus::Cancelled, ActorRole::Patient).unwrap();
        assert_eq!(record.appointment(appt.id).unwrap().status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn completed_is_only_reachable_via_confirmed() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();

        let err = transition(
            &mut record,
            appt.id,
            AppointmentStatus::Completed,
            ActorRole::Doctor,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RecordError::InvalidTransition {
                from: AppointmentStatus::Pending,
                to: AppointmentStatus::Completed
            }
        ));
    }

    #[test]
    fn terminal_states_reject_all_transitions() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();
        transition(&mut record, appt.id, AppointmentStatus::Cancelled, ActorRole::Doctor).unwrap();

        for target in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
        ] {
            let err = transition(&mut record, appt.id, target, ActorRole::Doctor).unwrap_err();
            assert!(matches!(err, RecordError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn transition_on_unknown_id_is_not_found() {
        let mut record = test_record();
        let err = transition(
            &mut record,
            Uuid::new_v4(),
            AppointmentStatus::Confirmed,
            ActorRole::Doctor,
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::NotFound { entity: "appointment", .. }));
    }

    // ── notes ────────────────────────────────────────────

    #[test]
    fn only_doctor_writes_notes() {
        let mut record = test_record();
        let appt = create(&mut record, &cleaning_request(), &EngineConfig::default()).unwrap();

        let err = set_notes(&mut record, appt.id, "Sensitive molar", ActorRole::Patient).unwrap_err();
        assert!(matches!(err, RecordError::Forbidden { .. }));
        assert!(record.appointment(appt.id).unwrap().notes.is_none());

        set_notes(&mut record, appt.id, "Sensitive molar", ActorRole::Doctor).unwrap();
        assert_eq!(
            record.appointment(appt.id).unwrap().notes.as_deref(),
            Some("Sensitive molar")
        );
    }

    #[test]
    fn notes_on_unknown_id_is_not_found() {
        let mut record = test_record();
        let err = set_notes(&mut record, Uuid::new_v4(), "x", ActorRole::Doctor).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }
}
