//! Read-only dashboard projections.
//!
//! Curated view payloads for the two dashboards. Projections never mutate:
//! they render a snapshot of one aggregate (patient view) or of every
//! patient aggregate in the store (clinician view) and leave all writes to
//! the intent layer. Translating failures into user-facing copy is the
//! dashboards' job, not this module's.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RecordError;
use crate::models::appointment::Appointment;
use crate::models::enums::ActorRole;
use crate::models::history::MedicalRecordEntry;
use crate::models::record::PatientRecord;
use crate::store::RecordStore;

// ─── View types ───────────────────────────────────────────────────────────────

/// Curated appointment row for either dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: Uuid,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Curated medical-history row, chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntryView {
    pub recorded_at: String, // RFC 3339
    pub author_name: String,
    pub note: String,
}

/// Everything the patient dashboard renders for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub appointments: Vec<AppointmentView>,
    pub medical_history: Vec<HistoryEntryView>,
    pub version: u64,
}

/// One row in the clinician's patient list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub active_appointments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<AppointmentView>,
}

/// The clinician dashboard: every patient account, summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicianDashboard {
    pub patients: Vec<PatientSummary>,
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

fn appointment_view(appt: &Appointment) -> AppointmentView {
    AppointmentView {
        id: appt.id,
        date: appt.date.format("%Y-%m-%d").to_string(),
        time: appt.time.format("%H:%M").to_string(),
        reason: appt.reason.clone(),
        symptoms: appt.symptoms.clone(),
        urgency: appt.urgency.map(|u| u.as_str().to_string()),
        status: appt.status.as_str().to_string(),
        notes: appt.notes.clone(),
    }
}

fn history_view(entry: &MedicalRecordEntry) -> HistoryEntryView {
    HistoryEntryView {
        recorded_at: entry.recorded_at.to_rfc3339(),
        author_name: entry.author_name.clone(),
        note: entry.note.clone(),
    }
}

/// Assemble the patient view of one aggregate: appointments ordered by
/// calendar slot, history in insertion (= chronological) order.
pub fn assemble_patient_dashboard(record: &PatientRecord) -> PatientDashboard {
    let mut appointments: Vec<&Appointment> = record.appointments.iter().collect();
    appointments.sort_by_key(|a| (a.date, a.time));

    PatientDashboard {
        patient_id: record.patient_id,
        display_name: record.profile.display_name.clone(),
        email: record.profile.email.clone(),
        appointments: appointments.into_iter().map(appointment_view).collect(),
        medical_history: record.medical_history.iter().map(history_view).collect(),
        version: record.version,
    }
}

/// Summarize one aggregate for the clinician's patient list. `today` scopes
/// the "next appointment" pick to slots from today onward.
fn summarize(record: &PatientRecord, today: NaiveDate) -> PatientSummary {
    let next = record
        .appointments
        .iter()
        .filter(|a| a.status.is_active() && a.date >= today)
        .min_by_key(|a| (a.date, a.time));

    PatientSummary {
        patient_id: record.patient_id,
        display_name: record.profile.display_name.clone(),
        email: record.profile.email.clone(),
        active_appointments: record
            .appointments
            .iter()
            .filter(|a| a.status.is_active())
            .count(),
        next_appointment: next.map(appointment_view),
    }
}

/// Assemble the clinician dashboard: all aggregates with a `patient` role
/// tag, ordered by display name. Doctor accounts are not listed.
pub fn assemble_clinician_dashboard<S: RecordStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> Result<ClinicianDashboard, RecordError> {
    let mut patients: Vec<PatientSummary> = store
        .list()?
        .iter()
        .filter(|r| r.profile.role == ActorRole::Patient)
        .map(|r| summarize(r, today))
        .collect();
    patients.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(ClinicianDashboard { patients })
}
