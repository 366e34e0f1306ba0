use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, Urgency};

/// One booked visit. Date and time are clinic-local wall time, no timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    pub status: AppointmentStatus,
    /// Clinician-only free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    /// Whether this appointment holds the given calendar slot.
    ///
    /// Only pending and confirmed appointments occupy a slot; completed and
    /// cancelled ones free it.
    pub fn occupies(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.status.is_active() && self.date == date && self.time == time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            reason: "Cleaning".to_string(),
            symptoms: None,
            urgency: None,
            status,
            notes: None,
        }
    }

    #[test]
    fn active_statuses_occupy_their_slot() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        assert!(sample(AppointmentStatus::Pending).occupies(date, time));
        assert!(sample(AppointmentStatus::Confirmed).occupies(date, time));
        assert!(!sample(AppointmentStatus::Cancelled).occupies(date, time));
        assert!(!sample(AppointmentStatus::Completed).occupies(date, time));
    }

    #[test]
    fn different_slot_does_not_collide() {
        let appt = sample(AppointmentStatus::Pending);
        let other_time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert!(!appt.occupies(appt.date, other_time));
    }

    #[test]
    fn optional_fields_omitted_from_json() {
        let appt = sample(AppointmentStatus::Pending);
        let json = serde_json::to_value(&appt).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("symptoms"));
        assert!(!obj.contains_key("urgency"));
        assert!(!obj.contains_key("notes"));
        assert_eq!(obj["status"], "pending");
    }
}
