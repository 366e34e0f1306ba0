use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::ActorRole;

/// Account-level display and contact fields. Opaque to the record engines;
/// the role tag decides which dashboard projection a record appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub role: ActorRole,
}

impl PatientProfile {
    /// Minimal profile with just a name, an email and a role.
    pub fn new(display_name: impl Into<String>, email: impl Into<String>, role: ActorRole) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            phone_number: None,
            date_of_birth: None,
            address: None,
            role,
        }
    }
}
