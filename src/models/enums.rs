use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(RecordError::Validation {
                        field: stringify!($name),
                        reason: format!("unknown value: {s}"),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(ActorRole {
    Patient => "patient",
    Doctor => "doctor",
});

str_enum!(Urgency {
    Normal => "normal",
    Urgent => "urgent",
    Emergency => "emergency",
});

impl AppointmentStatus {
    /// Whether the status machine permits moving from `self` to `next`.
    ///
    /// pending → confirmed → completed, with cancellation allowed from
    /// pending and confirmed. Completed and cancelled are terminal.
    pub fn can_transition_to(self, next: Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Statuses that occupy a calendar slot.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Pending, "pending"),
            (AppointmentStatus::Confirmed, "confirmed"),
            (AppointmentStatus::Completed, "completed"),
            (AppointmentStatus::Cancelled, "cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn actor_role_round_trip() {
        for (variant, s) in [
            (ActorRole::Patient, "patient"),
            (ActorRole::Doctor, "doctor"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ActorRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn urgency_round_trip() {
        for (variant, s) in [
            (Urgency::Normal, "normal"),
            (Urgency::Urgent, "urgent"),
            (Urgency::Emergency, "emergency"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Urgency::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(AppointmentStatus::from_str("archived").is_err());
        assert!(ActorRole::from_str("admin").is_err());
        assert!(Urgency::from_str("").is_err());
    }

    #[test]
    fn serde_uses_lowercase_strings() {
        let json = serde_json::to_string(&AppointmentStatus::Pending).unwrap();
        assert_eq!(json, r#""pending""#);
        let parsed: ActorRole = serde_json::from_str(r#""doctor""#).unwrap();
        assert_eq!(parsed, ActorRole::Doctor);
    }

    // ── State machine ────────────────────────────────────

    #[test]
    fn pending_can_confirm_or_cancel() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn confirmed_can_complete_or_cancel() {
        use AppointmentStatus::*;
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        use AppointmentStatus::*;
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Confirmed, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn only_pending_and_confirmed_occupy_slots() {
        use AppointmentStatus::*;
        assert!(Pending.is_active());
        assert!(Confirmed.is_active());
        assert!(!Completed.is_active());
        assert!(!Cancelled.is_active());
    }
}
