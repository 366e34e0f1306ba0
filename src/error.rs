//! Typed failure taxonomy for record mutations.
//!
//! Every engine operation and commit returns one of these variants; nothing
//! in the core panics or formats user-facing text. `ConcurrencyConflict` is
//! the only recoverable kind (reload and retry) — all others need new input
//! from the caller.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::enums::{ActorRole, AppointmentStatus};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("role {role} may not {action}")]
    Forbidden { role: ActorRole, action: &'static str },

    #[error("no transition from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("slot {date} {time} is already booked")]
    SlotConflict { date: NaiveDate, time: NaiveTime },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("stale aggregate: expected version {expected}, stored version is {actual}")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    #[error("mutation violates record invariants: {reason}")]
    InvalidMutation { reason: String },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RecordError {
    /// True for failures the caller can recover from by reloading the
    /// aggregate and replaying the same intent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}
