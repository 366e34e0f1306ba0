/// Application-level constants
pub const APP_NAME: &str = "BrightSmile Records";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "brightsmile_records=info"
}

/// Engine tunables shared by the intent layer and the appointment engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many times an intent is replayed after losing a commit race
    /// before the conflict is surfaced to the caller. Bounded so two actors
    /// repeatedly colliding cannot live-lock each other.
    pub max_commit_retries: u32,
    /// Reject bookings that would double-book a pending/confirmed slot.
    /// Disable for strict fidelity to deployments that tolerated it.
    pub enforce_slot_conflicts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
            enforce_slot_conflicts: true,
        }
    }
}
