//! BrightSmile Records — the patient record engine behind the clinic's
//! patient and clinician dashboards.
//!
//! One aggregate per patient (profile + appointments + medical history),
//! mutated only through version-guarded commits so the two dashboards can
//! edit the same record concurrently without losing writes.

pub mod appointment;
pub mod commit;
pub mod config;
pub mod error;
pub mod history;
pub mod intent;
pub mod models;
pub mod projection;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for host binaries and integration harnesses.
///
/// Honors `RUST_LOG`; falls back to the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
