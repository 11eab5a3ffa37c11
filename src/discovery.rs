//! Component discovery for bottlerun
//!
//! Finds which runners, runtimes, bridge builds and graphics layers are
//! installed, reconciles them with the organized catalog and installs a
//! fallback build when asked to.
//!
//! ## Module Structure
//! - `types.rs`: CheckOutcome, BridgeStatus, Installer, ChecksReport
//! - `pure/`: Pure functions (runner bucketing, offline set difference)
//! - `operations/`: Atomic I/O (directory scans, helper locking, markers,
//!   the external installer command)
//! - `service.rs`: ComponentDiscoveryService, the per-type state holder
//! - `pipelines/`: High-level orchestration (run_checks)

mod operations;
mod pipelines;
mod pure;
mod service;
mod types;

// Re-export types
pub use types::{
    BridgeStatus, CheckOutcome, CheckProgress, ChecksReport, Installer, OfflineQuery, StepResult,
    UnavailableInstaller,
};

// Re-export the service
pub use service::{ComponentDiscoveryService, SystemWineSource, bridge_status};

// Re-export operations
pub use operations::{
    CommandInstaller, check_app_dirs, clear_temp, find_system_wine, lock_winemenubuilder,
    lock_winemenubuilders, scan_bottles,
};

// Re-export pipelines
pub use pipelines::{ChecksOptions, ProgressFn, run_checks};

// Re-export pure functions
pub use pure::{RUNNER_FAMILIES, SYSTEM_RUNNER_PREFIX, group_runners, offline_identifiers};
