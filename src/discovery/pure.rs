//! Pure functions for discovery
//!
//! These functions have no side effects and are deterministic.

mod buckets;
mod offline;

pub use buckets::{RUNNER_FAMILIES, SYSTEM_RUNNER_PREFIX, group_runners};
pub use offline::offline_identifiers;
