//! Discovery pipelines - high-level orchestration

mod checks;

pub use checks::{ChecksOptions, ProgressFn, run_checks};
